// src/layout/layered.rs

//! Layered placement of sibling nodes.
//!
//! 1. Split into connected components.
//! 2. Break cycles by dropping DFS back edges (visiting in model order).
//! 3. Longest-path layer assignment from the sources.
//! 4. Inside a layer, nodes keep model order; layers are packed along the
//!    flow with `layer_spacing`, nodes across it with `node_spacing`.

use std::collections::HashMap;

use petgraph::Direction as EdgeDirection;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{DfsEvent, depth_first_search};

use crate::layout::LayoutOptions;
use crate::layout::builtin::{Extent, components, pack_components};
use crate::types::Direction;

/// Positions (top-left, relative to the content origin) for every extent.
pub fn place(
    extents: &[Extent],
    links: &[(usize, usize)],
    options: &LayoutOptions,
) -> Vec<(f64, f64)> {
    let parts = components(extents.len(), links)
        .into_iter()
        .map(|members| {
            let positions = place_component(&members, extents, links, options);
            (members, positions)
        })
        .collect();

    pack_components(
        extents.len(),
        parts,
        extents,
        options.direction,
        options.component_spacing,
    )
}

/// Layer index of each member, in member order.
pub fn assign_layers(members: &[usize], links: &[(usize, usize)]) -> Vec<usize> {
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
    for &m in members {
        graph.add_node(m);
    }
    for &(s, t) in links {
        if graph.contains_node(s) && graph.contains_node(t) {
            graph.add_edge(s, t, ());
        }
    }

    let mut back_edges = Vec::new();
    depth_first_search(&graph, members.iter().copied(), |event| {
        if let DfsEvent::BackEdge(u, v) = event {
            back_edges.push((u, v));
        }
    });
    for (u, v) in back_edges {
        graph.remove_edge(u, v);
    }

    let order = toposort(&graph, None).unwrap_or_else(|_| members.to_vec());

    let mut layer: HashMap<usize, usize> =
        members.iter().map(|&m| (m, 0)).collect();
    for u in order {
        let base = layer.get(&u).copied().unwrap_or(0);
        for v in graph.neighbors_directed(u, EdgeDirection::Outgoing) {
            let entry = layer.entry(v).or_insert(0);
            *entry = (*entry).max(base + 1);
        }
    }

    members
        .iter()
        .map(|m| layer.get(m).copied().unwrap_or(0))
        .collect()
}

fn place_component(
    members: &[usize],
    extents: &[Extent],
    links: &[(usize, usize)],
    options: &LayoutOptions,
) -> Vec<(f64, f64)> {
    let layers = assign_layers(members, links);
    let layer_count = layers.iter().copied().max().map_or(0, |m| m + 1);

    // Thickness of each layer along the flow.
    let mut thickness = vec![0.0_f64; layer_count];
    for (&idx, &l) in members.iter().zip(&layers) {
        let (along, _) = extents[idx].axes(options.direction);
        thickness[l] = thickness[l].max(along);
    }

    let mut layer_start = vec![0.0_f64; layer_count];
    let mut acc = 0.0;
    for l in 0..layer_count {
        layer_start[l] = acc;
        acc += thickness[l] + options.layer_spacing;
    }

    let mut cursor = vec![0.0_f64; layer_count];
    members
        .iter()
        .zip(&layers)
        .map(|(&idx, &l)| {
            let (_, across) = extents[idx].axes(options.direction);
            let along_pos = layer_start[l];
            let across_pos = cursor[l];
            cursor[l] += across + options.node_spacing;
            match options.direction {
                Direction::Down => (across_pos, along_pos),
                Direction::Right => (along_pos, across_pos),
            }
        })
        .collect()
}
