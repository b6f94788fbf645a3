// src/pipeline/prune.rs

//! Subgraph pruner and edge rewirer.
//!
//! Walks the raw tree depth-first and builds a new tree that only contains
//! visible nodes. When a child is hidden under its parent, every edge that
//! touches it or anything below it is redirected to the parent before the
//! child is dropped, so the parent becomes the nearest visible proxy. The
//! hidden child's subtree is never walked for visible nodes: a collapsed
//! group exposes no grandchildren.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::graph::model::{Edge, ROOT_ID, RawGraph, TreeNode, edge_id};
use crate::pipeline::visibility::VisibilityState;

/// Default size handed to the layout engine for nodes without their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for NodeDimensions {
    fn default() -> Self {
        Self {
            width: 250.0,
            height: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Group,
}

/// A visible node of the pruned tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedNode {
    pub id: String,
    pub kind: NodeKind,
    pub width: f64,
    pub height: f64,
    /// Distance from the top level (top-level nodes are depth 0).
    pub depth: usize,
    /// Number of direct children removed by the visibility state.
    pub hidden_children: usize,
    pub payload: Map<String, Value>,
    pub children: Vec<PrunedNode>,
}

impl PrunedNode {
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }
}

/// Output of the pruning stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedGraph {
    /// Id of the synthetic container the top-level nodes hang off.
    pub root_id: String,
    pub children: Vec<PrunedNode>,
    /// Corrected edges; both endpoints are always in `visible_ids`.
    pub edges: Vec<Edge>,
    pub visible_ids: BTreeSet<String>,
    /// Raw edges dropped because an endpoint exists nowhere in the tree.
    pub dangling_edges: usize,
}

impl PrunedGraph {
    /// Visit every pruned node in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a PrunedNode)) {
        fn go<'a>(node: &'a PrunedNode, f: &mut impl FnMut(&'a PrunedNode)) {
            f(node);
            for child in &node.children {
                go(child, f);
            }
        }
        for child in &self.children {
            go(child, f);
        }
    }
}

/// Prune hidden nodes and correct the edge list.
///
/// The input graph is only read; the result is a fresh structure.
pub fn prune(
    graph: &RawGraph,
    visibility: &VisibilityState,
    dimensions: &NodeDimensions,
) -> PrunedGraph {
    let known = graph.node_ids();

    let mut edges: Vec<Edge> = Vec::with_capacity(graph.edges.len());
    let mut dangling_edges = 0;
    for edge in &graph.edges {
        if known.contains(edge.source.as_str()) && known.contains(edge.target.as_str()) {
            edges.push(edge.clone());
        } else {
            dangling_edges += 1;
            warn!(
                edge = %edge.id,
                source = %edge.source,
                target = %edge.target,
                "dropping edge with an endpoint outside the graph"
            );
        }
    }

    let mut visible_ids = BTreeSet::new();
    let mut walk = PruneWalk {
        visibility,
        dimensions,
        edges: &mut edges,
        visible_ids: &mut visible_ids,
    };
    let (children, _hidden_top_level) = walk.prune_children(&graph.root, ROOT_ID, 0);

    let before = edges.len();
    edges.retain(|e| !e.is_self_loop());
    let self_loops = before - edges.len();

    edges.retain(|e| visible_ids.contains(&e.source) && visible_ids.contains(&e.target));

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut taken_ids: HashSet<String> = HashSet::new();
    let edges: Vec<Edge> = edges
        .into_iter()
        .filter(|e| seen.insert((e.source.clone(), e.target.clone())))
        .map(|e| Edge {
            id: unique_edge_id(&e.source, &e.target, &mut taken_ids),
            source: e.source,
            target: e.target,
        })
        .collect();

    debug!(
        visible = visible_ids.len(),
        edges = edges.len(),
        self_loops,
        dangling_edges,
        "graph pruned"
    );

    PrunedGraph {
        root_id: graph.root.id.clone(),
        children,
        edges,
        visible_ids,
        dangling_edges,
    }
}

/// `source->target`, or `source->target#n` when node ids containing `->`
/// would make two distinct edges share an id.
fn unique_edge_id(source: &str, target: &str, taken: &mut HashSet<String>) -> String {
    let base = edge_id(source, target);
    let mut id = base.clone();
    let mut n = 1;
    while taken.contains(&id) {
        id = format!("{base}#{n}");
        n += 1;
    }
    taken.insert(id.clone());
    id
}

struct PruneWalk<'a> {
    visibility: &'a VisibilityState,
    dimensions: &'a NodeDimensions,
    edges: &'a mut Vec<Edge>,
    visible_ids: &'a mut BTreeSet<String>,
}

impl PruneWalk<'_> {
    /// Prune the children of `parent`, whose visibility entry is `parent_key`.
    ///
    /// Returns the visible children and how many were hidden.
    fn prune_children(
        &mut self,
        parent: &TreeNode,
        parent_key: &str,
        depth: usize,
    ) -> (Vec<PrunedNode>, usize) {
        let mut kept = Vec::with_capacity(parent.children().len());
        let mut hidden = 0;

        for child in parent.children() {
            if self.visibility.is_hidden(parent_key, &child.id) {
                self.rewire(child, parent_key);
                hidden += 1;
                continue;
            }

            self.visible_ids.insert(child.id.clone());

            let (children, hidden_children) = if child.is_group() {
                self.prune_children(child, &child.id, depth + 1)
            } else {
                (Vec::new(), 0)
            };

            kept.push(PrunedNode {
                id: child.id.clone(),
                kind: if child.is_group() {
                    NodeKind::Group
                } else {
                    NodeKind::Leaf
                },
                width: child.width.unwrap_or(self.dimensions.width),
                height: child.height.unwrap_or(self.dimensions.height),
                depth,
                hidden_children,
                payload: child.payload.clone(),
                children,
            });
        }

        (kept, hidden)
    }

    /// Point every edge touching `hidden` or one of its descendants at
    /// `proxy` instead.
    fn rewire(&mut self, hidden: &TreeNode, proxy: &str) {
        let mut subtree: HashSet<&str> = HashSet::new();
        hidden.walk(&mut |n| {
            subtree.insert(n.id.as_str());
        });

        for edge in self.edges.iter_mut() {
            if subtree.contains(edge.source.as_str()) {
                edge.source = proxy.to_string();
            }
            if subtree.contains(edge.target.as_str()) {
                edge.target = proxy.to_string();
            }
        }
    }
}
