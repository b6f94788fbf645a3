// src/layout/adapter.rs

//! Layout adapter: pruned graph ⇄ engine contract.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use tracing::debug;

use crate::graph::model::Edge;
use crate::layout::{ElkEdge, ElkLabel, ElkNode, LayoutEngine, LayoutError, LayoutOptions};
use crate::pipeline::prune::{NodeKind, PrunedGraph, PrunedNode};

/// Node of the positioned tree returned by the layout stage.
///
/// `x`/`y` are relative to the containing node, as the engine reports
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub depth: usize,
    pub hidden_children: usize,
    pub payload: Map<String, Value>,
    pub children: Vec<PositionedNode>,
    /// Edges the engine attached at this container level.
    pub edges: Vec<Edge>,
}

/// Build the engine request for a pruned graph.
///
/// `header_height` adds a synthetic header label to every group so the
/// engine reserves room for it.
pub fn to_elk(pruned: &PrunedGraph, options: &LayoutOptions, header_height: Option<f64>) -> ElkNode {
    ElkNode {
        id: pruned.root_id.clone(),
        layout_options: options.to_elk_options(),
        children: pruned
            .children
            .iter()
            .map(|n| node_to_elk(n, header_height))
            .collect(),
        edges: pruned
            .edges
            .iter()
            .map(|e| ElkEdge::new(e.id.clone(), e.source.clone(), e.target.clone()))
            .collect(),
        ..ElkNode::default()
    }
}

fn node_to_elk(node: &PrunedNode, header_height: Option<f64>) -> ElkNode {
    let labels = match (node.kind, header_height) {
        (NodeKind::Group, Some(height)) => vec![ElkLabel {
            text: node.id.clone(),
            x: None,
            y: None,
            width: node.width,
            height,
        }],
        _ => Vec::new(),
    };

    ElkNode {
        id: node.id.clone(),
        width: Some(node.width),
        height: Some(node.height),
        labels,
        children: node
            .children
            .iter()
            .map(|c| node_to_elk(c, header_height))
            .collect(),
        ..ElkNode::default()
    }
}

/// Map an engine response back onto the pruned graph.
///
/// Every visible node must come back exactly once with finite coordinates,
/// and every returned edge must connect visible nodes.
pub fn from_elk(response: ElkNode, pruned: &PrunedGraph) -> Result<PositionedNode, LayoutError> {
    if response.id != pruned.root_id {
        return Err(LayoutError::InvalidResponse(format!(
            "expected root container '{}', got '{}'",
            pruned.root_id, response.id
        )));
    }

    let mut index: HashMap<&str, &PrunedNode> = HashMap::new();
    pruned.walk(&mut |n| {
        index.insert(n.id.as_str(), n);
    });

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let children = response
        .children
        .into_iter()
        .map(|c| positioned_from_elk(c, &index, &pruned.visible_ids, &mut seen))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(missing) = pruned.visible_ids.iter().find(|id| !seen.contains(*id)) {
        return Err(LayoutError::InvalidResponse(format!(
            "node '{missing}' missing from layout result"
        )));
    }

    let edges = edges_from_elk(response.edges, &pruned.visible_ids)?;

    Ok(PositionedNode {
        id: response.id,
        kind: NodeKind::Group,
        x: response.x.unwrap_or(0.0),
        y: response.y.unwrap_or(0.0),
        width: response.width.unwrap_or(0.0),
        height: response.height.unwrap_or(0.0),
        depth: 0,
        hidden_children: 0,
        payload: Map::new(),
        children,
        edges,
    })
}

fn positioned_from_elk(
    node: ElkNode,
    index: &HashMap<&str, &PrunedNode>,
    visible: &BTreeSet<String>,
    seen: &mut BTreeSet<String>,
) -> Result<PositionedNode, LayoutError> {
    let Some(source) = index.get(node.id.as_str()) else {
        return Err(LayoutError::InvalidResponse(format!(
            "unknown node '{}' in layout result",
            node.id
        )));
    };
    if !seen.insert(node.id.clone()) {
        return Err(LayoutError::InvalidResponse(format!(
            "node '{}' appears twice in layout result",
            node.id
        )));
    }

    let (Some(x), Some(y)) = (node.x, node.y) else {
        return Err(LayoutError::InvalidResponse(format!(
            "node '{}' has no position",
            node.id
        )));
    };
    let width = node.width.unwrap_or(source.width);
    let height = node.height.unwrap_or(source.height);
    if ![x, y, width, height].iter().all(|v| v.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(LayoutError::InvalidResponse(format!(
            "node '{}' has a non-finite or negative geometry",
            node.id
        )));
    }

    let children = node
        .children
        .into_iter()
        .map(|c| positioned_from_elk(c, index, visible, seen))
        .collect::<Result<Vec<_>, _>>()?;
    let edges = edges_from_elk(node.edges, visible)?;

    Ok(PositionedNode {
        id: node.id,
        kind: source.kind,
        x,
        y,
        width,
        height,
        depth: source.depth,
        hidden_children: source.hidden_children,
        payload: source.payload.clone(),
        children,
        edges,
    })
}

/// Collapse the engine's endpoint arrays to a single pair.
fn edges_from_elk(edges: Vec<ElkEdge>, visible: &BTreeSet<String>) -> Result<Vec<Edge>, LayoutError> {
    edges
        .into_iter()
        .map(|e| {
            let (Some(source), Some(target)) = (e.sources.first(), e.targets.first()) else {
                return Err(LayoutError::InvalidResponse(format!(
                    "edge '{}' has no endpoints",
                    e.id
                )));
            };
            if !visible.contains(source) || !visible.contains(target) {
                return Err(LayoutError::InvalidResponse(format!(
                    "edge '{}' references a node that is not visible",
                    e.id
                )));
            }
            Ok(Edge {
                id: e.id.clone(),
                source: source.clone(),
                target: target.clone(),
            })
        })
        .collect()
}

/// Serialize, call the engine, and map the result back.
pub async fn layout<E>(
    pruned: &PrunedGraph,
    options: &LayoutOptions,
    header_height: Option<f64>,
    engine: &E,
) -> Result<PositionedNode, LayoutError>
where
    E: LayoutEngine + ?Sized,
{
    let request = to_elk(pruned, options, header_height);
    debug!(
        nodes = pruned.visible_ids.len(),
        edges = pruned.edges.len(),
        algorithm = options.algorithm.elk_value(),
        "calling layout engine"
    );
    let response = engine.layout(request).await?;
    from_elk(response, pruned)
}
