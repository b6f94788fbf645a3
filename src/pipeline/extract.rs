// src/pipeline/extract.rs

//! Render-model extractor.
//!
//! Flattens the positioned tree into the records a rendering surface
//! consumes. Groups are emitted before their descendants so a renderer can
//! create parents first.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::layout::PositionedNode;
use crate::pipeline::prune::NodeKind;
use crate::types::{ConnectorSide, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    Leaf,
    Group,
}

impl From<NodeKind> for VisualKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Leaf => VisualKind::Leaf,
            NodeKind::Group => VisualKind::Group,
        }
    }
}

/// One node ready for rendering.
///
/// `position` is relative to the parent container, as the layout engine
/// reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: String,
    pub position: Point,
    pub size: Size,
    #[serde(rename = "type")]
    pub kind: VisualKind,
    /// Containing group; `None` for top-level nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub source_side: ConnectorSide,
    pub target_side: ConnectorSide,
    pub depth: usize,
    pub hidden_children: usize,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Flat node and edge collections handed to the rendering surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualModel {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

impl VisualModel {
    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Flatten `positioned` (the root container) into a [`VisualModel`].
pub fn extract(positioned: &PositionedNode, direction: Direction) -> VisualModel {
    let (source_side, target_side) = direction.connector_sides();
    let mut walker = Extractor {
        source_side,
        target_side,
        model: VisualModel::default(),
    };
    walker.container(positioned, None);

    debug!(
        nodes = walker.model.nodes.len(),
        edges = walker.model.edges.len(),
        "visual model extracted"
    );
    walker.model
}

struct Extractor {
    source_side: ConnectorSide,
    target_side: ConnectorSide,
    model: VisualModel,
}

impl Extractor {
    /// Emit the children of `container`, then the edges attached to it.
    ///
    /// `parent_id` is `None` for the root container.
    fn container(&mut self, container: &PositionedNode, parent_id: Option<&str>) {
        for child in &container.children {
            self.model.nodes.push(VisualNode {
                id: child.id.clone(),
                position: Point {
                    x: child.x,
                    y: child.y,
                },
                size: Size {
                    width: child.width,
                    height: child.height,
                },
                kind: child.kind.into(),
                parent_id: parent_id.map(str::to_string),
                source_side: self.source_side,
                target_side: self.target_side,
                depth: child.depth,
                hidden_children: child.hidden_children,
                payload: child.payload.clone(),
            });

            if child.kind == NodeKind::Group {
                self.container(child, Some(&child.id));
            }
        }

        self.model
            .edges
            .extend(container.edges.iter().map(|e| VisualEdge {
                id: e.id.clone(),
                source: e.source.clone(),
                target: e.target.clone(),
            }));
    }
}
