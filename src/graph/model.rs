// src/graph/model.rs

use std::collections::BTreeSet;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DagviewError, Result};

/// Id of the synthetic top-level container, also used as the visibility key
/// for top-level nodes.
pub const ROOT_ID: &str = "root";

/// A task (leaf) or a group of tasks as delivered by the scheduler.
///
/// Every field other than `id`, `children`, `width` and `height` ends up in
/// `payload` and is handed to the rendering surface untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// `Some` marks a group, even when the list is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl TreeNode {
    pub fn leaf(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: None,
            width: None,
            height: None,
            payload: Map::new(),
        }
    }

    pub fn group(id: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            children: Some(children),
            ..Self::leaf(id)
        }
    }

    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }

    /// Direct children (empty for leaves).
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Depth-first search for `id` in this subtree (including `self`).
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// Visit every node of the subtree in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a TreeNode)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }
}

/// A dependency between two nodes anywhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    /// Build an edge whose id is derived from its endpoints.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Canonical id of a `(source, target)` edge.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("{source}->{target}")
}

/// Edge as it appears on the wire: ELK-style endpoint arrays.
///
/// Only the first entry of `sources` / `targets` is meaningful here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, alias = "source_ids", deserialize_with = "deserialize_ids")]
    pub sources: Vec<String>,

    #[serde(default, alias = "target_ids", deserialize_with = "deserialize_ids")]
    pub targets: Vec<String>,
}

impl TryFrom<RawEdge> for Edge {
    type Error = DagviewError;

    fn try_from(raw: RawEdge) -> std::result::Result<Self, Self::Error> {
        let (Some(source), Some(target)) = (raw.sources.first(), raw.targets.first()) else {
            return Err(DagviewError::MalformedGraph(format!(
                "edge {:?} must have at least one source and one target",
                raw.id.as_deref().unwrap_or("<unnamed>")
            )));
        };
        let id = raw.id.clone().unwrap_or_else(|| edge_id(source, target));
        Ok(Edge {
            id,
            source: source.clone(),
            target: target.clone(),
        })
    }
}

/// Wire shape of the raw graph document.
#[derive(Debug, Clone, Deserialize)]
struct WireGraph {
    #[serde(default = "default_root_id", deserialize_with = "deserialize_id")]
    id: String,
    #[serde(default)]
    children: Vec<TreeNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

fn default_root_id() -> String {
    ROOT_ID.to_string()
}

/// The unpruned hierarchical task tree plus its flat edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGraph {
    /// Synthetic container; its children are the top-level nodes.
    pub root: TreeNode,
    pub edges: Vec<Edge>,
}

impl RawGraph {
    pub fn new(children: Vec<TreeNode>, edges: Vec<Edge>) -> Self {
        Self {
            root: TreeNode::group(ROOT_ID, children),
            edges,
        }
    }

    /// Parse and validate a raw graph JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let wire: WireGraph = serde_json::from_str(text).map_err(classify_json_error)?;
        Self::from_wire(wire)
    }

    /// Same as [`RawGraph::from_json`] for an already-parsed value.
    pub fn from_value(value: Value) -> Result<Self> {
        let wire: WireGraph = serde_json::from_value(value).map_err(classify_json_error)?;
        Self::from_wire(wire)
    }

    fn from_wire(wire: WireGraph) -> Result<Self> {
        let edges = wire
            .edges
            .into_iter()
            .map(Edge::try_from)
            .collect::<Result<Vec<_>>>()?;
        let graph = Self {
            root: TreeNode::group(wire.id, wire.children),
            edges,
        };
        crate::graph::validate::validate_graph(&graph)?;
        Ok(graph)
    }

    pub fn top_level(&self) -> &[TreeNode] {
        self.root.children()
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.root.find(id)
    }

    /// Every node id in the tree, the root container excluded.
    pub fn node_ids(&self) -> BTreeSet<&str> {
        let mut ids = BTreeSet::new();
        for node in self.top_level() {
            node.walk(&mut |n| {
                ids.insert(n.id.as_str());
            });
        }
        ids
    }
}

/// Shape errors (missing fields, wrong types) mean a malformed graph;
/// anything else is a plain JSON failure.
fn classify_json_error(err: serde_json::Error) -> DagviewError {
    match err.classify() {
        serde_json::error::Category::Data => DagviewError::MalformedGraph(err.to_string()),
        _ => DagviewError::JsonError(err),
    }
}

fn id_from_value<E: de::Error>(value: Value) -> std::result::Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!(
            "node id must be a string or a number, got {other}"
        ))),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    id_from_value(Value::deserialize(deserializer)?)
}

fn deserialize_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(id_from_value)
        .collect()
}
