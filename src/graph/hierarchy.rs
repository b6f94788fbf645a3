// src/graph/hierarchy.rs

//! Build the nested raw graph from a flat job list.
//!
//! The scheduler names grouped stages `<group>_<subgroup>_<Stage>[_<n>]`.
//! Every leading segment becomes one nesting level; a trailing numeric
//! segment is an instance counter and does not open a group:
//!
//! | name             | groups           |
//! |------------------|------------------|
//! | `Node`           |                  |
//! | `Node_1`         |                  |
//! | `grp_Node`       | `grp`            |
//! | `grp_a_Node_1`   | `grp`, `grp_a`   |
//!
//! Group ids are the cumulative prefix (`grp`, `grp_a`) so nested groups
//! with the same segment name stay distinct.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{DagviewError, Result};
use crate::graph::model::{Edge, RawGraph, TreeNode};
use crate::graph::validate::validate_graph;

/// One job in a flat listing.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatJob {
    /// Optional explicit id (numeric database ids are common); falls back to
    /// `name`.
    #[serde(default)]
    pub id: Option<Value>,
    pub name: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlatEdge {
    pub source: Value,
    pub target: Value,
}

/// Flat `{nodes, edges}` listing as served by the job database.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatGraph {
    #[serde(default)]
    pub nodes: Vec<FlatJob>,
    #[serde(default)]
    pub edges: Vec<FlatEdge>,
}

impl FlatGraph {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Group path encoded in a job name.
pub fn group_path(name: &str) -> Vec<String> {
    let mut parts: Vec<&str> = name.split('_').collect();
    if parts.len() > 1
        && parts
            .last()
            .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    {
        parts.pop();
    }
    // The last remaining segment is the stage itself.
    parts.pop();
    parts.into_iter().map(str::to_string).collect()
}

/// Nest the flat jobs under their groups and convert the edge list.
///
/// Groups appear in the order their first member appears; members keep
/// their listing order.
pub fn build_hierarchy(flat: FlatGraph) -> Result<RawGraph> {
    let mut top_level: Vec<TreeNode> = Vec::new();

    for job in flat.nodes {
        let path = group_path(&job.name);
        let id = match job.id {
            Some(value) => value_to_id(value)?,
            None => job.name.clone(),
        };

        let mut payload = job.payload;
        payload.insert("name".to_string(), Value::String(job.name));
        let leaf = TreeNode {
            payload,
            ..TreeNode::leaf(id)
        };

        insert_at(&mut top_level, &path, leaf);
    }

    let edges = flat
        .edges
        .into_iter()
        .map(|e| Ok(Edge::new(value_to_id(e.source)?, value_to_id(e.target)?)))
        .collect::<Result<Vec<_>>>()?;

    let graph = RawGraph::new(top_level, edges);
    validate_graph(&graph)?;
    debug!(
        top_level = graph.top_level().len(),
        edges = graph.edges.len(),
        "built hierarchy from flat job list"
    );
    Ok(graph)
}

fn insert_at(siblings: &mut Vec<TreeNode>, path: &[String], leaf: TreeNode) {
    let mut current = siblings;
    let mut prefix = String::new();

    for segment in path {
        if !prefix.is_empty() {
            prefix.push('_');
        }
        prefix.push_str(segment);

        let pos = match current.iter().position(|n| n.is_group() && n.id == prefix) {
            Some(pos) => pos,
            None => {
                let mut group = TreeNode::group(prefix.clone(), Vec::new());
                group
                    .payload
                    .insert("label".to_string(), Value::String(segment.clone()));
                current.push(group);
                current.len() - 1
            }
        };
        current = current[pos].children.get_or_insert_with(Vec::new);
    }

    current.push(leaf);
}

fn value_to_id(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(DagviewError::MalformedGraph(format!(
            "job id must be a string or a number, got {other}"
        ))),
    }
}
