// src/graph/validate.rs

use std::collections::HashSet;

use crate::errors::{DagviewError, Result};
use crate::graph::model::{RawGraph, TreeNode};

/// Check the structural invariants of a raw graph.
///
/// - every node (groups and the root container included) has a non-empty id;
/// - ids are unique across the whole tree;
/// - edges name non-empty endpoints.
///
/// Edges pointing at ids that do not exist are *not* an error here; the
/// pruner drops them.
pub fn validate_graph(graph: &RawGraph) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    check_node(&graph.root, &mut seen)?;

    for edge in &graph.edges {
        if edge.source.is_empty() || edge.target.is_empty() {
            return Err(DagviewError::MalformedGraph(format!(
                "edge '{}' has an empty endpoint",
                edge.id
            )));
        }
    }

    Ok(())
}

fn check_node<'a>(node: &'a TreeNode, seen: &mut HashSet<&'a str>) -> Result<()> {
    if node.id.trim().is_empty() {
        return Err(DagviewError::MalformedGraph(
            "node with an empty id".to_string(),
        ));
    }
    if !seen.insert(node.id.as_str()) {
        return Err(DagviewError::MalformedGraph(format!(
            "duplicate node id '{}'",
            node.id
        )));
    }
    for child in node.children() {
        check_node(child, seen)?;
    }
    Ok(())
}
