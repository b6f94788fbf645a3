// tests/common/mod.rs

#![allow(dead_code)]

pub use dagview_test_utils::builders;
pub use dagview_test_utils::fake_engine;
pub use dagview_test_utils::{init_tracing, with_timeout};

use std::collections::BTreeSet;

use dagview::pipeline::VisualModel;

/// Ids of all visual nodes, as a set.
pub fn node_ids(model: &VisualModel) -> BTreeSet<String> {
    model.nodes.iter().map(|n| n.id.clone()).collect()
}

/// `(source, target)` pairs of all visual edges, in order.
pub fn edge_pairs(model: &VisualModel) -> Vec<(String, String)> {
    model
        .edges
        .iter()
        .map(|e| (e.source.clone(), e.target.clone()))
        .collect()
}
