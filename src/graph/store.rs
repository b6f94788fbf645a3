// src/graph/store.rs

//! Raw graph store.
//!
//! Holds the last graph received from the scheduler. The store is
//! replace-only: a new graph swaps the `Arc`, it never mutates the graph a
//! pipeline run may still be reading.

use std::sync::Arc;

use tracing::debug;

use crate::graph::model::RawGraph;

#[derive(Debug, Default)]
pub struct GraphStore {
    current: Option<Arc<RawGraph>>,
    revision: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored graph and return the new revision number.
    pub fn replace(&mut self, graph: RawGraph) -> u64 {
        self.revision += 1;
        debug!(
            revision = self.revision,
            top_level = graph.top_level().len(),
            edges = graph.edges.len(),
            "raw graph replaced"
        );
        self.current = Some(Arc::new(graph));
        self.revision
    }

    /// Shared handle on the current graph, if any.
    pub fn snapshot(&self) -> Option<Arc<RawGraph>> {
        self.current.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
