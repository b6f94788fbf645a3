// src/layout/mod.rs

//! Layout stage.
//!
//! The layout engine is a black box behind [`LayoutEngine`]: it receives an
//! ELK-shaped container tree (nested `children`, flat `edges` using
//! endpoint arrays, `layoutOptions`) and returns the same tree with `x`,
//! `y`, `width` and `height` filled in.
//!
//! - [`options`] maps typed [`LayoutOptions`] to ELK option keys.
//! - [`adapter`] serializes the pruned graph into a request, calls the
//!   engine and validates the response into a [`PositionedNode`] tree.
//! - [`builtin`] is a deterministic in-process engine (layered and
//!   force-directed) used by the CLI and as a fallback.
//!
//! The engine call is the only asynchronous step of the pipeline.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod adapter;
pub mod builtin;
pub mod force;
pub mod layered;
pub mod options;

pub use adapter::{PositionedNode, from_elk, layout, to_elk};
pub use builtin::BuiltinEngine;
pub use options::LayoutOptions;

/// Failure reported by (or on behalf of) the layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// The engine refused the input (bad edge reference, bad sizes, ...).
    #[error("layout engine rejected the graph: {0}")]
    Rejected(String),

    /// The engine answered with something the adapter cannot map back.
    #[error("layout engine returned an unusable result: {0}")]
    InvalidResponse(String),

    #[error("layout timed out after {0:?}")]
    Timeout(Duration),

    #[error("layout engine failed: {0}")]
    Engine(String),
}

/// Label attached to a node; used for the synthetic group header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElkLabel {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    pub width: f64,
    pub height: f64,
}

/// Edge in the engine's multi-endpoint convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElkEdge {
    pub id: String,
    pub sources: Vec<String>,
    pub targets: Vec<String>,
}

impl ElkEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sources: vec![source.into()],
            targets: vec![target.into()],
        }
    }
}

/// Node (or container) in the engine contract.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElkNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layout_options: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<ElkLabel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElkNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<ElkEdge>,
}

impl ElkNode {
    /// Visit every node below (not including) `self` in pre-order.
    pub fn walk_descendants<'a>(&'a self, f: &mut impl FnMut(&'a ElkNode)) {
        for child in &self.children {
            f(child);
            child.walk_descendants(f);
        }
    }
}

/// Boxed future returned by [`LayoutEngine::layout`].
pub type LayoutFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ElkNode, LayoutError>> + Send + 'a>>;

/// Trait abstracting the external layout engine.
///
/// Production code can wrap any engine that satisfies the request/response
/// contract; tests plug in deterministic stubs.
pub trait LayoutEngine: Send + Sync {
    /// Lay out `graph` and return it with positions and sizes filled in.
    fn layout(&self, graph: ElkNode) -> LayoutFuture<'_>;
}

impl<E: LayoutEngine + ?Sized> LayoutEngine for Arc<E> {
    fn layout(&self, graph: ElkNode) -> LayoutFuture<'_> {
        (**self).layout(graph)
    }
}
