// src/graph/mod.rs

//! Raw graph data model and storage.
//!
//! - [`model`] holds the wire-facing tree/edge types.
//! - [`validate`] checks structural invariants (unique, non-empty ids).
//! - [`store`] keeps the last received graph (replace-only).
//! - [`hierarchy`] builds the nested tree from a flat job listing.

pub mod hierarchy;
pub mod model;
pub mod store;
pub mod validate;

pub use hierarchy::{FlatGraph, build_hierarchy, group_path};
pub use model::{Edge, ROOT_ID, RawEdge, RawGraph, TreeNode};
pub use store::GraphStore;
pub use validate::validate_graph;
