// src/engine/mod.rs

//! View controller for dagview.
//!
//! This module ties the pipeline to its triggers:
//! - a new graph arriving from the scheduler
//! - the user toggling a group or changing the depth cutoff
//! - layout options changing
//! - layout results coming back from the engine
//!
//! Every trigger re-runs the synchronous stages and starts a new layout
//! generation; only the result of the latest generation is ever published.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::sync::Arc;

use crate::graph::model::RawGraph;
use crate::layout::{ElkNode, LayoutError, LayoutOptions};
use crate::pipeline::VisualModel;

/// Events flowing into the controller.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// A freshly fetched graph replaces the stored one.
    GraphReplaced(RawGraph),
    /// Flip the collapse state of one group.
    ToggleCollapse { group: String },
    SetVisibleDepth(usize),
    SetLayoutOptions(LayoutOptions),
    /// The engine answered for `generation`.
    LayoutFinished {
        generation: u64,
        result: Result<ElkNode, LayoutError>,
    },
    /// Graceful shutdown requested.
    Shutdown,
}

/// What the rendering surface sees.
///
/// `model` is the last successfully computed visual model; a failed run
/// only sets `error` and leaves `model` untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFrame {
    /// Generation of the run that produced this frame.
    pub generation: u64,
    pub model: Option<Arc<VisualModel>>,
    pub error: Option<String>,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use self::core::CoreController;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
