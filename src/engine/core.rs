// src/engine/core.rs

//! Pure core controller state machine.
//!
//! This module contains a synchronous, deterministic "core controller" that
//! consumes [`ControllerEvent`]s and produces:
//! - an updated core state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - running layout calls on their own tasks
//! - publishing frames
//!
//! The core is unit tested without any Tokio, channels or engines.

use std::sync::Arc;

use crate::engine::ControllerEvent;
use crate::engine::event_handlers::{
    CoreStep, handle_graph_replaced, handle_layout_finished, handle_settings_change,
    handle_toggle,
};
use crate::graph::store::GraphStore;
use crate::pipeline::{PreparedLayout, ViewSettings, VisualModel};

/// Pure controller state.
///
/// This owns:
/// - the raw graph store
/// - the current view settings (depth, overrides, sizes, layout options)
/// - the generation counter and the run currently waiting on the engine
/// - the last good visual model and the last error
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreController {
    pub(crate) store: GraphStore,
    pub(crate) settings: ViewSettings,
    /// Generation of the most recently triggered run.
    pub(crate) generation: u64,
    /// The run whose result is still awaited. Only its generation is
    /// accepted.
    pub(crate) in_flight: Option<(u64, PreparedLayout)>,
    pub(crate) last_good: Option<Arc<VisualModel>>,
    pub(crate) last_error: Option<String>,
}

impl CoreController {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            store: GraphStore::new(),
            settings,
            generation: 0,
            in_flight: None,
            last_good: None,
            last_error: None,
        }
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Generation of the latest triggered run (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation still waiting on the engine, if any.
    pub fn pending_generation(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|(generation, _)| *generation)
    }

    pub fn last_good(&self) -> Option<&Arc<VisualModel>> {
        self.last_good.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Handle a single event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: ControllerEvent) -> CoreStep {
        match event {
            ControllerEvent::GraphReplaced(graph) => handle_graph_replaced(self, graph),
            ControllerEvent::ToggleCollapse { group } => handle_toggle(self, &group),
            ControllerEvent::SetVisibleDepth(depth) => {
                handle_settings_change(self, |settings| settings.visible_depth = depth)
            }
            ControllerEvent::SetLayoutOptions(options) => {
                handle_settings_change(self, |settings| settings.layout = options)
            }
            ControllerEvent::LayoutFinished { generation, result } => {
                handle_layout_finished(self, generation, result)
            }
            ControllerEvent::Shutdown => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
