// src/engine/event_handlers.rs

//! Event handling logic for the core controller.

use tracing::{debug, info, warn};

use crate::engine::ViewFrame;
use crate::engine::core::CoreController;
use crate::graph::model::RawGraph;
use crate::graph::validate::validate_graph;
use crate::layout::{ElkNode, LayoutError};
use crate::pipeline::{ViewSettings, prepare};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Hand `request` to the layout engine and report back as
    /// `LayoutFinished { generation, .. }`.
    StartLayout { generation: u64, request: ElkNode },
    /// Publish a new frame to the rendering surface.
    Publish(ViewFrame),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Store a new graph and re-run.
///
/// A malformed graph is not stored: the triggered run is aborted, the
/// pending layout (if any) is superseded and the previous model stays
/// visible.
pub fn handle_graph_replaced(core: &mut CoreController, graph: RawGraph) -> CoreStep {
    if let Err(err) = validate_graph(&graph) {
        core.generation += 1;
        core.in_flight = None;
        return fail_run(core, err.to_string());
    }

    core.store.replace(graph);
    rerun(core)
}

/// Flip one group's collapse state and re-run.
pub fn handle_toggle(core: &mut CoreController, group: &str) -> CoreStep {
    let Some(graph) = core.store.snapshot() else {
        debug!(group, "toggle ignored: no graph loaded");
        return CoreStep::running(Vec::new());
    };
    let is_group = graph
        .find(group)
        .is_some_and(|node| node.is_group() && node.id != graph.root.id);
    if !is_group {
        debug!(group, "toggle ignored: not a group of the current graph");
        return CoreStep::running(Vec::new());
    }

    let visible_depth = core.settings.visible_depth;
    let collapsed = core
        .settings
        .overrides
        .toggle(&graph.root, visible_depth, group);
    info!(group, collapsed, "group toggled");
    rerun(core)
}

/// Apply a settings change and re-run.
pub fn handle_settings_change(
    core: &mut CoreController,
    change: impl FnOnce(&mut ViewSettings),
) -> CoreStep {
    change(&mut core.settings);
    rerun(core)
}

/// Accept the engine result for the latest generation, discard anything
/// older.
pub fn handle_layout_finished(
    core: &mut CoreController,
    generation: u64,
    result: Result<ElkNode, LayoutError>,
) -> CoreStep {
    let is_current = core
        .in_flight
        .as_ref()
        .is_some_and(|(pending, _)| *pending == generation);
    if !is_current {
        warn!(
            generation,
            latest = core.generation,
            "discarding superseded layout result"
        );
        return CoreStep::running(Vec::new());
    }

    let Some((_, prepared)) = core.in_flight.take() else {
        return CoreStep::running(Vec::new());
    };

    match result.and_then(|response| prepared.finish(response)) {
        Ok(model) => {
            debug!(
                generation,
                nodes = model.nodes.len(),
                edges = model.edges.len(),
                "layout accepted"
            );
            core.last_good = Some(model.into());
            core.last_error = None;
            CoreStep::running(vec![CoreCommand::Publish(frame(core))])
        }
        Err(err) => fail_run(core, err.to_string()),
    }
}

/// Re-run the synchronous stages on the stored graph and start a new
/// layout generation.
pub fn rerun(core: &mut CoreController) -> CoreStep {
    let Some(graph) = core.store.snapshot() else {
        debug!("no graph loaded; nothing to lay out");
        return CoreStep::running(Vec::new());
    };

    core.generation += 1;
    let generation = core.generation;

    match prepare(&graph, &core.settings) {
        Ok(prepared) => {
            let request = prepared.request.clone();
            if let Some((superseded, _)) = core.in_flight.replace((generation, prepared)) {
                debug!(superseded, generation, "layout superseded");
            }
            CoreStep::running(vec![CoreCommand::StartLayout {
                generation,
                request,
            }])
        }
        Err(err) => {
            core.in_flight = None;
            fail_run(core, err.to_string())
        }
    }
}

fn fail_run(core: &mut CoreController, message: String) -> CoreStep {
    warn!(
        generation = core.generation,
        error = %message,
        "run failed; keeping previous model"
    );
    core.last_error = Some(message);
    CoreStep::running(vec![CoreCommand::Publish(frame(core))])
}

fn frame(core: &CoreController) -> ViewFrame {
    ViewFrame {
        generation: core.generation,
        model: core.last_good.clone(),
        error: core.last_error.clone(),
    }
}
