// tests/controller_core.rs

mod common;
use crate::common::builders::{GraphBuilder, rewire_fixture};
use crate::common::fake_engine::row_layout;
use crate::common::{edge_pairs, init_tracing, node_ids};

use std::collections::BTreeSet;
use std::time::Duration;

use dagview::engine::{ControllerEvent, CoreCommand, CoreController, CoreStep, ViewFrame};
use dagview::graph::{RawGraph, TreeNode};
use dagview::layout::{ElkNode, LayoutError, LayoutOptions};
use dagview::pipeline::ViewSettings;
use dagview::types::Direction;

fn start_of(step: &CoreStep) -> (u64, ElkNode) {
    match step.commands.as_slice() {
        [CoreCommand::StartLayout { generation, request }] => (*generation, request.clone()),
        other => panic!("expected a single StartLayout, got {other:?}"),
    }
}

fn frame_of(step: &CoreStep) -> ViewFrame {
    match step.commands.as_slice() {
        [CoreCommand::Publish(frame)] => frame.clone(),
        other => panic!("expected a single Publish, got {other:?}"),
    }
}

fn finished(generation: u64, request: ElkNode) -> ControllerEvent {
    ControllerEvent::LayoutFinished {
        generation,
        result: Ok(row_layout(request)),
    }
}

/// Load `graph` and complete its first layout.
fn loaded(graph: RawGraph) -> CoreController {
    let mut core = CoreController::new(ViewSettings::default());
    let (generation, request) = start_of(&core.step(ControllerEvent::GraphReplaced(graph)));
    frame_of(&core.step(finished(generation, request)));
    core
}

#[test]
fn new_graph_is_laid_out_and_published() {
    init_tracing();
    let mut core = CoreController::new(ViewSettings::default());

    let step = core.step(ControllerEvent::GraphReplaced(rewire_fixture()));
    assert!(step.keep_running);
    let (generation, request) = start_of(&step);
    assert_eq!(generation, 1);
    assert_eq!(core.pending_generation(), Some(1));

    let frame = frame_of(&core.step(finished(generation, request)));
    assert_eq!(frame.generation, 1);
    assert!(frame.error.is_none());
    let model = frame.model.expect("model published");
    assert_eq!(
        node_ids(&model),
        ["B", "C", "D"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()
    );
    assert_eq!(core.pending_generation(), None);
    assert_eq!(core.last_good(), Some(&model));
}

#[test]
fn superseded_results_are_never_published() {
    init_tracing();
    let mut core = CoreController::new(ViewSettings::default());

    let (old_gen, old_request) =
        start_of(&core.step(ControllerEvent::GraphReplaced(rewire_fixture())));
    let (new_gen, new_request) = start_of(&core.step(ControllerEvent::ToggleCollapse {
        group: "B".to_string(),
    }));
    assert!(new_gen > old_gen);

    let stale = core.step(finished(old_gen, old_request));
    assert!(stale.commands.is_empty());
    assert!(core.last_good().is_none());

    let frame = frame_of(&core.step(finished(new_gen, new_request)));
    let model = frame.model.expect("model");
    assert_eq!(edge_pairs(&model), vec![("B".to_string(), "D".to_string())]);
}

#[test]
fn failed_layout_keeps_the_last_good_model() {
    init_tracing();
    let mut core = loaded(rewire_fixture());
    let good = core.last_good().cloned().expect("first layout published");

    let (generation, _) = start_of(&core.step(ControllerEvent::SetVisibleDepth(0)));
    let frame = frame_of(&core.step(ControllerEvent::LayoutFinished {
        generation,
        result: Err(LayoutError::Timeout(Duration::from_millis(50))),
    }));

    assert_eq!(frame.model, Some(good));
    assert!(frame.error.as_deref().is_some_and(|e| e.contains("timed out")));
    assert_eq!(frame.generation, generation);
}

#[test]
fn unusable_engine_response_keeps_the_last_good_model() {
    init_tracing();
    let mut core = loaded(rewire_fixture());
    let good = core.last_good().cloned();

    let (generation, request) = start_of(&core.step(ControllerEvent::SetLayoutOptions(
        LayoutOptions {
            direction: Direction::Down,
            ..LayoutOptions::default()
        },
    )));
    let mut response = row_layout(request);
    response.children.clear();
    let frame = frame_of(&core.step(ControllerEvent::LayoutFinished {
        generation,
        result: Ok(response),
    }));

    assert_eq!(frame.model, good);
    assert!(frame.error.is_some());
}

#[test]
fn next_success_clears_the_error() {
    init_tracing();
    let mut core = loaded(rewire_fixture());

    let (generation, _) = start_of(&core.step(ControllerEvent::SetVisibleDepth(0)));
    core.step(ControllerEvent::LayoutFinished {
        generation,
        result: Err(LayoutError::Engine("boom".to_string())),
    });
    assert!(core.last_error().is_some());

    let (generation, request) = start_of(&core.step(ControllerEvent::SetVisibleDepth(999)));
    let frame = frame_of(&core.step(finished(generation, request)));
    assert!(frame.error.is_none());
    assert!(core.last_error().is_none());
}

#[test]
fn malformed_graph_is_not_stored_and_supersedes_pending_work() {
    init_tracing();
    let mut core = loaded(rewire_fixture());
    let good = core.last_good().cloned();
    let revision = core.store().revision();

    let (pending_gen, pending_request) =
        start_of(&core.step(ControllerEvent::SetVisibleDepth(0)));

    let broken = RawGraph::new(vec![TreeNode::leaf("x"), TreeNode::leaf("x")], Vec::new());
    let frame = frame_of(&core.step(ControllerEvent::GraphReplaced(broken)));
    assert!(frame.error.as_deref().is_some_and(|e| e.contains("duplicate")));
    assert_eq!(frame.model, good);
    assert_eq!(core.store().revision(), revision);
    assert_eq!(core.pending_generation(), None);

    let late = core.step(finished(pending_gen, pending_request));
    assert!(late.commands.is_empty(), "the aborted run's layout is stale");
}

#[test]
fn toggle_without_a_graph_does_nothing() {
    init_tracing();
    let mut core = CoreController::new(ViewSettings::default());

    let step = core.step(ControllerEvent::ToggleCollapse {
        group: "B".to_string(),
    });

    assert!(step.commands.is_empty());
    assert!(step.keep_running);
    assert_eq!(core.generation(), 0);
}

#[test]
fn toggling_a_leaf_or_unknown_id_leaves_state_untouched() {
    init_tracing();
    let mut core = loaded(rewire_fixture());
    let generation = core.generation();

    for id in ["D", "C", "missing", "root"] {
        let step = core.step(ControllerEvent::ToggleCollapse {
            group: id.to_string(),
        });
        assert!(step.commands.is_empty(), "{id} started a layout");
        assert!(step.keep_running);
    }

    assert_eq!(core.generation(), generation);
    assert!(core.settings().overrides.is_empty());
}

#[test]
fn settings_changes_are_kept_across_graph_replacements() {
    init_tracing();
    let mut core = loaded(rewire_fixture());
    core.step(ControllerEvent::ToggleCollapse {
        group: "B".to_string(),
    });

    let next = GraphBuilder::new()
        .group("B", |g| g.leaf("C").leaf("E"))
        .leaf("D")
        .edge("E", "D")
        .build();
    let (generation, request) = start_of(&core.step(ControllerEvent::GraphReplaced(next)));
    let frame = frame_of(&core.step(finished(generation, request)));

    let model = frame.model.expect("model");
    assert_eq!(model.node("B").map(|n| n.hidden_children), Some(2));
    assert_eq!(edge_pairs(&model), vec![("B".to_string(), "D".to_string())]);
}

#[test]
fn shutdown_stops_the_loop() {
    let mut core = CoreController::new(ViewSettings::default());

    let step = core.step(ControllerEvent::Shutdown);

    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
}
