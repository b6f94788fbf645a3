// tests/runtime_supersede.rs

mod common;
use crate::common::builders::rewire_fixture;
use crate::common::fake_engine::{CallScript, FakeEngine};
use crate::common::{edge_pairs, init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

use dagview::engine::{ControllerEvent, CoreController, Runtime, ViewFrame};
use dagview::graph::{Edge, RawGraph, TreeNode};
use dagview::layout::BuiltinEngine;
use dagview::pipeline::ViewSettings;

type TestResult = Result<(), Box<dyn Error>>;

struct Harness {
    events: mpsc::Sender<ControllerEvent>,
    frames: watch::Receiver<ViewFrame>,
    engine: FakeEngine,
    handle: JoinHandle<dagview::errors::Result<()>>,
}

fn spawn_controller(engine: FakeEngine, timeout: Option<Duration>) -> Harness {
    let (events, event_rx) = mpsc::channel(16);
    let (frames_tx, frames) = watch::channel(ViewFrame::default());
    let core = CoreController::new(ViewSettings::default());
    let runtime = Runtime::new(core, event_rx, Arc::new(engine.clone()), frames_tx)
        .with_timeout(timeout);

    Harness {
        events,
        frames,
        engine,
        handle: tokio::spawn(runtime.run()),
    }
}

#[tokio::test]
async fn publishes_the_model_for_a_new_graph() -> TestResult {
    init_tracing();
    let mut h = spawn_controller(FakeEngine::new(), None);

    h.events
        .send(ControllerEvent::GraphReplaced(rewire_fixture()))
        .await?;

    let frame = with_timeout(h.frames.wait_for(|f| f.model.is_some())).await?.clone();
    assert_eq!(frame.generation, 1);
    assert_eq!(frame.model.map(|m| m.nodes.len()), Some(3));

    h.events.send(ControllerEvent::Shutdown).await?;
    with_timeout(h.handle).await??;
    Ok(())
}

#[tokio::test]
async fn slow_stale_layout_does_not_overwrite_the_latest() -> TestResult {
    init_tracing();
    let engine = FakeEngine::with_script(vec![
        CallScript::Delayed(Duration::from_millis(200)),
        CallScript::Immediate,
    ]);
    let mut h = spawn_controller(engine, None);

    h.events
        .send(ControllerEvent::GraphReplaced(rewire_fixture()))
        .await?;
    h.events
        .send(ControllerEvent::ToggleCollapse {
            group: "B".to_string(),
        })
        .await?;

    let frame = with_timeout(h.frames.wait_for(|f| f.model.is_some())).await?.clone();
    assert_eq!(frame.generation, 2);

    // Give the slow first call time to come back and be discarded.
    sleep(Duration::from_millis(300)).await;
    assert_eq!(h.engine.call_count(), 2);

    let latest = h.frames.borrow().clone();
    assert_eq!(latest.generation, 2);
    let model = latest.model.expect("model");
    assert_eq!(edge_pairs(&model), vec![("B".to_string(), "D".to_string())]);

    h.events.send(ControllerEvent::Shutdown).await?;
    with_timeout(h.handle).await??;
    Ok(())
}

#[tokio::test]
async fn layout_timeout_is_reported_as_an_error_frame() -> TestResult {
    init_tracing();
    let engine = FakeEngine::with_script(vec![CallScript::Delayed(Duration::from_millis(500))]);
    let mut h = spawn_controller(engine, Some(Duration::from_millis(50)));

    h.events
        .send(ControllerEvent::GraphReplaced(rewire_fixture()))
        .await?;

    let frame = with_timeout(h.frames.wait_for(|f| f.error.is_some())).await?.clone();
    assert!(frame.model.is_none());
    assert!(frame.error.as_deref().is_some_and(|e| e.contains("timed out")));

    h.events.send(ControllerEvent::Shutdown).await?;
    with_timeout(h.handle).await??;
    Ok(())
}

#[tokio::test]
async fn engine_failure_keeps_the_previous_model() -> TestResult {
    init_tracing();
    let engine = FakeEngine::with_script(vec![
        CallScript::Immediate,
        CallScript::DropNode("D".to_string()),
    ]);
    let mut h = spawn_controller(engine, None);

    h.events
        .send(ControllerEvent::GraphReplaced(rewire_fixture()))
        .await?;
    let good = with_timeout(h.frames.wait_for(|f| f.model.is_some()))
        .await?
        .model
        .clone();

    h.events.send(ControllerEvent::SetVisibleDepth(0)).await?;
    let frame = with_timeout(h.frames.wait_for(|f| f.error.is_some())).await?.clone();
    assert_eq!(frame.model, good);
    assert_eq!(frame.generation, 2);

    h.events.send(ControllerEvent::Shutdown).await?;
    with_timeout(h.handle).await??;
    Ok(())
}

#[tokio::test]
async fn closing_the_event_channel_stops_the_controller() -> TestResult {
    init_tracing();
    let h = spawn_controller(FakeEngine::new(), None);

    drop(h.events);

    with_timeout(h.handle).await??;
    Ok(())
}

#[tokio::test]
async fn builtin_engine_respects_the_layout_timeout() -> TestResult {
    init_tracing();
    let (events, event_rx) = mpsc::channel(4);
    let (frames_tx, mut frames) = watch::channel(ViewFrame::default());
    let core = CoreController::new(ViewSettings::default());
    let runtime = Runtime::new(core, event_rx, Arc::new(BuiltinEngine::new()), frames_tx)
        .with_timeout(Some(Duration::from_millis(1)));
    let handle = tokio::spawn(runtime.run());

    let nodes = (0..400).map(|i| TreeNode::leaf(format!("n{i}"))).collect();
    let edges = (1..400)
        .map(|i| Edge::new(format!("n{}", i - 1), format!("n{i}")))
        .collect();
    events
        .send(ControllerEvent::GraphReplaced(RawGraph::new(nodes, edges)))
        .await?;

    let frame = with_timeout(frames.wait_for(|f| f.error.is_some())).await?.clone();
    assert!(frame.model.is_none());
    assert!(frame.error.as_deref().is_some_and(|e| e.contains("timed out")));

    events.send(ControllerEvent::Shutdown).await?;
    with_timeout(handle).await??;
    Ok(())
}
