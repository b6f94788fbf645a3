// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::Result;
use crate::layout::{ElkNode, LayoutEngine, LayoutError};

use super::core::CoreController;
use super::{ControllerEvent, CoreCommand, ViewFrame};

type LayoutResult = (u64, std::result::Result<ElkNode, LayoutError>);

/// Drives the controller in response to `ControllerEvent`s and runs layout
/// calls on a `LayoutEngine`.
///
/// This is a pure IO shell around `CoreController`, which holds all the
/// superseding semantics. Each layout call runs on its own task; its result
/// comes back through an internal channel as `LayoutFinished`, and the core
/// decides whether it is still wanted.
pub struct Runtime<E: LayoutEngine + 'static> {
    core: CoreController,
    event_rx: mpsc::Receiver<ControllerEvent>,
    result_tx: mpsc::UnboundedSender<LayoutResult>,
    result_rx: mpsc::UnboundedReceiver<LayoutResult>,
    engine: Arc<E>,
    frames: watch::Sender<ViewFrame>,
    timeout: Option<Duration>,
    pending: Vec<JoinHandle<()>>,
}

impl<E: LayoutEngine + 'static> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<E: LayoutEngine + 'static> Runtime<E> {
    pub fn new(
        core: CoreController,
        event_rx: mpsc::Receiver<ControllerEvent>,
        engine: Arc<E>,
        frames: watch::Sender<ViewFrame>,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            core,
            event_rx,
            result_tx,
            result_rx,
            engine,
            frames,
            timeout: None,
            pending: Vec::new(),
        }
    }

    /// Fail layout calls that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Main event loop.
    ///
    /// - Consumes `ControllerEvent`s from `event_rx` and layout results from
    ///   the spawned engine calls.
    /// - Feeds them into the core controller.
    /// - Executes commands returned by the core (start layout, publish).
    pub async fn run(mut self) -> Result<()> {
        info!("dagview controller started");

        loop {
            let event = tokio::select! {
                event = self.event_rx.recv() => match event {
                    Some(e) => e,
                    None => {
                        info!("controller event channel closed; exiting");
                        break;
                    }
                },
                Some((generation, result)) = self.result_rx.recv() => {
                    ControllerEvent::LayoutFinished { generation, result }
                }
            };

            debug!(?event, "controller received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("core requested exit; stopping controller");
                break;
            }
        }

        for handle in self.pending.drain(..) {
            handle.abort();
        }
        info!("controller exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::StartLayout {
                generation,
                request,
            } => self.spawn_layout(generation, request),
            CoreCommand::Publish(frame) => {
                debug!(
                    generation = frame.generation,
                    has_model = frame.model.is_some(),
                    error = frame.error.as_deref(),
                    "publishing frame"
                );
                self.frames.send_replace(frame);
            }
        }
    }

    fn spawn_layout(&mut self, generation: u64, request: ElkNode) {
        self.pending.retain(|handle| !handle.is_finished());

        let engine = Arc::clone(&self.engine);
        let result_tx = self.result_tx.clone();
        let timeout = self.timeout;
        debug!(generation, ?timeout, "starting layout");

        self.pending.push(tokio::spawn(async move {
            let call = engine.layout(request);
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => Err(LayoutError::Timeout(limit)),
                },
                None => call.await,
            };
            // The loop may have exited already.
            let _ = result_tx.send((generation, result));
        }));
    }
}
