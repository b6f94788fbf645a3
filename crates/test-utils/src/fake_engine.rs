use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dagview::layout::{ElkNode, LayoutEngine, LayoutError, LayoutFuture};

/// What the fake engine does on one call.
#[derive(Debug, Clone)]
pub enum CallScript {
    /// Answer right away.
    Immediate,
    /// Answer after sleeping.
    Delayed(Duration),
    /// Fail with the given error.
    Fail(LayoutError),
    /// Answer, but leave the named node out of the response.
    DropNode(String),
}

/// A fake layout engine that:
/// - records every request it receives
/// - places children of each container in a single row (deterministic)
/// - follows a per-call script (delays, failures, broken responses);
///   calls past the end of the script answer immediately.
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    script: Arc<Mutex<VecDeque<CallScript>>>,
    requests: Arc<Mutex<Vec<ElkNode>>>,
}

impl FakeEngine {
    pub const GAP: f64 = 10.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<CallScript>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::default(),
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<ElkNode> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl LayoutEngine for FakeEngine {
    fn layout(&self, graph: ElkNode) -> LayoutFuture<'_> {
        self.requests.lock().unwrap().push(graph.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CallScript::Immediate);

        Box::pin(async move {
            match step {
                CallScript::Immediate => Ok(row_layout(graph)),
                CallScript::Delayed(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(row_layout(graph))
                }
                CallScript::Fail(err) => Err(err),
                CallScript::DropNode(id) => {
                    let mut out = row_layout(graph);
                    drop_node(&mut out, &id);
                    Ok(out)
                }
            }
        })
    }
}

/// Lay every container's children out left to right, sizing groups around
/// them. Edges are moved to the root.
pub fn row_layout(mut graph: ElkNode) -> ElkNode {
    let mut edges = Vec::new();
    place_row(&mut graph, &mut edges);
    graph.x = Some(0.0);
    graph.y = Some(0.0);
    graph.edges = edges;
    graph
}

fn place_row(node: &mut ElkNode, edges: &mut Vec<dagview::layout::ElkEdge>) {
    edges.append(&mut node.edges);

    let header = node.labels.iter().map(|l| l.height).fold(0.0, f64::max);
    let mut x = FakeEngine::GAP;
    let mut tallest: f64 = 0.0;

    for child in &mut node.children {
        if !child.children.is_empty() {
            place_row(child, edges);
        } else {
            edges.append(&mut child.edges);
        }
        let width = child.width.unwrap_or(0.0);
        let height = child.height.unwrap_or(0.0);
        child.x = Some(x);
        child.y = Some(FakeEngine::GAP + header);
        x += width + FakeEngine::GAP;
        tallest = tallest.max(height);
    }

    if !node.children.is_empty() {
        node.width = Some(x);
        node.height = Some(FakeEngine::GAP * 2.0 + header + tallest);
    }
}

fn drop_node(node: &mut ElkNode, id: &str) {
    node.children.retain(|c| c.id != id);
    for child in &mut node.children {
        drop_node(child, id);
    }
}
