// src/pipeline/mod.rs

//! The visibility → prune → layout → extract pipeline.
//!
//! Every stage except the layout call is a pure function over immutable
//! input, so a run can be split in two halves: [`prepare`] does the
//! synchronous work and builds the engine request, and
//! [`PreparedLayout::finish`] maps an engine response to the visual model.
//! The controller uses the split to run the engine call on its own task;
//! [`render_model`] chains both halves for one-shot use.

use tracing::debug;

use crate::errors::Result;
use crate::graph::model::RawGraph;
use crate::graph::validate::validate_graph;
use crate::layout::{ElkNode, LayoutEngine, LayoutError, LayoutOptions, from_elk, to_elk};
use crate::types::Direction;

pub mod extract;
pub mod prune;
pub mod visibility;

pub use extract::{VisualEdge, VisualKind, VisualModel, VisualNode, extract};
pub use prune::{NodeDimensions, NodeKind, PrunedGraph, PrunedNode, prune};
pub use visibility::{CollapseOverrides, GroupOverride, VisibilityState, resolve};

/// Default depth cutoff: deep enough that nothing is hidden by depth.
pub const DEFAULT_VISIBLE_DEPTH: usize = 999;

/// Everything a pipeline run needs besides the graph and the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub visible_depth: usize,
    pub overrides: CollapseOverrides,
    pub dimensions: NodeDimensions,
    pub layout: LayoutOptions,
    /// Height of the synthetic group header; `None` disables it.
    pub header_height: Option<f64>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            visible_depth: DEFAULT_VISIBLE_DEPTH,
            overrides: CollapseOverrides::new(),
            dimensions: NodeDimensions::default(),
            layout: LayoutOptions::default(),
            header_height: Some(40.0),
        }
    }
}

/// Result of the synchronous half of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLayout {
    pub visibility: VisibilityState,
    pub pruned: PrunedGraph,
    /// Request to hand to the layout engine.
    pub request: ElkNode,
    pub direction: Direction,
}

impl PreparedLayout {
    /// Map the engine's answer to the visual model.
    pub fn finish(&self, response: ElkNode) -> std::result::Result<VisualModel, LayoutError> {
        let positioned = from_elk(response, &self.pruned)?;
        Ok(extract(&positioned, self.direction))
    }
}

/// Resolve visibility, prune, and build the engine request.
pub fn prepare(graph: &RawGraph, settings: &ViewSettings) -> Result<PreparedLayout> {
    validate_graph(graph)?;

    let visibility = resolve(&graph.root, settings.visible_depth, &settings.overrides);
    let pruned = prune(graph, &visibility, &settings.dimensions);
    let request = to_elk(&pruned, &settings.layout, settings.header_height);

    debug!(
        visible = pruned.visible_ids.len(),
        edges = pruned.edges.len(),
        hidden = visibility.hidden_count(),
        "layout request prepared"
    );

    Ok(PreparedLayout {
        visibility,
        pruned,
        request,
        direction: settings.layout.direction,
    })
}

/// Run the whole pipeline once.
pub async fn render_model<E>(
    graph: &RawGraph,
    settings: &ViewSettings,
    engine: &E,
) -> Result<VisualModel>
where
    E: LayoutEngine + ?Sized,
{
    let prepared = prepare(graph, settings)?;
    let response = engine.layout(prepared.request.clone()).await?;
    Ok(prepared.finish(response)?)
}
