// src/layout/builtin.rs

//! Deterministic in-process layout engine.
//!
//! Implements the same request/response contract as an external engine:
//! it reads `layoutOptions` from the root container, sizes groups
//! bottom-up around their children and writes relative `x`/`y` for every
//! node. All edges are returned on the root container.
//!
//! Placement of the direct children of one container is delegated to
//! [`layered`](super::layered) or [`force`](super::force); edges between
//! deeper descendants are projected onto the direct children that contain
//! them unless `SEPARATE_CHILDREN` is requested.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::unionfind::UnionFind;
use tracing::debug;

use crate::layout::{
    ElkEdge, ElkNode, LayoutEngine, LayoutError, LayoutFuture, LayoutOptions, force, layered,
};
use crate::types::{Algorithm, Direction, HierarchyHandling};

/// Size of one child handed to a placement algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    /// `(along the flow, across the flow)` for `direction`.
    pub(crate) fn axes(self, direction: Direction) -> (f64, f64) {
        match direction {
            Direction::Down => (self.height, self.width),
            Direction::Right => (self.width, self.height),
        }
    }
}

/// Built-in engine. `padding` is the inner margin of every container.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinEngine {
    padding: f64,
}

impl Default for BuiltinEngine {
    fn default() -> Self {
        Self { padding: 12.0 }
    }
}

impl BuiltinEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_padding(padding: f64) -> Self {
        Self {
            padding: padding.max(0.0),
        }
    }

    /// Synchronous layout; the async trait method wraps this.
    pub fn compute(&self, mut graph: ElkNode) -> Result<ElkNode, LayoutError> {
        let options = LayoutOptions::from_elk_options(&graph.layout_options);

        let paths = index_paths(&graph)?;
        let mut edges = Vec::new();
        collect_edges(&mut graph, &mut edges);
        for edge in &edges {
            for endpoint in edge.sources.iter().take(1).chain(edge.targets.iter().take(1)) {
                if !paths.contains_key(endpoint.as_str()) {
                    return Err(LayoutError::Rejected(format!(
                        "edge '{}' references unknown node '{endpoint}'",
                        edge.id
                    )));
                }
            }
            if edge.sources.is_empty() || edge.targets.is_empty() {
                return Err(LayoutError::Rejected(format!(
                    "edge '{}' has no endpoints",
                    edge.id
                )));
            }
        }

        let ctx = Context {
            options,
            padding: self.padding,
            paths: &paths,
            edges: &edges,
        };
        ctx.layout_container(&mut graph, &[], true);

        debug!(
            nodes = paths.len(),
            edges = edges.len(),
            algorithm = options.algorithm.elk_value(),
            "builtin layout computed"
        );

        graph.edges = edges;
        Ok(graph)
    }
}

/// Runs [`BuiltinEngine::compute`] on the blocking pool so callers can
/// time the call out and the controller loop keeps running meanwhile.
/// Must be awaited inside a tokio runtime.
impl LayoutEngine for BuiltinEngine {
    fn layout(&self, graph: ElkNode) -> LayoutFuture<'_> {
        let engine = *self;
        Box::pin(async move {
            tokio::task::spawn_blocking(move || engine.compute(graph))
                .await
                .map_err(|e| LayoutError::Engine(format!("layout task failed: {e}")))?
        })
    }
}

/// Map every node id to its path of ids from the top level down to itself,
/// rejecting duplicates and unusable sizes.
fn index_paths(root: &ElkNode) -> Result<HashMap<String, Vec<String>>, LayoutError> {
    fn go(
        node: &ElkNode,
        prefix: &mut Vec<String>,
        out: &mut HashMap<String, Vec<String>>,
    ) -> Result<(), LayoutError> {
        for child in &node.children {
            for v in [child.width, child.height].into_iter().flatten() {
                if !v.is_finite() || v < 0.0 {
                    return Err(LayoutError::Rejected(format!(
                        "node '{}' has an invalid size",
                        child.id
                    )));
                }
            }
            prefix.push(child.id.clone());
            if out.insert(child.id.clone(), prefix.clone()).is_some() || child.id == node.id {
                return Err(LayoutError::Rejected(format!(
                    "duplicate node id '{}'",
                    child.id
                )));
            }
            go(child, prefix, out)?;
            prefix.pop();
        }
        Ok(())
    }

    let mut out = HashMap::new();
    go(root, &mut Vec::new(), &mut out)?;
    if out.contains_key(&root.id) {
        return Err(LayoutError::Rejected(format!(
            "duplicate node id '{}'",
            root.id
        )));
    }
    Ok(out)
}

fn collect_edges(node: &mut ElkNode, out: &mut Vec<ElkEdge>) {
    out.append(&mut node.edges);
    for child in &mut node.children {
        collect_edges(child, out);
    }
}

struct Context<'a> {
    options: LayoutOptions,
    padding: f64,
    paths: &'a HashMap<String, Vec<String>>,
    edges: &'a [ElkEdge],
}

impl Context<'_> {
    /// Lay out `node`'s children (recursively) and size `node` around them.
    fn layout_container(&self, node: &mut ElkNode, path: &[String], is_root: bool) {
        let mut child_path = path.to_vec();
        for child in &mut node.children {
            if !child.children.is_empty() {
                child_path.push(child.id.clone());
                self.layout_container(child, &child_path, false);
                child_path.pop();
            }
        }

        let header = node.labels.iter().map(|l| l.height).fold(0.0, f64::max);
        for label in &mut node.labels {
            label.x = Some(self.padding);
            label.y = Some(0.0);
        }

        if node.children.is_empty() {
            if is_root {
                node.x = Some(0.0);
                node.y = Some(0.0);
                node.width = Some(0.0);
                node.height = Some(0.0);
            }
            return;
        }

        let extents: Vec<Extent> = node
            .children
            .iter()
            .map(|c| Extent {
                width: c.width.unwrap_or(0.0),
                height: c.height.unwrap_or(0.0),
            })
            .collect();
        let links = self.project_edges(node, path);

        let positions = match self.options.algorithm {
            Algorithm::Layered => layered::place(&extents, &links, &self.options),
            Algorithm::Force => force::place(&extents, &links, &self.options),
        };

        let origin_x = self.padding;
        let origin_y = self.padding + header;
        let mut max_x: f64 = 0.0;
        let mut max_y: f64 = 0.0;
        for ((child, (x, y)), extent) in node.children.iter_mut().zip(positions).zip(&extents) {
            child.x = Some(origin_x + x);
            child.y = Some(origin_y + y);
            max_x = max_x.max(origin_x + x + extent.width);
            max_y = max_y.max(origin_y + y + extent.height);
        }

        let label_width = node.labels.iter().map(|l| l.width).fold(0.0, f64::max);
        node.width = Some((max_x + self.padding).max(label_width));
        node.height = Some(max_y + self.padding);
        if is_root {
            node.x = Some(0.0);
            node.y = Some(0.0);
        }
    }

    /// Edges between direct children of the container at `path`, as index
    /// pairs into `node.children`.
    fn project_edges(&self, node: &ElkNode, path: &[String]) -> Vec<(usize, usize)> {
        let position: HashMap<&str, usize> = node
            .children
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.as_str(), i))
            .collect();
        let depth = path.len();

        let representative = |id: &str| -> Option<(usize, bool)> {
            let full = self.paths.get(id)?;
            if full.len() <= depth || full[..depth] != *path {
                return None;
            }
            let idx = *position.get(full[depth].as_str())?;
            Some((idx, full.len() == depth + 1))
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for edge in self.edges {
            let (Some(source), Some(target)) = (edge.sources.first(), edge.targets.first()) else {
                continue;
            };
            let (Some((s, s_direct)), Some((t, t_direct))) =
                (representative(source), representative(target))
            else {
                continue;
            };
            if s == t {
                continue;
            }
            if self.options.hierarchy == HierarchyHandling::SeparateChildren
                && !(s_direct && t_direct)
            {
                continue;
            }
            if seen.insert((s, t)) {
                links.push((s, t));
            }
        }
        links
    }
}

/// Connected components over `links`, each sorted by index and ordered by
/// their smallest member.
pub(crate) fn components(count: usize, links: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::<usize>::new(count);
    for &(s, t) in links {
        sets.union(s, t);
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut first_of: HashMap<usize, usize> = HashMap::new();
    for i in 0..count {
        let rep = sets.find(i);
        let first = *first_of.entry(rep).or_insert(i);
        groups.entry(first).or_default().push(i);
    }
    groups.into_values().collect()
}

/// Place component layouts next to each other across the flow.
///
/// Each entry holds the member indices and their positions relative to the
/// component's own origin.
pub(crate) fn pack_components(
    count: usize,
    parts: Vec<(Vec<usize>, Vec<(f64, f64)>)>,
    extents: &[Extent],
    direction: Direction,
    spacing: f64,
) -> Vec<(f64, f64)> {
    let mut out = vec![(0.0, 0.0); count];
    let mut offset = 0.0;

    for (members, positions) in parts {
        let mut extent_across: f64 = 0.0;
        for (&idx, &(x, y)) in members.iter().zip(&positions) {
            let (_, across) = extents[idx].axes(direction);
            let start = match direction {
                Direction::Down => x,
                Direction::Right => y,
            };
            extent_across = extent_across.max(start + across);
            out[idx] = match direction {
                Direction::Down => (x + offset, y),
                Direction::Right => (x, y + offset),
            };
        }
        offset += extent_across + spacing;
    }

    out
}
