#![allow(dead_code)]

use dagview::graph::{Edge, RawGraph, TreeNode};
use dagview::pipeline::{CollapseOverrides, GroupOverride, ViewSettings};
use dagview::types::{Algorithm, Direction};
use serde_json::Value;

/// Leaf node with no payload.
pub fn leaf(id: &str) -> TreeNode {
    TreeNode::leaf(id)
}

/// Group node with the given children.
pub fn group(id: &str, children: Vec<TreeNode>) -> TreeNode {
    TreeNode::group(id, children)
}

/// Builder for `RawGraph` to simplify test setup.
///
/// ```ignore
/// let graph = GraphBuilder::new()
///     .group("B", |g| g.leaf("C"))
///     .leaf("D")
///     .edge("C", "D")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    children: Vec<TreeNode>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(mut self, id: &str) -> Self {
        self.children.push(TreeNode::leaf(id));
        self
    }

    pub fn node(mut self, node: TreeNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn group(mut self, id: &str, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        self.children.push(f(GroupBuilder::new(id)).build());
        self
    }

    pub fn edge(mut self, source: &str, target: &str) -> Self {
        self.edges.push(Edge::new(source, target));
        self
    }

    pub fn build(self) -> RawGraph {
        RawGraph::new(self.children, self.edges)
    }
}

/// Builder for one group inside a [`GraphBuilder`].
#[derive(Debug)]
pub struct GroupBuilder {
    node: TreeNode,
}

impl GroupBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            node: TreeNode::group(id, Vec::new()),
        }
    }

    fn push(&mut self, child: TreeNode) {
        self.node.children.get_or_insert_with(Vec::new).push(child);
    }

    pub fn leaf(mut self, id: &str) -> Self {
        self.push(TreeNode::leaf(id));
        self
    }

    pub fn sized_leaf(mut self, id: &str, width: f64, height: f64) -> Self {
        let mut node = TreeNode::leaf(id);
        node.width = Some(width);
        node.height = Some(height);
        self.push(node);
        self
    }

    pub fn group(mut self, id: &str, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let child = f(GroupBuilder::new(id)).build();
        self.push(child);
        self
    }

    pub fn payload(mut self, key: &str, value: Value) -> Self {
        self.node.payload.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> TreeNode {
        self.node
    }
}

/// `root → B(group) → C`, sibling `D`, edge `C → D`.
pub fn rewire_fixture() -> RawGraph {
    GraphBuilder::new()
        .group("B", |g| g.leaf("C"))
        .leaf("D")
        .edge("C", "D")
        .build()
}

/// A single chain of nested groups `n0 ⊃ n1 ⊃ … ⊃ n{depth}` where the
/// innermost node is a leaf. `n0` is at depth 0.
pub fn nested_chain(depth: usize) -> RawGraph {
    let mut node = TreeNode::leaf(format!("n{depth}"));
    for level in (0..depth).rev() {
        node = TreeNode::group(format!("n{level}"), vec![node]);
    }
    RawGraph::new(vec![node], Vec::new())
}

/// Builder for `ViewSettings`.
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    settings: ViewSettings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: ViewSettings::default(),
        }
    }

    pub fn visible_depth(mut self, depth: usize) -> Self {
        self.settings.visible_depth = depth;
        self
    }

    pub fn collapse(mut self, group: &str) -> Self {
        self.settings.overrides.set(group, GroupOverride::Collapsed);
        self
    }

    pub fn expand(mut self, group: &str) -> Self {
        self.settings.overrides.set(group, GroupOverride::Expanded);
        self
    }

    pub fn overrides(mut self, overrides: CollapseOverrides) -> Self {
        self.settings.overrides = overrides;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.settings.layout.direction = direction;
        self
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.settings.layout.algorithm = algorithm;
        self
    }

    pub fn no_header(mut self) -> Self {
        self.settings.header_height = None;
        self
    }

    pub fn build(self) -> ViewSettings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
