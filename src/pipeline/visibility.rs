// src/pipeline/visibility.rs

//! Visibility resolver.
//!
//! Computes, per parent, the set of direct children that are hidden. Two
//! sources feed it:
//!
//! 1. the depth cutoff: a node deeper than `visible_depth` (top-level nodes
//!    are depth 0) is hidden under its immediate parent;
//! 2. per-group overrides set by the user, which replace the depth rule for
//!    that group's own entry only.
//!
//! The state is always rebuilt from scratch; nothing accumulates across
//! calls.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::graph::model::{ROOT_ID, TreeNode};

/// Manual state of a single group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOverride {
    /// Hide every direct child.
    Collapsed,
    /// Hide no direct child, whatever the depth cutoff says.
    Expanded,
}

/// User collapse/expand choices, keyed by group id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseOverrides {
    groups: BTreeMap<String, GroupOverride>,
}

impl CollapseOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides that collapse each of the given groups.
    pub fn collapsed<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|g| (g.into(), GroupOverride::Collapsed))
                .collect(),
        }
    }

    pub fn get(&self, group: &str) -> Option<GroupOverride> {
        self.groups.get(group).copied()
    }

    pub fn set(&mut self, group: impl Into<String>, value: GroupOverride) {
        self.groups.insert(group.into(), value);
    }

    pub fn clear(&mut self, group: &str) {
        self.groups.remove(group);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, GroupOverride)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Flip the collapse state of `group` as the user sees it.
    ///
    /// A group that currently hides children is expanded: its override is
    /// dropped, or set to [`GroupOverride::Expanded`] when the depth cutoff
    /// alone would still hide its children. Any other group is collapsed.
    ///
    /// Returns `true` when the group ends up collapsed.
    pub fn toggle(&mut self, root: &TreeNode, visible_depth: usize, group: &str) -> bool {
        let current = resolve(root, visible_depth, self);
        if current.hides_any(group) {
            let depth_only = resolve(root, visible_depth, &CollapseOverrides::new());
            if depth_only.hides_any(group) {
                self.set(group, GroupOverride::Expanded);
            } else {
                self.clear(group);
            }
            debug!(group, "group expanded");
            false
        } else {
            self.set(group, GroupOverride::Collapsed);
            debug!(group, "group collapsed");
            true
        }
    }
}

/// Per-parent hidden children. Top-level nodes live under [`ROOT_ID`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityState {
    hidden: BTreeMap<String, BTreeSet<String>>,
}

impl VisibilityState {
    /// Hidden children recorded under `parent`, if any.
    pub fn hidden_under(&self, parent: &str) -> Option<&BTreeSet<String>> {
        self.hidden.get(parent)
    }

    pub fn is_hidden(&self, parent: &str, child: &str) -> bool {
        self.hidden
            .get(parent)
            .is_some_and(|set| set.contains(child))
    }

    /// True when `parent` currently hides at least one child.
    pub fn hides_any(&self, parent: &str) -> bool {
        self.hidden.get(parent).is_some_and(|set| !set.is_empty())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.hidden.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of `(parent, child)` records.
    pub fn hidden_count(&self) -> usize {
        self.hidden.values().map(BTreeSet::len).sum()
    }

    fn record(&mut self, parent: &str, child: &str) {
        self.hidden
            .entry(parent.to_string())
            .or_default()
            .insert(child.to_string());
    }
}

/// Resolve which children are hidden under which parent.
///
/// `root` is the synthetic container; its children are at depth 0.
pub fn resolve(
    root: &TreeNode,
    visible_depth: usize,
    overrides: &CollapseOverrides,
) -> VisibilityState {
    let mut state = VisibilityState::default();

    for top in root.children() {
        apply_depth_rule(top, ROOT_ID, 0, visible_depth, &mut state);
    }

    for (group, value) in overrides.iter() {
        let Some(node) = root.find(group).filter(|n| n.is_group() && n.id != root.id) else {
            debug!(group, "ignoring override for unknown group");
            continue;
        };
        match value {
            GroupOverride::Collapsed => {
                let children: BTreeSet<String> =
                    node.children().iter().map(|c| c.id.clone()).collect();
                if children.is_empty() {
                    state.hidden.remove(group);
                } else {
                    state.hidden.insert(group.to_string(), children);
                }
            }
            GroupOverride::Expanded => {
                state.hidden.remove(group);
            }
        }
    }

    debug!(
        parents = state.hidden.len(),
        hidden = state.hidden_count(),
        visible_depth,
        "visibility resolved"
    );
    state
}

fn apply_depth_rule(
    node: &TreeNode,
    parent: &str,
    depth: usize,
    visible_depth: usize,
    state: &mut VisibilityState,
) {
    if depth > visible_depth {
        state.record(parent, &node.id);
    }
    for child in node.children() {
        apply_depth_rule(child, &node.id, depth + 1, visible_depth, state);
    }
}
