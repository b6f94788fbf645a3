// src/layout/options.rs

use std::collections::BTreeMap;

use crate::types::{Algorithm, Direction, HierarchyHandling};

pub const KEY_ALGORITHM: &str = "elk.algorithm";
pub const KEY_DIRECTION: &str = "elk.direction";
pub const KEY_NODE_SPACING: &str = "elk.spacing.nodeNode";
pub const KEY_LAYER_SPACING: &str = "elk.layered.spacing.nodeNodeBetweenLayers";
pub const KEY_COMPONENT_SPACING: &str = "elk.spacing.componentComponent";
pub const KEY_HIERARCHY: &str = "elk.hierarchyHandling";

/// Options forwarded to the layout engine.
///
/// `direction` is also read by the extractor to pick connector sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub algorithm: Algorithm,
    pub direction: Direction,
    /// Gap between nodes of the same layer / neighbouring nodes.
    pub node_spacing: f64,
    /// Gap between consecutive layers (layered only).
    pub layer_spacing: f64,
    /// Gap between disconnected components.
    pub component_spacing: f64,
    pub hierarchy: HierarchyHandling,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            direction: Direction::default(),
            node_spacing: 100.0,
            layer_spacing: 100.0,
            component_spacing: 300.0,
            hierarchy: HierarchyHandling::default(),
        }
    }
}

impl LayoutOptions {
    /// Serialize into the engine's `layoutOptions` map.
    pub fn to_elk_options(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(KEY_ALGORITHM.to_string(), self.algorithm.elk_value().to_string());
        map.insert(KEY_DIRECTION.to_string(), self.direction.elk_value().to_string());
        map.insert(KEY_NODE_SPACING.to_string(), self.node_spacing.to_string());
        map.insert(KEY_LAYER_SPACING.to_string(), self.layer_spacing.to_string());
        map.insert(
            KEY_COMPONENT_SPACING.to_string(),
            self.component_spacing.to_string(),
        );
        map.insert(KEY_HIERARCHY.to_string(), self.hierarchy.elk_value().to_string());
        map
    }

    /// Read options back from a `layoutOptions` map.
    ///
    /// Unknown keys are ignored and missing or unparsable values fall back
    /// to the defaults, the way an engine treats a partial option set.
    pub fn from_elk_options(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let num = |key: &str, fallback: f64| {
            map.get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(fallback)
        };

        Self {
            algorithm: map
                .get(KEY_ALGORITHM)
                .and_then(|v| {
                    v.trim_start_matches("org.eclipse.")
                        .trim_start_matches("elk.")
                        .parse()
                        .ok()
                })
                .unwrap_or(defaults.algorithm),
            direction: map
                .get(KEY_DIRECTION)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.direction),
            node_spacing: num(KEY_NODE_SPACING, defaults.node_spacing),
            layer_spacing: num(KEY_LAYER_SPACING, defaults.layer_spacing),
            component_spacing: num(KEY_COMPONENT_SPACING, defaults.component_spacing),
            hierarchy: match map.get(KEY_HIERARCHY).map(String::as_str) {
                Some("SEPARATE_CHILDREN") => HierarchyHandling::SeparateChildren,
                Some("INCLUDE_CHILDREN") => HierarchyHandling::IncludeChildren,
                _ => defaults.hierarchy,
            },
        }
    }
}
