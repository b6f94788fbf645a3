// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::layout::LayoutOptions;
use crate::pipeline::{CollapseOverrides, DEFAULT_VISIBLE_DEPTH, NodeDimensions, ViewSettings};
use crate::types::{Algorithm, Direction, HierarchyHandling};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [view]
/// visible_depth = 2
/// node_width = 250.0
/// node_height = 150.0
/// group_header = true
/// header_height = 40.0
///
/// [layout]
/// algorithm = "layered"
/// direction = "down"
/// timeout_ms = 5000
///
/// [collapse]
/// groups = ["preprocess"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub view: ViewSection,

    #[serde(default)]
    pub layout: LayoutSection,

    #[serde(default)]
    pub collapse: CollapseSection,
}

/// `[view]` section: what is visible and how big nodes are.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewSection {
    /// Nodes deeper than this (top-level nodes are depth 0) start hidden.
    #[serde(default = "default_visible_depth")]
    pub visible_depth: usize,

    /// Size given to nodes that carry none of their own.
    #[serde(default = "default_node_width")]
    pub node_width: f64,

    #[serde(default = "default_node_height")]
    pub node_height: f64,

    /// Reserve a header label on every group.
    #[serde(default = "default_true")]
    pub group_header: bool,

    #[serde(default = "default_header_height")]
    pub header_height: f64,
}

fn default_visible_depth() -> usize {
    DEFAULT_VISIBLE_DEPTH
}

fn default_node_width() -> f64 {
    NodeDimensions::default().width
}

fn default_node_height() -> f64 {
    NodeDimensions::default().height
}

fn default_true() -> bool {
    true
}

fn default_header_height() -> f64 {
    40.0
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            visible_depth: default_visible_depth(),
            node_width: default_node_width(),
            node_height: default_node_height(),
            group_header: default_true(),
            header_height: default_header_height(),
        }
    }
}

/// `[layout]` section: options forwarded to the layout engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSection {
    #[serde(default)]
    pub algorithm: Algorithm,

    #[serde(default)]
    pub direction: Direction,

    #[serde(default = "default_node_spacing")]
    pub node_spacing: f64,

    #[serde(default = "default_layer_spacing")]
    pub layer_spacing: f64,

    #[serde(default = "default_component_spacing")]
    pub component_spacing: f64,

    #[serde(default)]
    pub hierarchy: HierarchyHandling,

    /// Give up on a layout call after this many milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_node_spacing() -> f64 {
    LayoutOptions::default().node_spacing
}

fn default_layer_spacing() -> f64 {
    LayoutOptions::default().layer_spacing
}

fn default_component_spacing() -> f64 {
    LayoutOptions::default().component_spacing
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            direction: Direction::default(),
            node_spacing: default_node_spacing(),
            layer_spacing: default_layer_spacing(),
            component_spacing: default_component_spacing(),
            hierarchy: HierarchyHandling::default(),
            timeout_ms: None,
        }
    }
}

/// `[collapse]` section: groups collapsed at startup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollapseSection {
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (or `Default`), so the
/// sizes and spacings it carries are known to be usable.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    view: ViewSection,
    layout: LayoutSection,
    collapse: CollapseSection,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            ViewSection::default(),
            LayoutSection::default(),
            CollapseSection::default(),
        )
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        view: ViewSection,
        layout: LayoutSection,
        collapse: CollapseSection,
    ) -> Self {
        Self {
            view,
            layout,
            collapse,
        }
    }

    pub fn view(&self) -> &ViewSection {
        &self.view
    }

    pub fn layout(&self) -> &LayoutSection {
        &self.layout
    }

    pub fn collapse(&self) -> &CollapseSection {
        &self.collapse
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            algorithm: self.layout.algorithm,
            direction: self.layout.direction,
            node_spacing: self.layout.node_spacing,
            layer_spacing: self.layout.layer_spacing,
            component_spacing: self.layout.component_spacing,
            hierarchy: self.layout.hierarchy,
        }
    }

    pub fn layout_timeout(&self) -> Option<Duration> {
        self.layout.timeout_ms.map(Duration::from_millis)
    }

    /// Initial pipeline settings described by this config.
    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            visible_depth: self.view.visible_depth,
            overrides: CollapseOverrides::collapsed(self.collapse.groups.iter().cloned()),
            dimensions: NodeDimensions {
                width: self.view.node_width,
                height: self.view.node_height,
            },
            layout: self.layout_options(),
            header_height: self.view.group_header.then_some(self.view.header_height),
        }
    }
}
