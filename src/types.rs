// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Flow direction of the layout.
///
/// Besides steering the engine, the direction decides which side of each
/// visual node carries the incoming and outgoing connectors:
///
/// - `Down`: targets enter at the top, sources leave at the bottom.
/// - `Right`: targets enter on the left, sources leave on the right
///   (default, matches the dashboard's horizontal job flow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Right,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Right
    }
}

impl Direction {
    /// Value used for the `elk.direction` layout option.
    pub fn elk_value(self) -> &'static str {
        match self {
            Direction::Down => "DOWN",
            Direction::Right => "RIGHT",
        }
    }

    /// `(source_side, target_side)` for nodes laid out in this direction.
    pub fn connector_sides(self) -> (ConnectorSide, ConnectorSide) {
        match self {
            Direction::Down => (ConnectorSide::Bottom, ConnectorSide::Top),
            Direction::Right => (ConnectorSide::Right, ConnectorSide::Left),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "down" | "tb" => Ok(Direction::Down),
            "right" | "lr" => Ok(Direction::Right),
            other => Err(format!(
                "invalid direction: {other} (expected \"down\" or \"right\")"
            )),
        }
    }
}

/// Layout algorithm requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Force-directed placement (dashboard default).
    Force,
    /// Layered (Sugiyama-style) placement.
    Layered,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Force
    }
}

impl Algorithm {
    pub fn elk_value(self) -> &'static str {
        match self {
            Algorithm::Force => "force",
            Algorithm::Layered => "layered",
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "force" => Ok(Algorithm::Force),
            "layered" => Ok(Algorithm::Layered),
            other => Err(format!(
                "invalid algorithm: {other} (expected \"force\" or \"layered\")"
            )),
        }
    }
}

/// Whether nested groups are laid out jointly with their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyHandling {
    /// Edges crossing group borders influence the placement of the groups
    /// that contain their endpoints.
    IncludeChildren,
    /// Every group is laid out on its own; only edges between direct
    /// siblings count.
    SeparateChildren,
}

impl Default for HierarchyHandling {
    fn default() -> Self {
        HierarchyHandling::IncludeChildren
    }
}

impl HierarchyHandling {
    pub fn elk_value(self) -> &'static str {
        match self {
            HierarchyHandling::IncludeChildren => "INCLUDE_CHILDREN",
            HierarchyHandling::SeparateChildren => "SEPARATE_CHILDREN",
        }
    }
}

/// Side of a visual node where an edge attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl fmt::Display for ConnectorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectorSide::Top => "top",
            ConnectorSide::Bottom => "bottom",
            ConnectorSide::Left => "left",
            ConnectorSide::Right => "right",
        };
        f.write_str(s)
    }
}
