// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::layout::LayoutError;

#[derive(Error, Debug)]
pub enum DagviewError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required fields or duplicate ids in the raw graph.
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagviewError>;
