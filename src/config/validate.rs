// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DagviewError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DagviewError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.view, raw.layout, raw.collapse))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_view(cfg)?;
    validate_layout(cfg)?;
    validate_collapse(cfg)?;
    Ok(())
}

fn validate_view(cfg: &RawConfigFile) -> Result<()> {
    ensure_positive("[view].node_width", cfg.view.node_width)?;
    ensure_positive("[view].node_height", cfg.view.node_height)?;
    if cfg.view.group_header {
        ensure_positive("[view].header_height", cfg.view.header_height)?;
    }
    Ok(())
}

fn validate_layout(cfg: &RawConfigFile) -> Result<()> {
    ensure_spacing("[layout].node_spacing", cfg.layout.node_spacing)?;
    ensure_spacing("[layout].layer_spacing", cfg.layout.layer_spacing)?;
    ensure_spacing("[layout].component_spacing", cfg.layout.component_spacing)?;

    if cfg.layout.timeout_ms == Some(0) {
        return Err(DagviewError::ConfigError(
            "[layout].timeout_ms must be >= 1 (got 0); omit it to disable the timeout"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_collapse(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for group in &cfg.collapse.groups {
        if group.is_empty() {
            return Err(DagviewError::ConfigError(
                "[collapse].groups must not contain empty ids".to_string(),
            ));
        }
        if !seen.insert(group.as_str()) {
            return Err(DagviewError::ConfigError(format!(
                "[collapse].groups lists '{group}' more than once"
            )));
        }
    }
    Ok(())
}

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DagviewError::ConfigError(format!(
            "{name} must be a positive number (got {value})"
        )));
    }
    Ok(())
}

fn ensure_spacing(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DagviewError::ConfigError(format!(
            "{name} must be a non-negative number (got {value})"
        )));
    }
    Ok(())
}
