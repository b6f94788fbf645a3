// src/config/mod.rs

//! Configuration loading and validation for dagview.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate sizes, spacings and the collapse list (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{CollapseSection, ConfigFile, LayoutSection, RawConfigFile, ViewSection};
