// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::{Algorithm, Direction};

/// Command-line arguments for `dagview`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagview",
    version,
    about = "Turn a job-dependency graph into a positioned, collapsible diagram model.",
    long_about = None
)]
pub struct CliArgs {
    /// Graph JSON document to render, or `-` for stdin.
    #[arg(long, value_name = "PATH|-", default_value = "-")]
    pub graph: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Dagview.toml` in the current working directory if it
    /// exists, built-in defaults otherwise.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Input is a flat job list (`{nodes, edges}`) whose names encode the
    /// group hierarchy.
    #[arg(long)]
    pub flat: bool,

    /// Collapse this group (repeatable). Added to `[collapse].groups`.
    #[arg(long, value_name = "ID")]
    pub collapse: Vec<String>,

    /// Hide nodes deeper than this (top-level nodes are depth 0).
    #[arg(long, value_name = "N")]
    pub visible_depth: Option<usize>,

    /// Layout direction (`down` or `right`).
    #[arg(long, value_name = "DIR")]
    pub direction: Option<Direction>,

    /// Layout algorithm (`layered` or `force`).
    #[arg(long, value_name = "NAME")]
    pub algorithm: Option<Algorithm>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGVIEW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse, resolve visibility and prune, print the result, but don't
    /// lay anything out.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
