// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod types;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::ConfigFile;
use crate::graph::{FlatGraph, RawGraph, build_hierarchy};
use crate::layout::{BuiltinEngine, LayoutError};
use crate::pipeline::{GroupOverride, PreparedLayout, ViewSettings, VisualModel, prepare, render_model};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - graph loading (nested or flat)
/// - CLI overrides of the view settings
/// - one pipeline run with the built-in engine
/// - JSON output on stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let text = read_graph_text(&args.graph)?;
    let graph = parse_graph(&text, args.flat)?;
    let settings = settings_from(&cfg, &args);

    info!(
        top_level = graph.top_level().len(),
        edges = graph.edges.len(),
        visible_depth = settings.visible_depth,
        "graph loaded"
    );

    if args.dry_run {
        let prepared = prepare(&graph, &settings)?;
        print_dry_run(&prepared);
        return Ok(());
    }

    let engine = BuiltinEngine::new();
    let model = match cfg.layout_timeout() {
        Some(limit) => tokio::time::timeout(limit, render_model(&graph, &settings, &engine))
            .await
            .map_err(|_| LayoutError::Timeout(limit))??,
        None => render_model(&graph, &settings, &engine).await?,
    };

    println!("{}", model_to_json(&model, args.pretty)?);
    Ok(())
}

/// Explicit path, else `Dagview.toml` if present, else built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = path {
        return load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display()));
    }

    let default = default_config_path();
    if default.exists() {
        debug!(path = %default.display(), "using default config file");
        return load_and_validate(&default)
            .with_context(|| format!("loading config {}", default.display()));
    }

    debug!("no config file; using built-in defaults");
    Ok(ConfigFile::default())
}

/// Parse a nested raw graph, or a flat job list when `flat` is set.
pub fn parse_graph(text: &str, flat: bool) -> crate::errors::Result<RawGraph> {
    if flat {
        build_hierarchy(FlatGraph::from_json(text)?)
    } else {
        RawGraph::from_json(text)
    }
}

/// Config settings with the CLI flags layered on top.
pub fn settings_from(cfg: &ConfigFile, args: &CliArgs) -> ViewSettings {
    let mut settings = cfg.view_settings();
    if let Some(depth) = args.visible_depth {
        settings.visible_depth = depth;
    }
    if let Some(direction) = args.direction {
        settings.layout.direction = direction;
    }
    if let Some(algorithm) = args.algorithm {
        settings.layout.algorithm = algorithm;
    }
    for group in &args.collapse {
        settings.overrides.set(group.clone(), GroupOverride::Collapsed);
    }
    settings
}

pub fn model_to_json(model: &VisualModel, pretty: bool) -> crate::errors::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(model)?
    } else {
        serde_json::to_string(model)?
    };
    Ok(json)
}

fn read_graph_text(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading graph from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("reading graph {source}"))
}

/// Print hidden children per parent and the corrected edge list.
fn print_dry_run(prepared: &PreparedLayout) {
    println!("dagview dry-run");
    println!("  visible nodes: {}", prepared.pruned.visible_ids.len());
    println!("  dangling edges dropped: {}", prepared.pruned.dangling_edges);
    println!();

    println!("hidden ({}):", prepared.visibility.hidden_count());
    for (parent, children) in prepared.visibility.entries() {
        let children: Vec<&str> = children.iter().map(String::as_str).collect();
        println!("  - {parent}: {}", children.join(", "));
    }
    println!();

    println!("edges ({}):", prepared.pruned.edges.len());
    for edge in &prepared.pruned.edges {
        println!("  - {} -> {}", edge.source, edge.target);
    }
}
