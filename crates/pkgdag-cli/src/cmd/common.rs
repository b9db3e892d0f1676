//! Graph loading shared by every command that reads package configs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pkgdag_core::config::ProjectConfig;
use pkgdag_core::pipeline::PipelineCatalog;
use pkgdag_core::source::DirSource;
use pkgdag_core::{Graph, GraphBuilder};
use tracing::{debug, warn};

/// Where to find package configs. Unset flags fall back to `pkgdag.toml`.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Directory to search for package configs.
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Directory holding reusable pipeline definitions.
    #[arg(long, value_name = "DIR")]
    pub pipeline_dir: Option<PathBuf>,

    /// Only read config files whose name ends with this suffix.
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,
}

/// Build the full graph described by `args` and the project settings.
///
/// # Errors
///
/// Returns an error if the pipeline catalog or any package config cannot
/// be loaded, or the graph cannot be built.
pub fn load_graph(args: &GraphArgs, project: &ProjectConfig) -> Result<Graph> {
    let dir = args.dir.as_ref().unwrap_or(&project.graph.dir);
    let suffix = args.suffix.as_deref().unwrap_or(&project.graph.suffix);

    let mut builder = GraphBuilder::new();
    if let Some(pipeline_dir) = args
        .pipeline_dir
        .as_ref()
        .or(project.graph.pipeline_dir.as_ref())
    {
        let source = DirSource::new(pipeline_dir)
            .with_suffix(suffix)
            .recursive();
        let catalog = PipelineCatalog::load(&source, suffix)
            .with_context(|| format!("Failed to load pipelines from {}", pipeline_dir.display()))?;
        debug!(pipelines = catalog.len(), "using pipeline catalog");
        builder = builder.with_catalog(catalog);
    }

    let source = DirSource::new(dir).with_suffix(suffix);
    debug!(dir = %source.root().display(), suffix = source.suffix(), "loading package configs");
    builder
        .build(&source)
        .with_context(|| format!("Failed to build package graph from {}", source.root().display()))
}

/// Narrow `graph` to the dependency closure of `packages`, or with
/// `dependents` to their dependent closure. No packages means the whole
/// graph.
///
/// # Errors
///
/// Returns an error if any package is not in the graph.
pub fn select(graph: Graph, packages: &[String], dependents: bool) -> Result<Graph> {
    if packages.is_empty() {
        if dependents {
            warn!("--show-dependents has no effect without one or more package names");
        }
        return Ok(graph);
    }

    let sub = if dependents {
        graph.subgraph_with_leaves(packages)?
    } else {
        graph.subgraph_with_roots(packages)?
    };
    Ok(sub)
}
