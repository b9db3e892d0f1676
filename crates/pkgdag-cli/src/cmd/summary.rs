//! `pkgdag summary`: size, roots, bootstrap warnings and content hash.


use anyhow::Result;
use clap::Args;
use pkgdag_core::config::ProjectConfig;
use pkgdag_core::graph::Registration;
use pkgdag_core::{BootstrapWarning, Graph};
use serde::Serialize;

use super::common::{self, GraphArgs};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `pkgdag summary`.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub graph: GraphArgs,
}

#[derive(Debug, Serialize)]
struct Summary {
    packages: usize,
    subpackages: usize,
    aliases: usize,
    external: usize,
    nodes: usize,
    edges: usize,
    roots: Vec<String>,
    bootstrap: Vec<BootstrapWarning>,
    content_hash: String,
}

impl Summary {
    fn of(graph: &Graph) -> Self {
        let (mut packages, mut subpackages, mut aliases, mut external) = (0, 0, 0, 0);
        for name in graph.nodes() {
            match graph.registration(&name) {
                Some(Registration::Package(_)) => packages += 1,
                Some(Registration::Subpackage { .. }) => subpackages += 1,
                Some(Registration::Alias { .. }) => aliases += 1,
                None => external += 1,
            }
        }
        Self {
            packages,
            subpackages,
            aliases,
            external,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            roots: graph.roots(),
            bootstrap: graph.bootstrap_warnings().to_vec(),
            content_hash: graph.content_hash(),
        }
    }
}

/// Print an overview of the whole graph.
///
/// # Errors
///
/// Returns an error if the graph cannot be built.
pub fn run_summary(args: &SummaryArgs, project: &ProjectConfig, output: OutputMode) -> Result<()> {
    let graph = common::load_graph(&args.graph, project)?;
    let summary = Summary::of(&graph);

    render_mode(
        output,
        &summary,
        |s, w| {
            writeln!(w, "nodes\t{}", s.nodes)?;
            writeln!(w, "edges\t{}", s.edges)?;
            writeln!(w, "packages\t{}", s.packages)?;
            writeln!(w, "subpackages\t{}", s.subpackages)?;
            writeln!(w, "aliases\t{}", s.aliases)?;
            writeln!(w, "external\t{}", s.external)?;
            writeln!(w, "roots\t{}", s.roots.len())?;
            writeln!(w, "bootstrap\t{}", s.bootstrap.len())?;
            writeln!(w, "hash\t{}", s.content_hash)?;
            Ok(())
        },
        |s, w| {
            pretty_section(w, "Package graph")?;
            pretty_kv(w, "nodes", s.nodes.to_string())?;
            pretty_kv(w, "edges", s.edges.to_string())?;
            pretty_kv(w, "packages", s.packages.to_string())?;
            pretty_kv(w, "subpackages", s.subpackages.to_string())?;
            pretty_kv(w, "aliases", s.aliases.to_string())?;
            pretty_kv(w, "external", s.external.to_string())?;
            pretty_kv(w, "roots", s.roots.len().to_string())?;
            pretty_kv(w, "hash", &s.content_hash)?;
            if !s.bootstrap.is_empty() {
                writeln!(w)?;
                pretty_section(w, "Bootstrap required")?;
                for warning in &s.bootstrap {
                    writeln!(w, "  {}", warning.cycle_path.join(" -> "))?;
                }
            }
            Ok(())
        },
    )
}
