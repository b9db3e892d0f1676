//! `pkgdag dot`: Graphviz DOT rendering of the package graph.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pkgdag_core::Graph;
use pkgdag_core::config::ProjectConfig;
use tracing::info;

use super::common::{self, GraphArgs};

/// Arguments for `pkgdag dot`.
#[derive(Args, Debug)]
pub struct DotArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Only these packages and what they need (or, with -D, what needs them).
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,

    /// Show packages that depend on these packages instead.
    #[arg(short = 'D', long)]
    pub show_dependents: bool,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Render the selected graph as DOT.
///
/// # Errors
///
/// Returns an error if the graph cannot be built or the output file cannot
/// be written.
pub fn run_dot(args: &DotArgs, project: &ProjectConfig) -> Result<()> {
    let graph = common::load_graph(&args.graph, project)?;
    let graph = common::select(graph, &args.packages, args.show_dependents)?;

    info!(nodes = graph.node_count(), edges = graph.edge_count(), "graph summary");
    let dot = render_dot(&graph);

    let Some(path) = &args.out else {
        print!("{dot}");
        return Ok(());
    };
    std::fs::write(path, dot).with_context(|| format!("Failed to write {}", path.display()))
}

/// Nodes then edges, each sorted, so output is stable across runs.
fn render_dot(graph: &Graph) -> String {
    let mut dot = String::from("digraph packages {\n");
    for node in graph.nodes() {
        let _ = writeln!(dot, "  {};", quote(&node));
    }
    for (src, dst) in graph.edges() {
        let _ = writeln!(dot, "  {} -> {};", quote(&src), quote(&dst));
    }
    dot.push_str("}\n");
    dot
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}
