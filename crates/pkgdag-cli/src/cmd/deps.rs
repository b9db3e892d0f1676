//! `pkgdag deps`: direct dependencies or dependents of one package.


use anyhow::Result;
use clap::Args;
use pkgdag_core::config::ProjectConfig;
use serde::Serialize;

use super::common::{self, GraphArgs};
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `pkgdag deps`.
#[derive(Args, Debug)]
pub struct DepsArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Package to inspect.
    pub package: String,

    /// List packages that require PACKAGE instead of what it requires.
    #[arg(short = 'D', long)]
    pub show_dependents: bool,
}

#[derive(Debug, Serialize)]
struct DepsReport {
    package: String,
    direction: &'static str,
    packages: Vec<String>,
}

/// Print direct neighbours of one package.
///
/// # Errors
///
/// Returns an error if the graph cannot be built or the package is unknown.
pub fn run_deps(args: &DepsArgs, project: &ProjectConfig, output: OutputMode) -> Result<()> {
    let graph = common::load_graph(&args.graph, project)?;

    let (direction, packages) = if args.show_dependents {
        ("dependents", graph.dependents_of(&args.package)?)
    } else {
        ("dependencies", graph.dependencies_of(&args.package)?)
    };
    let report = DepsReport {
        package: args.package.clone(),
        direction,
        packages,
    };

    render_mode(
        output,
        &report,
        |r, w| {
            for p in &r.packages {
                writeln!(w, "{p}")?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("{} of {}", capitalize(r.direction), r.package))?;
            if r.packages.is_empty() {
                writeln!(w, "(none)")?;
            }
            for p in &r.packages {
                writeln!(w, "  {p}")?;
            }
            Ok(())
        },
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
