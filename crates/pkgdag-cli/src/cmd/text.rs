//! `pkgdag text`: one build target per package, in dependency order.


use anyhow::Result;
use clap::Args;
use pkgdag_core::config::ProjectConfig;
use pkgdag_core::graph::Registration;
use pkgdag_core::target::normalize_arch;
use pkgdag_core::{Graph, GraphError};
use serde::Serialize;
use tracing::{debug, warn};

use super::common::{self, GraphArgs};
use crate::output::{OutputMode, render_mode};

/// Arguments for `pkgdag text`.
#[derive(Args, Debug)]
pub struct TextArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Only these packages and what they need (or, with -D, what needs them).
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,

    /// Architecture to build for (amd64 and arm64 are accepted).
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Show packages that depend on these packages, instead of these
    /// packages' dependencies.
    #[arg(short = 'D', long)]
    pub show_dependents: bool,

    /// Print requirements first instead of dependents first.
    #[arg(long)]
    pub build_order: bool,

    /// Skip packages no config builds instead of failing.
    #[arg(long)]
    pub allow_external: bool,
}

#[derive(Debug, Serialize)]
struct TargetRow {
    package: String,
    /// `package` or `subpackage`.
    kind: &'static str,
    target: String,
}

/// Print the artifact target of every package in the selected graph.
///
/// # Errors
///
/// Returns an error if the graph cannot be built, a named package is
/// unknown, or a package has no config and `--allow-external` is unset.
pub fn run_text(args: &TextArgs, project: &ProjectConfig, output: OutputMode) -> Result<()> {
    let graph = common::load_graph(&args.graph, project)?;
    let graph = common::select(graph, &args.packages, args.show_dependents)?;

    let arch = normalize_arch(args.arch.as_deref().unwrap_or(&project.target.arch));
    let order = if args.build_order {
        graph.build_order()?
    } else {
        graph.sorted()?
    };
    let rows = targets(&graph, &order, arch, args.allow_external)?;

    render_mode(
        output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}", row.target)?;
            }
            Ok(())
        },
        |rows, w| {
            let width = rows.iter().map(|r| r.package.len()).max().unwrap_or(0);
            for row in rows {
                writeln!(w, "{:<width$}  {}", row.package, row.target)?;
            }
            Ok(())
        },
    )
}

fn targets(graph: &Graph, order: &[String], arch: &str, allow_external: bool) -> Result<Vec<TargetRow>> {
    let mut rows = Vec::with_capacity(order.len());
    for name in order {
        match graph.registration(name) {
            Some(Registration::Alias { provider, .. }) => {
                debug!(alias = %name, %provider, "skipping provides-alias");
            }
            Some(registration) => rows.push(TargetRow {
                package: name.clone(),
                kind: registration.kind(),
                target: graph.make_target(name, arch)?,
            }),
            None if allow_external => {
                warn!(package = %name, "no config builds this package; skipping");
            }
            None => {
                return Err(anyhow::Error::new(GraphError::NotFound { name: name.clone() })
                    .context(format!(
                        "no config builds {name:?}; pass --allow-external to skip it"
                    )));
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgdag_core::source::MemorySource;

    fn graph() -> Graph {
        let source = MemorySource::new()
            .with(
                "a.yaml",
                "package: { name: a, version: '1', epoch: 0, dependencies: { provides: [virt] } }\nenvironment: { contents: { packages: [ext] } }\n",
            )
            .with(
                "b.yaml",
                "package: { name: b, version: '2', epoch: 1 }\nenvironment: { contents: { packages: [virt] } }\n",
            );
        Graph::build(&source).expect("builds")
    }

    #[test]
    fn aliases_are_skipped_and_externals_fail() {
        let g = graph();
        let order = g.sorted().expect("acyclic");
        let err = targets(&g, &order, "x86_64", false).expect_err("ext has no config");
        assert!(format!("{err:#}").contains("--allow-external"), "{err:#}");
    }

    #[test]
    fn allow_external_skips_unbuilt_packages() {
        let g = graph();
        let order = g.sorted().expect("acyclic");
        let rows = targets(&g, &order, "x86_64", true).expect("externals skipped");
        let names: Vec<&str> = rows.iter().map(|r| r.package.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(rows.iter().all(|r| r.kind == "package"));
        assert_eq!(rows[0].target, "packages/x86_64/b-2-r1.apk");
    }
}
