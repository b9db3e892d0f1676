//! `pkgdag fetches`: remote sources a downloader would need to cache.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use pkgdag_core::config::ProjectConfig;
use pkgdag_core::graph::Registration;
use pkgdag_core::{Graph, GraphError, PackageConfig};
use serde::Serialize;
use tracing::warn;

use super::common::{self, GraphArgs};
use crate::output::{OutputMode, pretty_kv, render_mode};

/// Arguments for `pkgdag fetches`.
#[derive(Args, Debug)]
pub struct FetchesArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Only list sources of these packages.
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FetchRow {
    package: String,
    uri: String,
    /// `sha256:<hex>` or `sha512:<hex>`, the name a cache stores it under.
    cache_key: Option<String>,
    expected_sha256: Option<String>,
    expected_sha512: Option<String>,
}

/// List every `fetch` source with its checksum.
///
/// # Errors
///
/// Returns an error if the graph cannot be built or a named package is
/// unknown.
pub fn run_fetches(args: &FetchesArgs, project: &ProjectConfig, output: OutputMode) -> Result<()> {
    let graph = common::load_graph(&args.graph, project)?;
    let rows = fetch_rows(&graph, &args.packages)?;

    render_mode(
        output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}\t{}", row.uri, row.cache_key.as_deref().unwrap_or("-"))?;
            }
            Ok(())
        },
        |rows, w| {
            for row in rows {
                pretty_kv(w, "package", &row.package)?;
                pretty_kv(w, "uri", &row.uri)?;
                pretty_kv(w, "checksum", row.cache_key.as_deref().unwrap_or("(none)"))?;
                writeln!(w)?;
            }
            Ok(())
        },
    )
}

fn fetch_rows(graph: &Graph, only: &[String]) -> Result<Vec<FetchRow>> {
    let names: Vec<String> = if only.is_empty() {
        graph
            .nodes()
            .into_iter()
            .filter(|n| matches!(graph.registration(n), Some(Registration::Package(_))))
            .collect()
    } else {
        only.to_vec()
    };

    // Subpackages and aliases share their origin's sources; list each
    // origin once, under its own name.
    let mut origins: BTreeMap<&str, &PackageConfig> = BTreeMap::new();
    for name in &names {
        let config = graph
            .config(name)
            .ok_or_else(|| GraphError::NotFound { name: name.clone() })?;
        origins.insert(config.name(), config);
    }

    let mut rows = Vec::new();
    for (name, config) in origins {
        for fetch in config.fetch_uris() {
            let cache_key = fetch
                .expected_sha256
                .as_ref()
                .map(|h| format!("sha256:{h}"))
                .or_else(|| fetch.expected_sha512.as_ref().map(|h| format!("sha512:{h}")));
            if cache_key.is_none() {
                warn!(package = name, uri = %fetch.uri, "fetch has no expected checksum");
            }
            rows.push(FetchRow {
                package: name.to_string(),
                uri: fetch.uri,
                cache_key,
                expected_sha256: fetch.expected_sha256,
                expected_sha512: fetch.expected_sha512,
            });
        }
    }
    Ok(rows)
}
