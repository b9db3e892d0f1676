//! Graph construction from package documents.
//!
//! # Overview
//!
//! Documents are read in lexical path order and parsed up front; any parse
//! failure or duplicate package name aborts the build before a single
//! vertex exists. The graph is then wired in a fixed order:
//!
//! 1. Every package name, then every subpackage name, is registered as
//!    authoritative. A subpackage may not reuse a name already taken.
//! 2. Provided names that nothing declares become aliases of the first
//!    provider in package-name order.
//! 3. Structural edges: `subpackage → origin` and `alias → provider`.
//!    Origins have no outgoing edges yet, so these never close a loop.
//! 4. Requirement edges, packages in ascending name order and each
//!    package's requirements in ascending name order. An edge that would
//!    close a cycle is dropped and recorded as a [`BootstrapWarning`].
//! 5. [`Graph::validate`].
//!
//! Because step 4 follows package names rather than file names, which edge
//! gets dropped from a cycle does not depend on how files are laid out.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::cycles::{BootstrapWarning, would_create_cycle};
use super::{Graph, Registration};
use crate::error::GraphError;
use crate::manifest::PackageConfig;
use crate::pipeline::PipelineCatalog;
use crate::source::DocumentSource;

/// A parsed document and where it came from.
#[derive(Debug)]
struct Loaded {
    path: PathBuf,
    config: Arc<PackageConfig>,
}

/// Builds a [`Graph`] from a [`DocumentSource`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    catalog: PipelineCatalog,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `uses:` steps through `catalog`.
    #[must_use]
    pub fn with_catalog(mut self, catalog: PipelineCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Load every document from `source` and wire the graph.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Io`] if the source cannot be enumerated or read.
    /// - [`GraphError::Load`] if a document does not parse.
    /// - [`GraphError::DuplicateName`] if a name is declared twice.
    /// - [`GraphError::Validation`] if the finished graph is inconsistent.
    #[instrument(skip_all)]
    pub fn build(&self, source: &impl DocumentSource) -> Result<Graph, GraphError> {
        let packages = load_documents(source)?;

        let mut graph = Graph::default();
        let owners = register_names(&mut graph, &packages)?;
        let aliases = register_aliases(&mut graph, &packages, &owners);

        for loaded in packages.values() {
            let origin = loaded.config.name();
            for sub in loaded.config.subpackage_names() {
                graph.add_edge(sub, origin);
            }
        }
        for (alias, provider) in &aliases {
            graph.add_edge(alias, provider);
        }

        for (name, loaded) in &packages {
            self.add_requirements(&mut graph, name, &loaded.config);
        }

        graph.validate()?;

        info!(
            packages = packages.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            bootstrap = graph.warnings.len(),
            "built package graph"
        );
        Ok(graph)
    }

    fn add_requirements(&self, graph: &mut Graph, name: &str, config: &PackageConfig) {
        let from = graph.add_vertex(name);
        for requirement in config.requirements(&self.catalog) {
            let to = graph.add_vertex(&requirement);

            if let Some(cycle_path) = would_create_cycle(&graph.dag, from, to) {
                let warning = BootstrapWarning {
                    package: name.to_string(),
                    requirement,
                    cycle_path,
                };
                warn!(
                    package = %warning.package,
                    requirement = %warning.requirement,
                    cycle = %warning.cycle_path.join(" -> "),
                    "{warning}"
                );
                graph.warnings.push(warning);
                continue;
            }

            graph.add_edge_between(from, to);
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Parse every document, keyed by package name.
fn load_documents(source: &impl DocumentSource) -> Result<BTreeMap<String, Loaded>, GraphError> {
    let mut packages: BTreeMap<String, Loaded> = BTreeMap::new();

    for doc in source.documents()? {
        let config = PackageConfig::from_slice(&doc.bytes).map_err(|source| GraphError::Load {
            path: doc.path.clone(),
            source,
        })?;
        let name = config.name().to_string();

        if let Some(first) = packages.get(&name) {
            return Err(GraphError::DuplicateName {
                name,
                first: first.path.display().to_string(),
                second: doc.path.display().to_string(),
            });
        }
        packages.insert(
            name,
            Loaded {
                path: doc.path,
                config: Arc::new(config),
            },
        );
    }

    debug!(count = packages.len(), "parsed package documents");
    Ok(packages)
}

/// Register packages and subpackages. Returns name -> declaring path.
fn register_names(
    graph: &mut Graph,
    packages: &BTreeMap<String, Loaded>,
) -> Result<HashMap<String, String>, GraphError> {
    let mut owners: HashMap<String, String> = HashMap::new();

    for (name, loaded) in packages {
        graph.register(name, Registration::Package(Arc::clone(&loaded.config)));
        owners.insert(name.clone(), loaded.path.display().to_string());
    }

    for loaded in packages.values() {
        let path = loaded.path.display().to_string();
        for sub in loaded.config.subpackage_names() {
            if let Some(first) = owners.get(sub) {
                return Err(GraphError::DuplicateName {
                    name: sub.to_string(),
                    first: first.clone(),
                    second: path,
                });
            }
            graph.register(
                sub,
                Registration::Subpackage {
                    origin: Arc::clone(&loaded.config),
                },
            );
            owners.insert(sub.to_string(), path.clone());
        }
    }

    Ok(owners)
}

/// Register provided names no document declares. Returns alias -> provider.
fn register_aliases(
    graph: &mut Graph,
    packages: &BTreeMap<String, Loaded>,
    owners: &HashMap<String, String>,
) -> BTreeMap<String, String> {
    let mut aliases: BTreeMap<String, String> = BTreeMap::new();

    for (provider, loaded) in packages {
        for alias in loaded.config.provided_names() {
            if owners.contains_key(&alias) {
                debug!(%alias, %provider, "provided name shadowed by a declared package");
                continue;
            }
            if let Some(first) = aliases.get(&alias) {
                debug!(%alias, %provider, first = %first, "provided name already claimed");
                continue;
            }
            graph.register(
                &alias,
                Registration::Alias {
                    provider: provider.clone(),
                    config: Arc::clone(&loaded.config),
                },
            );
            aliases.insert(alias, provider.clone());
        }
    }

    aliases
}
