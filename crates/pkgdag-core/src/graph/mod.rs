//! Package dependency graph.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A requires B to be built first". Subpackages
//! point at their origin package and provides-aliases point at their
//! provider, so every name a build might ask for reaches the config that
//! produces it.
//!
//! ## Registrations
//!
//! Every vertex that some document accounts for carries a [`Registration`]:
//! the package's own config, the origin config of a subpackage, or the
//! provider of a virtual name. Vertices with no registration are external
//! requirements that no loaded document builds.
//!
//! A [`Graph`] owns all of its state. Two graphs never share anything
//! mutable, so separate graphs can be built and queried on separate
//! threads.

#![allow(clippy::module_name_repetitions)]

pub mod build;
pub mod cycles;
pub mod sort;
pub mod subgraph;
pub mod validate;

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::GraphError;
use crate::manifest::PackageConfig;
use crate::source::DocumentSource;
use crate::target::target_path;

pub use build::GraphBuilder;
pub use cycles::BootstrapWarning;

/// Which config accounts for a vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// An origin package declared by its own document.
    Package(Arc<PackageConfig>),
    /// A subpackage produced by the build of `origin`.
    Subpackage { origin: Arc<PackageConfig> },
    /// A virtual name from the provides list of `provider`.
    Alias {
        provider: String,
        config: Arc<PackageConfig>,
    },
}

impl Registration {
    /// The config whose build produces this name.
    #[must_use]
    pub fn config(&self) -> &PackageConfig {
        match self {
            Self::Package(config) | Self::Subpackage { origin: config } | Self::Alias { config, .. } => {
                config
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Package(_) => "package",
            Self::Subpackage { .. } => "subpackage",
            Self::Alias { .. } => "alias",
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A directed dependency graph keyed by package name.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    dag: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    registrations: HashMap<String, Registration>,
    warnings: Vec<BootstrapWarning>,
}

impl Graph {
    /// Build a graph from every document in `source` with no pipeline
    /// catalog. See [`GraphBuilder`] for the full set of options.
    ///
    /// # Errors
    ///
    /// Any [`GraphError`] raised during construction.
    pub fn build(source: &impl DocumentSource) -> Result<Self, GraphError> {
        GraphBuilder::new().build(source)
    }

    // -- mutation -----------------------------------------------------------

    /// Add a vertex named `name` if it does not exist yet.
    pub fn add_vertex(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            return idx;
        }
        let idx = self.dag.add_node(name.to_string());
        self.node_map.insert(name.to_string(), idx);
        idx
    }

    /// Add the edge `src → dst`, creating either vertex if needed.
    ///
    /// No cycle check is made; the builder does that before calling this.
    /// Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, src: &str, dst: &str) -> bool {
        let from = self.add_vertex(src);
        let to = self.add_vertex(dst);
        self.add_edge_between(from, to)
    }

    fn add_edge_between(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        if self.dag.contains_edge(from, to) {
            return false;
        }
        self.dag.add_edge(from, to, ());
        true
    }

    pub(crate) fn register(&mut self, name: &str, registration: Registration) {
        self.add_vertex(name);
        self.registrations.insert(name.to_string(), registration);
    }

    // -- queries ------------------------------------------------------------

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.dag.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.dag.edge_count()
    }

    /// Every vertex name, sorted.
    #[must_use]
    pub fn nodes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.node_map.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Every edge as `(src, dst)`, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<(String, String)> {
        let mut edges: Vec<(String, String)> = self
            .dag
            .edge_references()
            .map(|e| (self.name(e.source()).to_string(), self.name(e.target()).to_string()))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Direct requirements of `name`, sorted.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if `name` is not a vertex.
    pub fn dependencies_of(&self, name: &str) -> Result<Vec<String>, GraphError> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Direct dependents of `name` (vertices that require it), sorted.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if `name` is not a vertex.
    pub fn dependents_of(&self, name: &str) -> Result<Vec<String>, GraphError> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Result<Vec<String>, GraphError> {
        let idx = self.index(name)?;
        let mut names: Vec<String> = self
            .dag
            .neighbors_directed(idx, direction)
            .map(|n| self.name(n).to_string())
            .collect();
        names.sort_unstable();
        names.dedup();
        Ok(names)
    }

    /// Vertices nothing else depends on, sorted.
    #[must_use]
    pub fn roots(&self) -> Vec<String> {
        let mut roots: Vec<String> = self
            .dag
            .node_indices()
            .filter(|&idx| {
                self.dag
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.name(idx).to_string())
            .collect();
        roots.sort_unstable();
        roots
    }

    #[must_use]
    pub fn registration(&self, name: &str) -> Option<&Registration> {
        self.registrations.get(name)
    }

    /// The config that builds `name`. For a subpackage this is its origin's
    /// config; for a provides-alias, its provider's.
    #[must_use]
    pub fn config(&self, name: &str) -> Option<&PackageConfig> {
        self.registrations.get(name).map(Registration::config)
    }

    /// `true` only for names registered as subpackages.
    #[must_use]
    pub fn is_subpackage(&self, name: &str) -> bool {
        matches!(self.registrations.get(name), Some(Registration::Subpackage { .. }))
    }

    /// Requirement edges dropped to keep the graph acyclic, in the order
    /// they were encountered.
    #[must_use]
    pub fn bootstrap_warnings(&self) -> &[BootstrapWarning] {
        &self.warnings
    }

    /// Artifact path of the build that produces `name` for `arch`.
    ///
    /// Subpackages keep their own name with the origin's version and epoch.
    /// A provides-alias resolves to its provider's artifact, so its path
    /// carries the provider's name instead of the name asked for; the
    /// alias has no artifact of its own.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if no config accounts for `name`.
    pub fn make_target(&self, name: &str, arch: &str) -> Result<String, GraphError> {
        let registration = self
            .registrations
            .get(name)
            .ok_or_else(|| GraphError::not_found(name))?;

        let (artifact, config) = match registration {
            Registration::Package(config) | Registration::Subpackage { origin: config } => {
                (name, config)
            }
            Registration::Alias { provider, config } => (provider.as_str(), config),
        };
        Ok(target_path(
            artifact,
            &config.package.version,
            &config.package.epoch,
            arch,
        ))
    }

    /// BLAKE3 hash over the sorted vertex and edge lists.
    ///
    /// Two graphs with the same vertices and edges hash the same regardless
    /// of insertion order.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for name in self.nodes() {
            hasher.update(name.as_bytes());
            hasher.update(b"\x00");
        }
        hasher.update(b"\x01");
        for (src, dst) in self.edges() {
            hasher.update(src.as_bytes());
            hasher.update(b"\x00");
            hasher.update(dst.as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }

    // -- internal helpers ---------------------------------------------------

    fn index(&self, name: &str) -> Result<NodeIndex, GraphError> {
        self.node_map
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::not_found(name))
    }

    fn name(&self, idx: NodeIndex) -> &str {
        self.dag.node_weight(idx).map_or("", String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
