//! Dependency and dependent closures.

use std::collections::BTreeSet;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use super::Graph;
use crate::error::GraphError;

impl Graph {
    /// The part of the graph needed to build `roots`: the roots and every
    /// vertex reachable from them along requirement edges.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if any root is not a vertex.
    #[instrument(skip_all)]
    pub fn subgraph_with_roots<I>(&self, roots: I) -> Result<Self, GraphError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.closure(roots, Direction::Outgoing)
    }

    /// The part of the graph affected by rebuilding `leaves`: the leaves and
    /// every vertex that transitively requires one of them. Edge direction
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if any leaf is not a vertex.
    #[instrument(skip_all)]
    pub fn subgraph_with_leaves<I>(&self, leaves: I) -> Result<Self, GraphError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.closure(leaves, Direction::Incoming)
    }

    fn closure<I>(&self, start: I, direction: Direction) -> Result<Self, GraphError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        // Reject unknown names before walking anything.
        let mut stack: Vec<NodeIndex> = start
            .into_iter()
            .map(|name| self.index(name.as_ref()))
            .collect::<Result<_, _>>()?;

        let mut included: BTreeSet<NodeIndex> = BTreeSet::new();
        while let Some(idx) = stack.pop() {
            if !included.insert(idx) {
                continue;
            }
            stack.extend(
                self.dag
                    .neighbors_directed(idx, direction)
                    .filter(|next| !included.contains(next)),
            );
        }

        let sub = self.induced(&included);
        debug!(
            nodes = sub.node_count(),
            edges = sub.edge_count(),
            "extracted subgraph"
        );
        Ok(sub)
    }

    /// Copy of the vertices in `included`, every edge among them, their
    /// registrations and the bootstrap warnings they raised.
    fn induced(&self, included: &BTreeSet<NodeIndex>) -> Self {
        let mut sub = Self::default();

        let mut names: Vec<&str> = included.iter().map(|&idx| self.name(idx)).collect();
        names.sort_unstable();
        for name in names {
            sub.add_vertex(name);
            if let Some(registration) = self.registrations.get(name) {
                sub.registrations.insert(name.to_string(), registration.clone());
            }
        }

        for edge in self.dag.edge_references() {
            if included.contains(&edge.source()) && included.contains(&edge.target()) {
                sub.add_edge(self.name(edge.source()), self.name(edge.target()));
            }
        }

        let warnings = self
            .warnings
            .iter()
            .filter(|w| sub.contains(&w.package))
            .cloned()
            .collect();
        sub.warnings = warnings;
        sub
    }
}
