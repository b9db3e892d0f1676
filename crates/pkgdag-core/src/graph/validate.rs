//! Post-build consistency checks.

use petgraph::visit::EdgeRef;

use super::Graph;
use super::cycles::cyclic_components;
use crate::error::GraphError;

impl Graph {
    /// Check that the name index and graph storage agree, that every
    /// registration names a vertex, and that no cycle exists.
    ///
    /// Every problem found is reported, not just the first.
    ///
    /// # Errors
    ///
    /// [`GraphError::Validation`] listing each problem.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut problems = Vec::new();

        let mut indexed: Vec<(&String, _)> = self.node_map.iter().collect();
        indexed.sort_unstable();
        for (name, &idx) in indexed {
            if self.dag.node_weight(idx) != Some(name) {
                problems.push(format!("vertex {name:?} is indexed but not stored"));
            }
        }
        if self.node_map.len() != self.dag.node_count() {
            problems.push(format!(
                "{} vertices stored but {} indexed",
                self.dag.node_count(),
                self.node_map.len()
            ));
        }

        let mut dangling = Vec::new();
        for edge in self.dag.edge_references() {
            let src = self.name(edge.source());
            let dst = self.name(edge.target());
            for end in [src, dst] {
                if !self.node_map.contains_key(end) {
                    dangling.push(format!("{src:?} -> {dst:?}: {end:?} not found"));
                }
            }
        }
        dangling.sort_unstable();
        problems.extend(dangling);

        let mut unregistered: Vec<&String> = self
            .registrations
            .keys()
            .filter(|name| !self.node_map.contains_key(*name))
            .collect();
        unregistered.sort_unstable();
        problems.extend(
            unregistered
                .into_iter()
                .map(|name| format!("registration for {name:?} has no vertex")),
        );

        for component in cyclic_components(&self.dag) {
            let mut pairs = Vec::new();
            for &idx in &component {
                for next in self.dag.neighbors(idx) {
                    if component.contains(&next) {
                        pairs.push(format!("{:?} -> {:?}", self.name(idx), self.name(next)));
                    }
                }
            }
            pairs.sort_unstable();
            problems.push(format!("cycle: {}", pairs.join(", ")));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(GraphError::Validation { problems })
        }
    }
}
