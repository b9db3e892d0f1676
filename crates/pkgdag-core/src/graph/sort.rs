//! Deterministic topological ordering.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use tracing::instrument;

use super::Graph;
use crate::error::GraphError;

impl Graph {
    /// Every vertex exactly once, each package before its requirements.
    ///
    /// For every edge `src → dst`, `src` comes before `dst`. Among vertices
    /// that are ready at the same time the smallest name goes first, so
    /// the result is identical across runs.
    ///
    /// # Errors
    ///
    /// [`GraphError::Cycle`] with the vertices left unsorted. A graph built
    /// by [`super::GraphBuilder`] never has one.
    #[instrument(skip(self), fields(nodes = self.node_count()))]
    pub fn sorted(&self) -> Result<Vec<String>, GraphError> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .dag
            .node_indices()
            .map(|idx| {
                let degree = self
                    .dag
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, degree)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<(&str, NodeIndex)>> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&idx, _)| Reverse((self.name(idx), idx)))
            .collect();

        let mut order = Vec::with_capacity(self.node_count());
        while let Some(Reverse((name, idx))) = ready.pop() {
            order.push(name.to_string());
            for next in self.dag.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse((self.name(next), next)));
                    }
                }
            }
        }

        if order.len() < self.node_count() {
            let mut remaining: Vec<String> = in_degree
                .into_iter()
                .filter(|&(_, degree)| degree > 0)
                .map(|(idx, _)| self.name(idx).to_string())
                .collect();
            remaining.sort_unstable();
            return Err(GraphError::Cycle { remaining });
        }

        Ok(order)
    }

    /// The reverse of [`Graph::sorted`]: requirements first, so the list
    /// can be built front to back.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::sorted`].
    pub fn build_order(&self) -> Result<Vec<String>, GraphError> {
        let mut order = self.sorted()?;
        order.reverse();
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> Graph {
        let mut g = Graph::default();
        for (a, b) in edges {
            g.add_edge(a, b);
        }
        g
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).expect("name present")
    }

    #[test]
    fn dependents_come_before_requirements() {
        let g = graph(&[("app", "lib"), ("lib", "libc"), ("app", "libc")]);
        let order = g.sorted().expect("acyclic");
        assert_eq!(order, vec!["app", "lib", "libc"]);
    }

    #[test]
    fn ties_break_by_name() {
        let g = graph(&[("zeta", "base"), ("alpha", "base"), ("mid", "base")]);
        assert_eq!(
            g.sorted().expect("acyclic"),
            vec!["alpha", "mid", "zeta", "base"]
        );
    }

    #[test]
    fn every_edge_respects_order() {
        let g = graph(&[
            ("a", "c"),
            ("b", "c"),
            ("c", "d"),
            ("e", "d"),
            ("a", "e"),
            ("f", "a"),
        ]);
        let order = g.sorted().expect("acyclic");
        assert_eq!(order.len(), g.node_count());
        for (src, dst) in g.edges() {
            assert!(position(&order, &src) < position(&order, &dst), "{src} -> {dst}");
        }
    }

    #[test]
    fn build_order_is_reverse() {
        let g = graph(&[("app", "lib"), ("lib", "libc")]);
        let mut sorted = g.sorted().expect("acyclic");
        sorted.reverse();
        assert_eq!(g.build_order().expect("acyclic"), sorted);
    }

    #[test]
    fn isolated_vertices_are_included() {
        let mut g = graph(&[("a", "b")]);
        g.add_vertex("lonely");
        assert_eq!(g.sorted().expect("acyclic"), vec!["a", "b", "lonely"]);
    }

    #[test]
    fn cycle_is_reported_with_remaining_vertices() {
        let g = graph(&[("x", "a"), ("a", "b"), ("b", "a")]);
        let err = g.sorted().expect_err("cyclic");
        assert!(matches!(err, GraphError::Cycle { ref remaining } if remaining == &["a", "b"]));
    }

    #[test]
    fn empty_graph_sorts_to_nothing() {
        assert!(Graph::default().sorted().expect("empty").is_empty());
    }
}
