//! Cycle checks for requirement edges.
//!
//! Self-hosting toolchains routinely require themselves: a compiler needs a
//! compiler, a shell's build scripts need a shell. Such edges cannot all be
//! kept, so the builder checks each requirement before inserting it and
//! drops the ones that would close a loop. The dropped requirement has to
//! be supplied by bootstrapping.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

// ---------------------------------------------------------------------------
// BootstrapWarning
// ---------------------------------------------------------------------------

/// A requirement edge that was not added because it would close a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapWarning {
    /// The package declaring the requirement.
    pub package: String,
    /// The requirement that has to be bootstrapped.
    pub requirement: String,
    /// The loop the edge would have closed, starting and ending at
    /// `package`: `package -> requirement -> ... -> package`.
    pub cycle_path: Vec<String>,
}

impl BootstrapWarning {
    /// `true` if the package requires itself.
    #[must_use]
    pub fn is_self_requirement(&self) -> bool {
        self.package == self.requirement
    }
}

impl fmt::Display for BootstrapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "package {:?} dependency on {:?} would introduce a cycle ({}), so {:?} needs to be provided via bootstrapping",
            self.package,
            self.requirement,
            self.cycle_path.join(" -> "),
            self.requirement
        )
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Check whether adding `from → to` would close a cycle.
///
/// Runs a breadth-first search from `to` looking for `from`. On success the
/// returned path is `from, to, ..., from`; a self edge gives `[from, from]`.
/// An edge that already exists creates nothing new and returns `None`.
#[must_use]
pub fn would_create_cycle(
    graph: &DiGraph<String, ()>,
    from: NodeIndex,
    to: NodeIndex,
) -> Option<Vec<String>> {
    if from == to {
        let name = label(graph, from);
        return Some(vec![name.clone(), name]);
    }
    if graph.contains_edge(from, to) {
        return None;
    }

    let mut queue = VecDeque::from([to]);
    let mut seen = HashSet::from([to]);
    let mut came_from: HashMap<NodeIndex, NodeIndex> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if current == from {
            break;
        }
        for next in graph.neighbors(current) {
            if seen.insert(next) {
                came_from.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    if !seen.contains(&from) {
        return None;
    }

    // Walk back from `from` to `to`, then put the new edge in front.
    let mut path = vec![from];
    let mut cursor = from;
    while cursor != to {
        let Some(&prev) = came_from.get(&cursor) else {
            break;
        };
        path.push(prev);
        cursor = prev;
    }
    path.push(from);
    path.reverse();

    Some(path.into_iter().map(|idx| label(graph, idx)).collect())
}

/// Strongly connected components that form cycles, including self-loops.
///
/// Each component's vertices are returned in ascending name order and the
/// components themselves are sorted.
#[must_use]
pub fn cyclic_components(graph: &DiGraph<String, ()>) -> Vec<Vec<NodeIndex>> {
    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        })
        .map(|mut component| {
            component.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
            component
        })
        .collect();
    components.sort_by(|a, b| {
        let names = |c: &Vec<NodeIndex>| c.iter().map(|&i| graph[i].clone()).collect::<Vec<_>>();
        names(a).cmp(&names(b))
    });
    components
}

fn label(graph: &DiGraph<String, ()>, idx: NodeIndex) -> String {
    graph
        .node_weight(idx)
        .cloned()
        .unwrap_or_else(|| format!("#{}", idx.index()))
}
