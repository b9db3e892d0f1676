use std::collections::BTreeSet;

use pkgdag_core::Graph;
use proptest::prelude::*;

#[path = "generators.rs"]
mod generators;
use generators::*;

fn build(packages: &[GenPackage]) -> Graph {
    Graph::build(&source_for(packages, "")).expect("generated packages always build")
}

/// Reachable set computed with the public adjacency queries only.
fn reachable(graph: &Graph, start: &str, forward: bool) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![start.to_string()];
    while let Some(name) = stack.pop() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let next = if forward {
            graph.dependencies_of(&name)
        } else {
            graph.dependents_of(&name)
        }
        .expect("vertex exists");
        stack.extend(next);
    }
    seen
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn built_graph_is_acyclic_and_sorts_every_vertex(packages in arb_packages(10)) {
        let graph = build(&packages);
        prop_assert!(graph.validate().is_ok());

        let order = graph.sorted().expect("acyclic");
        prop_assert_eq!(order.len(), graph.node_count());
        let unique: BTreeSet<&String> = order.iter().collect();
        prop_assert_eq!(unique.len(), order.len());

        let position = |name: &str| order.iter().position(|n| n == name);
        for (src, dst) in graph.edges() {
            prop_assert!(position(&src) < position(&dst), "{} -> {}", src, dst);
        }
    }

    #[test]
    fn builds_are_deterministic(packages in arb_packages(10)) {
        let a = build(&packages);
        let b = build(&packages);
        prop_assert_eq!(a.sorted().expect("acyclic"), b.sorted().expect("acyclic"));
        prop_assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn file_layout_does_not_change_the_graph(packages in arb_packages(10)) {
        let a = build(&packages);
        let b = Graph::build(&reversed_source_for(&packages)).expect("builds");
        prop_assert_eq!(a.content_hash(), b.content_hash());
        prop_assert_eq!(a.bootstrap_warnings(), b.bootstrap_warnings());
    }

    #[test]
    fn build_order_reverses_sorted(packages in arb_packages(10)) {
        let graph = build(&packages);
        let mut sorted = graph.sorted().expect("acyclic");
        sorted.reverse();
        prop_assert_eq!(graph.build_order().expect("acyclic"), sorted);
    }

    #[test]
    fn roots_subgraph_is_the_dependency_closure(
        packages in arb_packages(10),
        pick in any::<prop::sample::Index>(),
    ) {
        let graph = build(&packages);
        let nodes = graph.nodes();
        let root = pick.get(&nodes);

        let sub = graph.subgraph_with_roots([root]).expect("known root");
        let expected: Vec<String> = reachable(&graph, root, true).into_iter().collect();
        prop_assert_eq!(sub.nodes(), expected);

        // Every edge of the source among included vertices is kept.
        let included: BTreeSet<String> = sub.nodes().into_iter().collect();
        let expected_edges: Vec<(String, String)> = graph
            .edges()
            .into_iter()
            .filter(|(s, d)| included.contains(s) && included.contains(d))
            .collect();
        prop_assert_eq!(sub.edges(), expected_edges);
    }

    #[test]
    fn leaves_subgraph_is_the_dependent_closure(
        packages in arb_packages(10),
        pick in any::<prop::sample::Index>(),
    ) {
        let graph = build(&packages);
        let nodes = graph.nodes();
        let leaf = pick.get(&nodes);

        let sub = graph.subgraph_with_leaves([leaf]).expect("known leaf");
        let expected: Vec<String> = reachable(&graph, leaf, false).into_iter().collect();
        prop_assert_eq!(sub.nodes(), expected);
    }

    #[test]
    fn closures_are_dual(
        packages in arb_packages(8),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let graph = build(&packages);
        let nodes = graph.nodes();
        let (u, v) = (a.get(&nodes), b.get(&nodes));

        let forward = graph.subgraph_with_roots([u]).expect("known").contains(v);
        let backward = graph.subgraph_with_leaves([v]).expect("known").contains(u);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn every_registered_name_has_a_target(packages in arb_packages(10)) {
        let graph = build(&packages);
        for name in graph.nodes() {
            let target = graph.make_target(&name, "x86_64");
            prop_assert_eq!(target.is_ok(), graph.registration(&name).is_some());
        }
    }
}
