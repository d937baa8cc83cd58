use gantt_tool::graph::DependencyGraph;

fn graph(names: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new(names.iter().copied());
    for (dep, item) in edges {
        assert!(graph.add_dependency(dep, item));
    }
    graph
}

#[test]
fn independents_have_no_edges() {
    let g = graph(&["a", "b", "c", "d"], &[("a", "b")]);
    assert_eq!(g.independents(), vec!["c", "d"]);
    assert!(!g.is_cyclic());
}

#[test]
fn chains_list_dependencies_before_dependents() {
    // a -> b -> d, c -> d, a -> e
    let g = graph(
        &["a", "b", "c", "d", "e"],
        &[("a", "b"), ("b", "d"), ("c", "d"), ("a", "e")],
    );
    let chains = g.resolution_chains();
    assert_eq!(chains, vec![vec!["a", "b", "c", "d"], vec!["a", "e"]]);
}

#[test]
fn unknown_names_are_not_linked() {
    let mut g = DependencyGraph::new(["a"]);
    assert!(!g.add_dependency("ghost", "a"));
    assert!(g.contains("a"));
    assert!(!g.contains("ghost"));
}

#[test]
fn cycle_members_are_reported_in_insertion_order() {
    let g = graph(
        &["x", "b", "a", "free"],
        &[("a", "b"), ("b", "a"), ("free", "x")],
    );
    assert!(g.is_cyclic());
    assert_eq!(g.cycle_members(), vec!["b", "a"]);

    let acyclic = graph(&["a", "b"], &[("a", "b")]);
    assert!(acyclic.cycle_members().is_empty());
}

#[test]
fn self_reference_is_a_cycle() {
    let g = graph(&["a"], &[("a", "a")]);
    assert!(g.is_cyclic());
    assert_eq!(g.cycle_members(), vec!["a"]);
}
