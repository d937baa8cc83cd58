use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Directed graph over schedule item names; an edge `dep -> item` means the
/// item's plan is expressed relative to `dep`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub graph: DiGraph<String, ()>,
    pub name_to_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dag = Self::default();
        for name in names {
            let name = name.into();
            if dag.name_to_index.contains_key(&name) {
                continue;
            }
            let node_ix = dag.graph.add_node(name.clone());
            dag.name_to_index.insert(name, node_ix);
        }
        dag
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Add `dependency -> dependent`. Returns false when either name is unknown.
    pub fn add_dependency(&mut self, dependency: &str, dependent: &str) -> bool {
        match (
            self.name_to_index.get(dependency),
            self.name_to_index.get(dependent),
        ) {
            (Some(&u), Some(&v)) => {
                self.graph.update_edge(u, v, ());
                true
            }
            _ => false,
        }
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Names taking part in some cycle, in node order; empty for a DAG.
    pub fn cycle_members(&self) -> Vec<String> {
        let mut members: Vec<NodeIndex> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&ix| self.graph.contains_edge(ix, ix))
            })
            .flatten()
            .collect();
        members.sort();
        members
            .into_iter()
            .map(|ix| self.graph[ix].clone())
            .collect()
    }

    /// Nodes with no edges at all, in insertion order.
    pub fn independents(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|&ix| self.degree(ix, Direction::Incoming) == 0)
            .filter(|&ix| self.degree(ix, Direction::Outgoing) == 0)
            .map(|ix| self.graph[ix].clone())
            .collect()
    }

    /// Connected nodes nothing depends on, in insertion order.
    pub fn leaves(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&ix| self.degree(ix, Direction::Outgoing) == 0)
            .filter(|&ix| self.degree(ix, Direction::Incoming) > 0)
            .collect()
    }

    /// Walk backward from `leaf` through incoming edges and return the chain in
    /// root-to-leaf order: every name appears after all names it depends on.
    ///
    /// Iterative post-order walk; the graph must be acyclic.
    pub fn chain_to_root(&self, leaf: NodeIndex) -> Vec<String> {
        let mut chain = Vec::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut stack = vec![(leaf, false)];

        while let Some((node_ix, expanded)) = stack.pop() {
            if expanded {
                chain.push(self.graph[node_ix].clone());
                continue;
            }
            if !visited.insert(node_ix) {
                continue;
            }
            stack.push((node_ix, true));
            let mut parents: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(node_ix, Direction::Incoming)
                .collect();
            parents.sort();
            for parent in parents.into_iter().rev() {
                if !visited.contains(&parent) {
                    stack.push((parent, false));
                }
            }
        }
        chain
    }

    /// One chain per leaf; names shared by several chains repeat.
    pub fn resolution_chains(&self) -> Vec<Vec<String>> {
        self.leaves()
            .into_iter()
            .map(|leaf| self.chain_to_root(leaf))
            .collect()
    }

    fn degree(&self, node_ix: NodeIndex, direction: Direction) -> usize {
        self.graph.neighbors_directed(node_ix, direction).count()
    }
}
