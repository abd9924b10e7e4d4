//! Project graph of workspace packages
//!
//! Nodes are packages, edges point from a dependency to its dependent
//! ("package-1 is depended on by package-2"). Cycles are valid and are kept
//! as-is; ordering treats each strongly connected component as one unit.
//! Uses petgraph for graph operations.

use crate::domain::{DependencyType, Package, Specifier};
use crate::error::ValidationError;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

/// A local dependency relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub dependency_type: DependencyType,
    pub specifier: Specifier,
}

/// Dependency graph of workspace packages
#[derive(Debug, Clone, Default)]
pub struct ProjectGraph {
    /// The underlying directed graph
    graph: DiGraph<Package, DependencyEdge>,

    /// Map from package name to node index
    node_map: HashMap<String, NodeIndex>,
}

impl ProjectGraph {
    /// Builds a graph from workspace packages.
    ///
    /// Dependency entries naming another workspace package become edges;
    /// everything else stays on the package as an external dependency.
    pub fn build(packages: Vec<Package>) -> Result<Self, ValidationError> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        // First pass: add all nodes
        for package in packages {
            if node_map.contains_key(&package.name) {
                return Err(ValidationError::DuplicatePackage { name: package.name });
            }
            let name = package.name.clone();
            let idx = graph.add_node(package);
            node_map.insert(name, idx);
        }

        // Second pass: add all edges
        let mut edges = Vec::new();
        for dependent in graph.node_indices() {
            for dep in &graph[dependent].dependencies {
                match node_map.get(&dep.name) {
                    Some(&dependency) if dependency != dependent => edges.push((
                        dependency,
                        dependent,
                        DependencyEdge {
                            dependency_type: dep.dependency_type,
                            specifier: dep.specifier.clone(),
                        },
                    )),
                    _ => {}
                }
            }
        }
        for (from, to, edge) in edges {
            graph.add_edge(from, to, edge);
        }

        Ok(Self { graph, node_map })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.node_map.get(name).map(|&idx| &self.graph[idx])
    }

    pub fn package_mut(&mut self, name: &str) -> Option<&mut Package> {
        let idx = *self.node_map.get(name)?;
        self.graph.node_weight_mut(idx)
    }

    /// All packages, in discovery order
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// All package names, in discovery order
    pub fn names(&self) -> Vec<String> {
        self.packages().map(|p| p.name.clone()).collect()
    }

    /// Discovery position of a package
    pub fn position(&self, name: &str) -> Option<usize> {
        self.node_map.get(name).map(|idx| idx.index())
    }

    /// Local packages that depend on `name`
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Local packages that `name` depends on
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(name) else {
            return Vec::new();
        };
        let unique: BTreeSet<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        unique
            .into_iter()
            .map(|n| self.graph[n].name.as_str())
            .collect()
    }

    /// Local dependency edges declared by `dependent`, as (dependency name, edge)
    pub fn local_dependencies(&self, dependent: &str) -> Vec<(&str, &DependencyEdge)> {
        let Some(&idx) = self.node_map.get(dependent) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(_, id, _)| *id);
        edges
            .into_iter()
            .map(|(source, _, weight)| (self.graph[source].name.as_str(), weight))
            .collect()
    }

    /// Package names with dependencies before dependents.
    ///
    /// Members of a cycle are emitted together in discovery order; unrelated
    /// packages keep discovery order.
    pub fn topological_order(&self) -> Vec<String> {
        let components = tarjan_scc(&self.graph);

        let mut component_of = vec![0usize; self.graph.node_count()];
        for (c, members) in components.iter().enumerate() {
            for idx in members {
                component_of[idx.index()] = c;
            }
        }

        // Component-level in-degrees, ignoring edges inside a component
        let mut in_degree = vec![0usize; components.len()];
        let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); components.len()];
        for edge in self.graph.edge_references() {
            let from = component_of[edge.source().index()];
            let to = component_of[edge.target().index()];
            if from != to && successors[from].insert(to) {
                in_degree[to] += 1;
            }
        }

        let first_index = |c: usize| {
            components[c]
                .iter()
                .map(|idx| idx.index())
                .min()
                .unwrap_or(usize::MAX)
        };

        let mut ready: BTreeSet<(usize, usize)> = (0..components.len())
            .filter(|&c| in_degree[c] == 0)
            .map(|c| (first_index(c), c))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some((_, c)) = ready.pop_first() {
            let mut members: Vec<NodeIndex> = components[c].clone();
            members.sort();
            order.extend(members.into_iter().map(|idx| self.graph[idx].name.clone()));

            for &next in &successors[c] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.insert((first_index(next), next));
                }
            }
        }

        order
    }

    /// Consumes the graph, returning packages in discovery order
    pub fn into_packages(self) -> Vec<Package> {
        let (nodes, _) = self.graph.into_nodes_edges();
        nodes.into_iter().map(|n| n.weight).collect()
    }
}
