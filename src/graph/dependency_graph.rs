//! Adjacency graph over object identities with wave sorting.

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;
use std::fmt;

use super::GraphError;
use crate::core::ObjectId;

/// Directed edge: `from` requires `to` to be applied first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Dependent object
    pub from: ObjectId,
    /// Prerequisite object
    pub to: ObjectId,
}

impl Edge {
    /// Create a new edge.
    pub fn new(from: ObjectId, to: ObjectId) -> Self {
        Self {
            from,
            to,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Dependency graph over object identities.
///
/// Edges point from a dependent to its prerequisite. Adding an edge that
/// already exists is a no-op, as is adding a vertex twice. Vertex order is
/// insertion order and is reused as the order of objects inside a wave.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph.
    graph: StableDiGraph<ObjectId, ()>,
    /// Map from identities to their graph indices.
    node_map: HashMap<ObjectId, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex if it doesn't already exist, returning its index.
    pub fn add_vertex(&mut self, id: ObjectId) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&id) {
            index
        } else {
            let index = self.graph.add_node(id.clone());
            self.node_map.insert(id, index);
            index
        }
    }

    /// Add a dependency: `from` requires `to` to be applied first.
    ///
    /// Missing vertices are added. Duplicate edges collapse.
    pub fn add_edge(&mut self, from: ObjectId, to: ObjectId) {
        let from_idx = self.add_vertex(from);
        let to_idx = self.add_vertex(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Whether `id` is a vertex.
    pub fn contains_vertex(&self, id: &ObjectId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Whether the edge `from -> to` exists.
    pub fn contains_edge(&self, from: &ObjectId, to: &ObjectId) -> bool {
        match (self.node_map.get(from), self.node_map.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Direct prerequisites of `id`.
    pub fn dependencies(&self, id: &ObjectId) -> Vec<ObjectId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Direct dependents of `id`.
    pub fn dependents(&self, id: &ObjectId) -> Vec<ObjectId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &ObjectId, direction: Direction) -> Vec<ObjectId> {
        let Some(&index) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(index, direction).collect();
        neighbors.sort();
        neighbors.into_iter().map(|n| self.graph[n].clone()).collect()
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> Vec<ObjectId> {
        self.graph.node_indices().map(|idx| self.graph[idx].clone()).collect()
    }

    /// All edges.
    pub fn edges(&self) -> Vec<Edge> {
        collect_edges(&self.graph)
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of vertices.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sort the vertices into waves.
    ///
    /// Each wave holds every vertex whose prerequisites all sit in earlier
    /// waves. Repeatedly takes the vertices without outgoing edges, then
    /// removes them and the edges pointing at them. A non-empty remainder with
    /// no such vertex is a cycle, reported with every remaining edge.
    pub fn sort(&self) -> Result<Vec<Vec<ObjectId>>, GraphError> {
        let mut working = self.graph.clone();
        let mut waves = Vec::new();

        while working.node_count() > 0 {
            let mut leaves: Vec<NodeIndex> = working.externals(Direction::Outgoing).collect();
            if leaves.is_empty() {
                return Err(GraphError::CyclicDependency {
                    edges: collect_edges(&working),
                });
            }
            leaves.sort();

            waves.push(leaves.iter().map(|&idx| working[idx].clone()).collect());
            for idx in leaves {
                working.remove_node(idx);
            }
        }

        Ok(waves)
    }

    /// Mirror image of [`sort`](Self::sort) for teardown ordering.
    ///
    /// Same waves, outer order reversed and each wave's order reversed.
    pub fn reverse_sort(&self) -> Result<Vec<Vec<ObjectId>>, GraphError> {
        let mut waves = self.sort()?;
        waves.reverse();
        for wave in &mut waves {
            wave.reverse();
        }
        Ok(waves)
    }
}

fn collect_edges(graph: &StableDiGraph<ObjectId, ()>) -> Vec<Edge> {
    graph
        .edge_references()
        .map(|edge| Edge::new(graph[edge.source()].clone(), graph[edge.target()].clone()))
        .collect()
}
