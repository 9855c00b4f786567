use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Graph vertex with a world position used by heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub index: usize,
    pub position: Vec3,
}

impl Node {
    pub fn new(index: usize, position: Vec3) -> Self {
        Self { index, position }
    }
}

/// Weighted directed connection between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub cost: f32,
}

impl Edge {
    pub fn new(from: usize, to: usize, cost: f32) -> Self {
        Self { from, to, cost }
    }
}

/// Sparse graph keyed by node index.
///
/// `BTreeMap` keeps node and edge iteration order deterministic, which the
/// search algorithms rely on for reproducible results.
///
/// An undirected graph stores every edge once per direction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Graph {
    pub digraph: bool,
    nodes: BTreeMap<usize, Node>,
    edges: BTreeMap<usize, Vec<Edge>>,
}

impl Graph {
    pub fn new(digraph: bool) -> Self {
        Self { digraph, ..default() }
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    /// Insert a node, replacing any node with the same index. Existing edges
    /// are kept.
    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.edges.entry(node.index).or_default();
        self.nodes.insert(node.index, node);
        self
    }

    /// Insert an edge. Returns `false` when either endpoint is missing.
    ///
    /// Undirected graphs also store the reverse edge.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.has_node(edge.from) || !self.has_node(edge.to) {
            warn!(
                "[GRAPH] Rejected edge {} -> {}: endpoint missing",
                edge.from, edge.to
            );
            return false;
        }

        self.edges.entry(edge.from).or_default().push(edge);

        if !self.digraph {
            self.edges
                .entry(edge.to)
                .or_default()
                .push(Edge::new(edge.to, edge.from, edge.cost));
        }

        true
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(&index)
    }

    pub fn edge(&self, from: usize, to: usize) -> Option<&Edge> {
        self.edges.get(&from)?.iter().find(|edge| edge.to == to)
    }

    /// All nodes in ascending index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Outgoing edges of a node, empty for unknown nodes.
    pub fn edges(&self, index: usize) -> &[Edge] {
        self.edges.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Stored edge count. Undirected edges count twice.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, index: usize) -> Option<Node> {
        let node = self.nodes.remove(&index)?;
        self.edges.remove(&index);
        for edges in self.edges.values_mut() {
            edges.retain(|edge| edge.to != index);
        }
        Some(node)
    }

    /// Remove the `from -> to` edge, and its reverse in an undirected graph.
    pub fn remove_edge(&mut self, from: usize, to: usize) -> bool {
        let removed = Self::remove_directed(&mut self.edges, from, to);
        if !self.digraph {
            Self::remove_directed(&mut self.edges, to, from);
        }
        removed
    }

    fn remove_directed(edges: &mut BTreeMap<usize, Vec<Edge>>, from: usize, to: usize) -> bool {
        let Some(list) = edges.get_mut(&from) else {
            return false;
        };
        let before = list.len();
        list.retain(|edge| edge.to != to);
        list.len() != before
    }

    pub fn has_node(&self, index: usize) -> bool {
        self.nodes.contains_key(&index)
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edge(from, to).is_some()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph(digraph: bool) -> Graph {
        let mut graph = Graph::new(digraph);
        for i in 0..3 {
            graph.add_node(Node::new(i, Vec3::new(i as f32, 0.0, 0.0)));
        }
        assert!(graph.add_edge(Edge::new(0, 1, 1.0)));
        assert!(graph.add_edge(Edge::new(1, 2, 1.0)));
        graph
    }

    #[test]
    fn test_undirected_graph_stores_reverse_edges() {
        let graph = line_graph(false);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.has_edge(1, 0));
        assert!(graph.has_edge(2, 1));
    }

    #[test]
    fn test_directed_graph_stores_single_edge() {
        let graph = line_graph(true);

        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge(0, 1));
        assert!(!graph.has_edge(1, 0));
    }

    #[test]
    fn test_edge_to_missing_node_is_rejected() {
        let mut graph = line_graph(true);

        assert!(!graph.add_edge(Edge::new(0, 7, 1.0)));
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges(7).is_empty());
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = line_graph(false);

        assert!(graph.remove_node(1).is_some());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.remove_node(1).is_none());
    }

    #[test]
    fn test_remove_edge_undirected() {
        let mut graph = line_graph(false);

        assert!(graph.remove_edge(0, 1));
        assert!(!graph.has_edge(0, 1));
        assert!(!graph.has_edge(1, 0));
        assert!(!graph.remove_edge(0, 1));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_re_adding_node_keeps_edges() {
        let mut graph = line_graph(true);
        graph.add_node(Node::new(0, Vec3::new(9.0, 0.0, 0.0)));

        assert!(graph.has_edge(0, 1));
        assert_eq!(graph.node(0).unwrap().position.x, 9.0);
    }

    #[test]
    fn test_nodes_iterate_in_index_order() {
        let mut graph = Graph::directed();
        for i in [5, 1, 3] {
            graph.add_node(Node::new(i, Vec3::ZERO));
        }

        let order: Vec<usize> = graph.nodes().map(|node| node.index).collect();
        assert_eq!(order, vec![1, 3, 5]);
    }
}
