use rustc_hash::{FxHashMap, FxHashSet};

use super::priority_queue::PriorityQueue;
use super::{reconstruct_path, GraphSearch, QueueEntry};
use crate::nav::graph::{Edge, Graph};

/// Uniform-cost search.
///
/// Without a target the search settles every reachable node and the search
/// tree becomes the full shortest-path tree of the source.
pub struct Dijkstra<'a> {
    graph: &'a Graph,
    pub source: usize,
    pub target: Option<usize>,
    found: bool,
    cost: FxHashMap<usize, f32>,
    shortest_path_tree: FxHashMap<usize, Edge>,
    search_frontier: FxHashMap<usize, Edge>,
    settled: FxHashSet<usize>,
    settled_order: Vec<usize>,
}

impl<'a> Dijkstra<'a> {
    pub fn new(graph: &'a Graph, source: usize, target: impl Into<Option<usize>>) -> Self {
        Self {
            graph,
            source,
            target: target.into(),
            found: false,
            cost: FxHashMap::default(),
            shortest_path_tree: FxHashMap::default(),
            search_frontier: FxHashMap::default(),
            settled: FxHashSet::default(),
            settled_order: Vec::new(),
        }
    }

    pub fn settled(&self) -> &[usize] {
        &self.settled_order
    }

    /// Final cost of a settled node.
    pub fn cost_to(&self, node: usize) -> Option<f32> {
        if self.settled.contains(&node) {
            self.cost.get(&node).copied()
        } else {
            None
        }
    }
}

impl GraphSearch for Dijkstra<'_> {
    fn search(&mut self) -> bool {
        let mut frontier = PriorityQueue::new();
        self.cost.insert(self.source, 0.0);
        frontier.push(QueueEntry { cost: 0.0, index: self.source });

        while let Some(QueueEntry { index: current, .. }) = frontier.pop() {
            if !self.settled.insert(current) {
                continue;
            }
            self.settled_order.push(current);

            if let Some(&edge) = self.search_frontier.get(&current) {
                self.shortest_path_tree.insert(current, edge);
            }

            if Some(current) == self.target {
                self.found = true;
                return true;
            }

            let g_current = self.cost.get(&current).copied().unwrap_or(0.0);

            for edge in self.graph.edges(current) {
                if self.settled.contains(&edge.to) {
                    continue;
                }

                let g = g_current + edge.cost;
                if !self.search_frontier.contains_key(&edge.to)
                    || self.cost.get(&edge.to).is_none_or(|&known| g < known)
                {
                    self.cost.insert(edge.to, g);
                    self.search_frontier.insert(edge.to, *edge);
                    frontier.push(QueueEntry { cost: g, index: edge.to });
                }
            }
        }

        self.found = false;
        false
    }

    fn found(&self) -> bool {
        self.found
    }

    fn path(&self) -> Vec<usize> {
        match self.target {
            Some(target) if self.found => {
                reconstruct_path(self.source, target, self.shortest_path_tree.len(), |node| {
                    self.shortest_path_tree.get(&node).map(|edge| edge.from)
                })
            }
            _ => Vec::new(),
        }
    }

    fn search_tree(&self) -> Vec<Edge> {
        self.settled_order
            .iter()
            .filter_map(|node| self.shortest_path_tree.get(node).copied())
            .collect()
    }

    fn clear(&mut self) {
        self.found = false;
        self.cost.clear();
        self.shortest_path_tree.clear();
        self.search_frontier.clear();
        self.settled.clear();
        self.settled_order.clear();
    }
}
