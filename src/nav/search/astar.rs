use rustc_hash::{FxHashMap, FxHashSet};

use super::heuristic::{Heuristic, HeuristicPolicy};
use super::priority_queue::PriorityQueue;
use super::{reconstruct_path, GraphSearch, QueueEntry};
use crate::nav::graph::{Edge, Graph};

/// A* search keyed by `f = g + h`.
///
/// Settled nodes are skipped when popped again, so the queue never needs a
/// decrease-key operation.
pub struct AStar<'a, H = HeuristicPolicy> {
    graph: &'a Graph,
    pub source: usize,
    pub target: Option<usize>,
    heuristic: H,
    found: bool,
    /// Best known cost from the source.
    cost: FxHashMap<usize, f32>,
    /// Edge through which each settled node was reached.
    shortest_path_tree: FxHashMap<usize, Edge>,
    /// Best predecessor edge of each frontier node.
    search_frontier: FxHashMap<usize, Edge>,
    settled: FxHashSet<usize>,
    settled_order: Vec<usize>,
}

impl<'a> AStar<'a> {
    /// A* with the euclidean heuristic.
    pub fn new(graph: &'a Graph, source: usize, target: impl Into<Option<usize>>) -> Self {
        Self::with_heuristic(graph, source, target, HeuristicPolicy::Euclidean)
    }
}

impl<'a, H: Heuristic> AStar<'a, H> {
    pub fn with_heuristic(
        graph: &'a Graph,
        source: usize,
        target: impl Into<Option<usize>>,
        heuristic: H,
    ) -> Self {
        Self {
            graph,
            source,
            target: target.into(),
            heuristic,
            found: false,
            cost: FxHashMap::default(),
            shortest_path_tree: FxHashMap::default(),
            search_frontier: FxHashMap::default(),
            settled: FxHashSet::default(),
            settled_order: Vec::new(),
        }
    }

    /// Nodes in the order they were settled.
    pub fn settled(&self) -> &[usize] {
        &self.settled_order
    }

    /// Cost of the cheapest known route from the source to `node`.
    pub fn cost_to(&self, node: usize) -> Option<f32> {
        self.cost.get(&node).copied()
    }
}

impl<H: Heuristic> GraphSearch for AStar<'_, H> {
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
                let improves = !self.search_frontier.contains_key(&edge.to)
                    || self.cost.get(&edge.to).is_none_or(|&known| g < known);

                if improves {
                    let h = self
                        .target
                        .map_or(0.0, |target| self.heuristic.calculate(self.graph, edge.to, target));

                    self.cost.insert(edge.to, g);
                    self.search_frontier.insert(edge.to, *edge);
                    frontier.push(QueueEntry { cost: g + h, index: edge.to });
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
