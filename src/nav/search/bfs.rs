use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use super::{reconstruct_path, GraphSearch};
use crate::nav::graph::{Edge, Graph};

/// Breadth-first search. Finds a path with the fewest edges, ignoring cost.
///
/// Nodes are marked visited when enqueued.
pub struct Bfs<'a> {
    graph: &'a Graph,
    pub source: usize,
    pub target: Option<usize>,
    found: bool,
    /// `route[to] = from` for every dequeued edge.
    route: FxHashMap<usize, usize>,
    visited: FixedBitSet,
    spanning_tree: Vec<Edge>,
}

impl<'a> Bfs<'a> {
    pub fn new(graph: &'a Graph, source: usize, target: impl Into<Option<usize>>) -> Self {
        Self {
            graph,
            source,
            target: target.into(),
            found: false,
            route: FxHashMap::default(),
            visited: FixedBitSet::new(),
            spanning_tree: Vec::new(),
        }
    }
}

pub(super) fn mark_visited(visited: &mut FixedBitSet, index: usize) {
    if index >= visited.len() {
        visited.grow(index + 1);
    }
    visited.insert(index);
}

impl GraphSearch for Bfs<'_> {
    fn search(&mut self) -> bool {
        let mut queue = VecDeque::new();
        queue.push_back(Edge::new(self.source, self.source, 0.0));
        mark_visited(&mut self.visited, self.source);

        while let Some(next) = queue.pop_front() {
            self.route.insert(next.to, next.from);

            // The seed self-loop is not part of the tree.
            if next.from != next.to {
                self.spanning_tree.push(next);
            }

            if Some(next.to) == self.target {
                self.found = true;
                return true;
            }

            for edge in self.graph.edges(next.to) {
                if !self.visited.contains(edge.to) {
                    queue.push_back(*edge);
                    mark_visited(&mut self.visited, edge.to);
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
                reconstruct_path(self.source, target, self.route.len(), |node| {
                    self.route.get(&node).copied()
                })
            }
            _ => Vec::new(),
        }
    }

    fn search_tree(&self) -> Vec<Edge> {
        self.spanning_tree.clone()
    }

    fn clear(&mut self) {
        self.found = false;
        self.route.clear();
        self.visited.clear();
        self.spanning_tree.clear();
    }
}
