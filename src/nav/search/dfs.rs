use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;

use super::bfs::mark_visited;
use super::{reconstruct_path, GraphSearch};
use crate::nav::graph::{Edge, Graph};

/// Depth-first search.
///
/// Nodes are marked visited when popped, so a node can sit on the stack more
/// than once. Stale entries for already visited nodes are dropped on pop.
pub struct Dfs<'a> {
    graph: &'a Graph,
    pub source: usize,
    pub target: Option<usize>,
    found: bool,
    route: FxHashMap<usize, usize>,
    visited: FixedBitSet,
    spanning_tree: Vec<Edge>,
}

impl<'a> Dfs<'a> {
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

impl GraphSearch for Dfs<'_> {
    fn search(&mut self) -> bool {
        let mut stack = vec![Edge::new(self.source, self.source, 0.0)];

        while let Some(next) = stack.pop() {
            if self.visited.contains(next.to) {
                continue;
            }

            self.route.insert(next.to, next.from);
            mark_visited(&mut self.visited, next.to);

            if next.from != next.to {
                self.spanning_tree.push(next);
            }

            if Some(next.to) == self.target {
                self.found = true;
                return true;
            }

            for edge in self.graph.edges(next.to) {
                if !self.visited.contains(edge.to) {
                    stack.push(*edge);
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
