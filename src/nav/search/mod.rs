//! Graph search strategies over [`Graph`].
//!
//! Every algorithm follows the same life cycle: construct with a source and
//! an optional target, call [`GraphSearch::search`], read `path()` and
//! `search_tree()`, then `clear()` before searching again.

mod astar;
mod bfs;
mod dfs;
mod dijkstra;
mod heuristic;
mod priority_queue;


pub use astar::AStar;
pub use bfs::Bfs;
pub use dfs::Dfs;
pub use dijkstra::Dijkstra;
pub use heuristic::{Euclidean, EuclideanSquared, Heuristic, HeuristicPolicy, Manhattan, Zero};
pub use priority_queue::PriorityQueue;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::graph::{Edge, Graph};

/// Common interface of every search algorithm.
pub trait GraphSearch {
    /// Run the search. Returns whether the target was reached.
    fn search(&mut self) -> bool;

    fn found(&self) -> bool;

    /// Node indices from source to target, empty when the target was not
    /// reached or no target was given.
    fn path(&self) -> Vec<usize>;

    /// Edges that were settled during the search, in settlement order.
    fn search_tree(&self) -> Vec<Edge>;

    /// Reset internal state so the instance can search again.
    fn clear(&mut self);
}

/// Algorithm selector for [`create_search`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchKind {
    #[default]
    AStar,
    Dijkstra,
    Bfs,
    Dfs,
}

/// Build any search algorithm behind a trait object.
///
/// `heuristic` is only used by [`SearchKind::AStar`].
pub fn create_search<'a>(
    kind: SearchKind,
    graph: &'a Graph,
    source: usize,
    target: impl Into<Option<usize>>,
    heuristic: HeuristicPolicy,
) -> Box<dyn GraphSearch + 'a> {
    let target = target.into();
    match kind {
        SearchKind::AStar => Box::new(AStar::with_heuristic(graph, source, target, heuristic)),
        SearchKind::Dijkstra => Box::new(Dijkstra::new(graph, source, target)),
        SearchKind::Bfs => Box::new(Bfs::new(graph, source, target)),
        SearchKind::Dfs => Box::new(Dfs::new(graph, source, target)),
    }
}

/// Frontier entry of the weighted searches.
#[derive(Clone, Copy, Debug)]
pub(crate) struct QueueEntry {
    pub cost: f32,
    pub index: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Walk predecessors back from `target` to `source`.
///
/// Gives up with an empty path after `max_hops` steps or on a missing link.
pub(crate) fn reconstruct_path(
    source: usize,
    target: usize,
    max_hops: usize,
    predecessor: impl Fn(usize) -> Option<usize>,
) -> Vec<usize> {
    let mut path = vec![target];
    let mut current = target;

    while current != source {
        if path.len() > max_hops {
            return Vec::new();
        }
        match predecessor(current) {
            Some(previous) => {
                path.push(previous);
                current = previous;
            }
            None => return Vec::new(),
        }
    }

    path.reverse();
    path
}
