use serde::{Deserialize, Serialize};

use crate::nav::graph::Graph;

/// Estimate of the remaining cost between two graph nodes.
///
/// Unknown nodes estimate to `0`.
pub trait Heuristic {
    fn calculate(&self, graph: &Graph, source: usize, target: usize) -> f32;
}

fn positions(graph: &Graph, source: usize, target: usize) -> Option<(bevy::math::Vec3, bevy::math::Vec3)> {
    Some((graph.node(source)?.position, graph.node(target)?.position))
}

/// Straight-line distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl Heuristic for Euclidean {
    fn calculate(&self, graph: &Graph, source: usize, target: usize) -> f32 {
        positions(graph, source, target).map_or(0.0, |(a, b)| a.distance(b))
    }
}

/// Squared straight-line distance. Cheaper, but can overestimate.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanSquared;

impl Heuristic for EuclideanSquared {
    fn calculate(&self, graph: &Graph, source: usize, target: usize) -> f32 {
        positions(graph, source, target).map_or(0.0, |(a, b)| a.distance_squared(b))
    }
}

/// Sum of absolute per-axis differences.
#[derive(Clone, Copy, Debug, Default)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    fn calculate(&self, graph: &Graph, source: usize, target: usize) -> f32 {
        positions(graph, source, target).map_or(0.0, |(a, b)| (a - b).abs().element_sum())
    }
}

/// Always `0`, which turns A* into Dijkstra.
#[derive(Clone, Copy, Debug, Default)]
pub struct Zero;

impl Heuristic for Zero {
    fn calculate(&self, _graph: &Graph, _source: usize, _target: usize) -> f32 {
        0.0
    }
}

/// Heuristic selected at runtime, e.g. from a config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeuristicPolicy {
    #[default]
    Euclidean,
    EuclideanSquared,
    Manhattan,
    Zero,
}

impl Heuristic for HeuristicPolicy {
    fn calculate(&self, graph: &Graph, source: usize, target: usize) -> f32 {
        match self {
            HeuristicPolicy::Euclidean => Euclidean.calculate(graph, source, target),
            HeuristicPolicy::EuclideanSquared => EuclideanSquared.calculate(graph, source, target),
            HeuristicPolicy::Manhattan => Manhattan.calculate(graph, source, target),
            HeuristicPolicy::Zero => Zero.calculate(graph, source, target),
        }
    }
}
