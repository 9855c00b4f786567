use bevy::prelude::*;
use kestrel_macros::profile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::math::path_length;
use super::NavMesh;
use crate::profile_log;

/// Path lengths between every pair of region graph nodes.
///
/// Useful when only the distance matters, e.g. for scoring goals, since a
/// lookup avoids running a path query.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    costs: BTreeMap<usize, BTreeMap<usize, f32>>,
}

impl CostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the table from a built navigation mesh. Unreachable pairs are
    /// stored with a cost of `0`.
    #[profile(5)]
    pub fn init(&mut self, nav_mesh: &NavMesh) -> &mut Self {
        self.clear();

        let nodes: Vec<(usize, Vec3)> = nav_mesh
            .graph()
            .nodes()
            .map(|node| (node.index, node.position))
            .collect();

        let mut queries = 0usize;
        for &(from, from_position) in &nodes {
            for &(to, to_position) in &nodes {
                let path = nav_mesh.find_path(from_position, to_position);
                self.set(from, to, path_length(&path));

                queries += 1;
                profile_log!(queries, "[COST TABLE] {} path queries done", queries);
            }
        }

        info!("[COST TABLE] Initialized {} entries for {} nodes", queries, nodes.len());
        self
    }

    pub fn set(&mut self, from: usize, to: usize, cost: f32) -> &mut Self {
        self.costs.entry(from).or_default().insert(to, cost);
        self
    }

    pub fn get(&self, from: usize, to: usize) -> Option<f32> {
        self.costs.get(&from)?.get(&to).copied()
    }

    /// Number of source nodes in the table.
    pub fn size(&self) -> usize {
        self.costs.len()
    }

    pub fn clear(&mut self) -> &mut Self {
        self.costs.clear();
        self
    }
}
