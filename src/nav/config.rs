use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::search::HeuristicPolicy;
use super::NavMesh;

pub const NAV_MESH_CONFIG_PATH: &str = "assets/navmesh_config.ron";

/// Settings used when building and querying a [`NavMesh`].
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavMeshConfig {
    /// Vertical tolerance when testing whether a merged region stays planar.
    pub epsilon_coplanar_test: f32,
    /// Vertical tolerance used by path queries and movement clamping when
    /// testing region containment.
    pub epsilon_contains_test: f32,
    /// Merge adjacent triangles into larger convex regions.
    pub merge_convex_regions: bool,
    pub heuristic: HeuristicPolicy,
    /// Build a spatial index over the regions right after construction.
    pub spatial_index: Option<SpatialIndexConfig>,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            epsilon_coplanar_test: 1e-3,
            epsilon_contains_test: 1.0,
            merge_convex_regions: true,
            heuristic: HeuristicPolicy::Euclidean,
            spatial_index: None,
        }
    }
}

/// Extent and resolution of a region spatial index, centred at the origin.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct SpatialIndexConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub cells_x: usize,
    pub cells_y: usize,
    pub cells_z: usize,
}

impl NavMeshConfig {
    /// Read a RON config file, falling back to defaults on any failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match ron::from_str::<NavMeshConfig>(&contents) {
                Ok(config) => {
                    info!("[CONFIG] Loaded navmesh config from {}", path.display());
                    config
                }
                Err(e) => {
                    error!("[CONFIG] Failed to parse navmesh config: {}", e);
                    error!("[CONFIG] Using default NavMeshConfig");
                    Self::default()
                }
            },
            Err(e) => {
                error!("[CONFIG] Failed to read {}: {}", path.display(), e);
                error!("[CONFIG] Using default NavMeshConfig");
                Self::default()
            }
        }
    }
}

/// Load the navmesh config at startup and hand it to the [`NavMesh`] resource.
pub(crate) fn load_nav_mesh_config(mut commands: Commands, mut nav_mesh: ResMut<NavMesh>) {
    let config = NavMeshConfig::load(NAV_MESH_CONFIG_PATH);
    nav_mesh.config = config.clone();
    commands.insert_resource(config);
}
