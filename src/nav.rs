//! Navigation mesh construction, graph search and path queries.

mod config;
mod corridor;
mod cost_table;
mod debug;
mod error;
mod graph;
mod half_edge;
mod math;
mod navmesh;
mod navmesh_file;
mod search;
mod spatial;
mod systems;
mod types;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use config::{NavMeshConfig, SpatialIndexConfig, NAV_MESH_CONFIG_PATH};
pub use corridor::{Corridor, PortalEdge};
pub use cost_table::CostTable;
pub use debug::{NavMeshDebug, NavMeshDebugPlugin};
pub use error::{NavMeshError, NavMeshFileError};
pub use graph::{Edge, Graph, Node};
pub use half_edge::{EdgeId, HalfEdge, HalfEdgeMesh, Polygon, PolygonId};
pub use math::{area, left_on, path_length, Aabb, LineSegment, Plane};
pub use navmesh::{ClampedMovement, NavMesh};
pub use navmesh_file::{load_nav_mesh, save_nav_mesh, NavMeshData, NAV_MESH_FILE_VERSION};
pub use search::{
    create_search, AStar, Bfs, Dfs, Dijkstra, Euclidean, EuclideanSquared, GraphSearch, Heuristic,
    HeuristicPolicy, Manhattan, PriorityQueue, SearchKind, Zero,
};
pub use spatial::{Cell, CellSpacePartitioning};
pub use types::{NavPath, PathRequest};

use bevy::prelude::*;

/// Registers the [`NavMesh`] resource, loads its config and answers
/// [`PathRequest`] messages.
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PathRequest>();
        app.init_resource::<NavMesh>();
        app.add_systems(Startup, config::load_nav_mesh_config);
        app.add_systems(Update, systems::process_path_requests);
    }
}
