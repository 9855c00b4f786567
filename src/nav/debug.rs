use bevy::prelude::*;

use super::half_edge::PolygonId;
use super::types::NavPath;
use super::NavMesh;

/// Toggles for the navmesh gizmos.
#[derive(Resource, Debug, Clone)]
pub struct NavMeshDebug {
    pub show_regions: bool,
    pub show_border_edges: bool,
    pub show_graph: bool,
    pub show_paths: bool,
    /// Lift above the surface so lines don't z-fight with the ground.
    pub height_offset: f32,
}

impl Default for NavMeshDebug {
    fn default() -> Self {
        Self {
            show_regions: true,
            show_border_edges: true,
            show_graph: false,
            show_paths: true,
            height_offset: 0.05,
        }
    }
}

/// Opt-in gizmo drawing for [`NavMesh`] and active [`NavPath`]s.
pub struct NavMeshDebugPlugin;

impl Plugin for NavMeshDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavMeshDebug>();
        app.add_systems(Update, (draw_nav_mesh_gizmos, draw_nav_path_gizmos));
    }
}

fn draw_nav_mesh_gizmos(nav_mesh: Res<NavMesh>, debug: Res<NavMeshDebug>, mut gizmos: Gizmos) {
    let lift = Vec3::Y * debug.height_offset;
    let mesh = nav_mesh.mesh();

    if debug.show_regions {
        for i in 0..nav_mesh.region_count() {
            let outline = region_outline(&nav_mesh, PolygonId(i as u32), lift);
            if !outline.is_empty() {
                gizmos.linestrip(outline, Color::srgb(0.2, 0.6, 1.0));
            }
        }
    }

    if debug.show_border_edges {
        for &edge in nav_mesh.border_edges() {
            gizmos.line(mesh.from(edge) + lift * 2.0, mesh.to(edge) + lift * 2.0, Color::srgb(1.0, 0.3, 0.1));
        }
    }

    if debug.show_graph {
        let graph = nav_mesh.graph();
        for node in graph.nodes() {
            for edge in graph.edges(node.index) {
                if let Some(to) = graph.node(edge.to) {
                    gizmos.line(node.position + lift * 3.0, to.position + lift * 3.0, Color::srgb(0.9, 0.9, 0.2));
                }
            }
        }
    }
}

/// Closed, lifted outline of a region: its contour with the first vertex
/// repeated at the end.
fn region_outline(nav_mesh: &NavMesh, region: PolygonId, lift: Vec3) -> Vec<Vec3> {
    let contour = nav_mesh.mesh().contour(region);
    let Some(&first) = contour.first() else {
        return Vec::new();
    };
    contour.iter().chain(std::iter::once(&first)).map(|&v| v + lift).collect()
}

fn draw_nav_path_gizmos(debug: Res<NavMeshDebug>, paths: Query<&NavPath>, mut gizmos: Gizmos) {
    if !debug.show_paths {
        return;
    }

    let lift = Vec3::Y * debug.height_offset * 4.0;
    for path in &paths {
        let remaining = path.remaining();
        if remaining.len() < 2 {
            continue;
        }
        gizmos.linestrip(remaining.iter().map(|&v| v + lift), Color::srgb(0.2, 1.0, 0.4));
    }
}
