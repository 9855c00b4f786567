//! Navigation mesh: convex regions, their adjacency graph and the queries
//! agents run against them.

mod build;
mod clamp;


pub use clamp::ClampedMovement;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::NavMeshConfig;
use super::corridor::Corridor;
use super::error::NavMeshError;
use super::graph::Graph;
use super::half_edge::{EdgeId, HalfEdgeMesh, Polygon, PolygonId};
use super::search::{AStar, GraphSearch};
use super::spatial::CellSpacePartitioning;

/// Walkable surface made of convex regions.
///
/// Built once through [`NavMesh::from_polygons`]; afterwards only the spatial
/// index changes. Region `i` is node `i` of the region graph.
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct NavMesh {
    pub config: NavMeshConfig,
    mesh: HalfEdgeMesh,
    graph: Graph,
    spatial_index: Option<CellSpacePartitioning<PolygonId>>,
    border_edges: Vec<EdgeId>,
}

impl NavMesh {
    pub fn new(config: NavMeshConfig) -> Self {
        Self { config, ..default() }
    }

    /// Drop regions, graph, border edges and spatial index. The config is kept.
    pub fn clear(&mut self) -> &mut Self {
        self.mesh.clear();
        self.graph.clear();
        self.spatial_index = None;
        self.border_edges.clear();
        self
    }

    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    pub fn regions(&self) -> &[Polygon] {
        self.mesh.polygons()
    }

    pub fn region(&self, id: PolygonId) -> Option<&Polygon> {
        self.mesh.polygon(id)
    }

    pub fn region_count(&self) -> usize {
        self.mesh.polygons().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.polygons().is_empty()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Half-edges without a twin, i.e. the outline of the walkable surface.
    pub fn border_edges(&self) -> &[EdgeId] {
        &self.border_edges
    }

    pub fn spatial_index(&self) -> Option<&CellSpacePartitioning<PolygonId>> {
        self.spatial_index.as_ref()
    }

    /// Install (or remove) a spatial index and fill it with the current regions.
    pub fn set_spatial_index(&mut self, index: Option<CellSpacePartitioning<PolygonId>>) -> &mut Self {
        self.spatial_index = index;
        self.update_spatial_index()
    }

    /// Re-register every region in the spatial index.
    pub fn update_spatial_index(&mut self) -> &mut Self {
        let Some(index) = self.spatial_index.as_mut() else {
            return self;
        };

        index.make_empty();
        for (i, _) in self.mesh.polygons().iter().enumerate() {
            let region = PolygonId(i as u32);
            index.add_polygon(region, &self.mesh.contour(region));
        }

        debug!(
            "[SPATIAL] Indexed {} regions into {} cells",
            self.mesh.polygons().len(),
            index.cell_count()
        );
        self
    }

    /// Check the half-edge topology and every region or edge id held by the
    /// border list, the graph and the spatial index.
    pub fn validate(&self) -> Result<(), NavMeshError> {
        self.mesh.validate()?;

        let edge_count = self.mesh.edges().len();
        if let Some(&edge) = self.border_edges.iter().find(|e| e.index() >= edge_count) {
            return Err(NavMeshError::DanglingReference { what: "border edge", index: edge.index() });
        }

        let region_count = self.region_count();
        if let Some(node) = self.graph.nodes().find(|node| node.index >= region_count) {
            return Err(NavMeshError::DanglingReference { what: "graph node", index: node.index });
        }

        if let Some(index) = &self.spatial_index {
            let dangling = index
                .cells()
                .iter()
                .flat_map(|cell| cell.entries.iter())
                .find(|region| region.index() >= region_count);
            if let Some(region) = dangling {
                return Err(NavMeshError::DanglingReference { what: "indexed region", index: region.index() });
            }
        }

        Ok(())
    }

    /// Region containing `point`, testing the vertical distance against
    /// `epsilon`.
    pub fn region_for_point(&self, point: Vec3, epsilon: f32) -> Option<PolygonId> {
        match &self.spatial_index {
            Some(index) => {
                let cell = index.cell(index.index_for_position(point))?;
                cell.entries
                    .iter()
                    .copied()
                    .find(|&region| self.mesh.contains(region, point, epsilon))
            }
            None => (0..self.region_count())
                .map(|i| PolygonId(i as u32))
                .find(|&region| self.mesh.contains(region, point, epsilon)),
        }
    }

    /// Region whose centroid is nearest to `point`.
    pub fn closest_region(&self, point: Vec3) -> Option<PolygonId> {
        let mut closest = None;
        let mut min_distance = f32::INFINITY;

        for (i, region) in self.mesh.polygons().iter().enumerate() {
            let distance = region.centroid.distance_squared(point);
            if distance < min_distance {
                min_distance = distance;
                closest = Some(PolygonId(i as u32));
            }
        }

        closest
    }

    pub fn random_region(&self, rng: &mut impl Rng) -> Option<PolygonId> {
        if self.is_empty() {
            return None;
        }
        Some(PolygonId(rng.random_range(0..self.region_count()) as u32))
    }

    /// Shortest walkable polyline from `from` to `to`.
    ///
    /// Points off the mesh snap to the closest region. An empty result means
    /// there is no route.
    pub fn find_path(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        let epsilon = self.config.epsilon_contains_test;

        let Some(from_region) = self
            .region_for_point(from, epsilon)
            .or_else(|| self.closest_region(from))
        else {
            return Vec::new();
        };
        let Some(to_region) = self
            .region_for_point(to, epsilon)
            .or_else(|| self.closest_region(to))
        else {
            return Vec::new();
        };

        if from_region == to_region {
            return vec![from, to];
        }

        let mut astar = AStar::with_heuristic(
            &self.graph,
            from_region.index(),
            to_region.index(),
            self.config.heuristic,
        );
        if !astar.search() {
            debug!(
                "[PATHFINDING] No route between regions {} and {}",
                from_region.index(),
                to_region.index()
            );
            return Vec::new();
        }

        let mut corridor = Corridor::new();
        corridor.push(from, from);

        for pair in astar.path().windows(2) {
            let region = PolygonId(pair[0] as u32);
            let next = PolygonId(pair[1] as u32);
            if let Some((left, right)) = self.mesh.portal_edge_to(region, next) {
                corridor.push(left, right);
            }
        }

        corridor.push(to, to);
        corridor.generate()
    }
}
