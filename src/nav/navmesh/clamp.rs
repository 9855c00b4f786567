use bevy::prelude::*;

use super::NavMesh;
use crate::nav::error::NavMeshError;
use crate::nav::half_edge::{EdgeId, PolygonId};

/// Result of [`NavMesh::clamp_movement`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClampedMovement {
    /// Region the agent ends up in.
    pub region: PolygonId,
    pub position: Vec3,
}

impl NavMesh {
    /// Keep a movement from `start` to `end` on the mesh.
    ///
    /// If `end` leaves the mesh the movement slides along the nearest border
    /// edge; if that still ends off the mesh the agent stays at `start` in
    /// `current`. Returns [`NavMeshError::NoCurrentRegion`] when `end` is off
    /// the mesh and no current region is known.
    pub fn clamp_movement(
        &self,
        current: Option<PolygonId>,
        start: Vec3,
        end: Vec3,
    ) -> Result<ClampedMovement, NavMeshError> {
        let epsilon = self.config.epsilon_contains_test;

        if let Some(region) = self.region_for_point(end, epsilon) {
            return Ok(ClampedMovement { region, position: end });
        }

        let current = current.ok_or(NavMeshError::NoCurrentRegion)?;
        let frozen = ClampedMovement { region: current, position: start };

        let Some((edge, closest_point)) = self.closest_border_edge(start) else {
            return Ok(frozen);
        };

        let direction = self.mesh.direction(edge);
        let projected = start + direction * (end - start).dot(direction);

        let t = self
            .mesh
            .segment(edge)
            .closest_point_to_point_parameter(projected, false);
        let position = if (0.0..=1.0).contains(&t) { projected } else { closest_point };

        Ok(match self.region_for_point(position, epsilon) {
            Some(region) => ClampedMovement { region, position },
            None => frozen,
        })
    }

    /// Border edge nearest to `point` together with the closest point on it.
    ///
    /// With a spatial index only the border edges of the regions in the
    /// point's cell are considered, falling back to all border edges when
    /// that cell has none.
    pub fn closest_border_edge(&self, point: Vec3) -> Option<(EdgeId, Vec3)> {
        let local: Vec<EdgeId> = self
            .spatial_index
            .as_ref()
            .and_then(|index| index.cell(index.index_for_position(point)))
            .map(|cell| {
                cell.entries
                    .iter()
                    .flat_map(|&region| self.mesh.ring(region))
                    .filter(|&edge| self.mesh.edges()[edge.index()].twin.is_none())
                    .collect()
            })
            .unwrap_or_default();

        let candidates = if local.is_empty() { &self.border_edges } else { &local };

        let mut closest = None;
        let mut min_distance = f32::INFINITY;
        for &edge in candidates {
            let closest_point = self.mesh.segment(edge).closest_point_to_point(point);
            let distance = point.distance_squared(closest_point);
            if distance < min_distance {
                min_distance = distance;
                closest = Some((edge, closest_point));
            }
        }

        closest
    }
}
