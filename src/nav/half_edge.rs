use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::error::NavMeshError;
use super::math::{left_on, LineSegment, Plane};

/// Index of a half-edge inside a [`HalfEdgeMesh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a polygon inside a [`HalfEdgeMesh`].
///
/// On a built [`NavMesh`](super::NavMesh) this is also the region index and
/// the node index in the region graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolygonId(pub u32);

impl PolygonId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One directed side of a polygon edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HalfEdge {
    /// Tail vertex. The head is the origin of `next`.
    pub origin: Vec3,
    pub next: EdgeId,
    pub prev: EdgeId,
    /// Opposing half-edge of the adjacent polygon, `None` on a mesh border.
    pub twin: Option<EdgeId>,
    pub polygon: PolygonId,
}

/// Convex planar polygon owning a ring of half-edges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// First edge of the ring.
    pub edge: EdgeId,
    pub centroid: Vec3,
    pub plane: Plane,
}

/// Arena holding every half-edge and polygon of a mesh.
///
/// Links between edges and polygons are plain indices, so the structure can be
/// cloned and serialized without losing its topology.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HalfEdgeMesh {
    edges: Vec<HalfEdge>,
    polygons: Vec<Polygon>,
}

impl HalfEdgeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a polygon built from a contour.
    ///
    /// Vertices are expected counter-clockwise seen from above (+Y). The plane
    /// is derived from the first vertex fan triangle with a non-zero area, so
    /// contours without one (collinear or coincident points) are rejected.
    pub fn add_contour(&mut self, contour: &[Vec3]) -> Result<PolygonId, NavMeshError> {
        if contour.len() < 3 {
            return Err(NavMeshError::DegenerateContour { points: contour.len() });
        }
        if let Some(vertex) = contour.iter().position(|p| !p.is_finite()) {
            return Err(NavMeshError::NonFiniteVertex { vertex });
        }
        let plane = (1..contour.len() - 1)
            .map(|i| Plane::from_coplanar_points(contour[0], contour[i], contour[i + 1]))
            .find(|plane| plane.normal != Vec3::ZERO)
            .ok_or(NavMeshError::ZeroAreaContour { points: contour.len() })?;

        let polygon = PolygonId(self.polygons.len() as u32);
        let base = self.edges.len();
        let count = contour.len();

        for (i, &origin) in contour.iter().enumerate() {
            self.edges.push(HalfEdge {
                origin,
                next: EdgeId((base + (i + 1) % count) as u32),
                prev: EdgeId((base + (i + count - 1) % count) as u32),
                twin: None,
                polygon,
            });
        }

        self.polygons.push(Polygon {
            edge: EdgeId(base as u32),
            centroid: Vec3::ZERO,
            plane,
        });
        self.compute_centroid(polygon);

        Ok(polygon)
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.polygons.clear();
    }

    pub fn edges(&self) -> &[HalfEdge] {
        &self.edges
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn edge(&self, id: EdgeId) -> Option<&HalfEdge> {
        self.edges.get(id.index())
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons.get(id.index())
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut HalfEdge {
        &mut self.edges[id.index()]
    }

    pub(crate) fn polygon_mut(&mut self, id: PolygonId) -> &mut Polygon {
        &mut self.polygons[id.index()]
    }

    pub(crate) fn push_edge(&mut self, edge: HalfEdge) -> EdgeId {
        self.edges.push(edge);
        EdgeId((self.edges.len() - 1) as u32)
    }

    pub(crate) fn push_polygon(&mut self, polygon: Polygon) -> PolygonId {
        self.polygons.push(polygon);
        PolygonId((self.polygons.len() - 1) as u32)
    }

    /// Check that every stored id points into the arenas and that the
    /// `next`/`prev`/`twin` links agree with each other.
    ///
    /// Meshes built by `NavMesh::from_polygons` always pass. Decoded ones
    /// should be checked before querying.
    pub fn validate(&self) -> Result<(), NavMeshError> {
        let edge_count = self.edges.len();
        for (i, edge) in self.edges.iter().enumerate() {
            let broken = NavMeshError::BrokenEdge { edge: i };
            if edge.next.index() >= edge_count
                || edge.prev.index() >= edge_count
                || edge.polygon.index() >= self.polygons.len()
            {
                return Err(broken);
            }
            let next = &self.edges[edge.next.index()];
            if next.prev.index() != i
                || self.edges[edge.prev.index()].next.index() != i
                || next.polygon != edge.polygon
            {
                return Err(broken);
            }
            if let Some(twin) = edge.twin {
                let paired = self
                    .edges
                    .get(twin.index())
                    .is_some_and(|t| t.twin.map(EdgeId::index) == Some(i));
                if !paired {
                    return Err(broken);
                }
            }
        }

        for (i, polygon) in self.polygons.iter().enumerate() {
            let owned = self
                .edges
                .get(polygon.edge.index())
                .is_some_and(|edge| edge.polygon.index() == i);
            if !owned {
                return Err(NavMeshError::BrokenPolygon { polygon: i });
            }
        }

        Ok(())
    }

    /// Tail vertex of an edge.
    ///
    /// # Panics
    /// If `id` is outside the edge arena. See [`HalfEdgeMesh::validate`].
    #[inline]
    pub fn from(&self, id: EdgeId) -> Vec3 {
        self.edges[id.index()].origin
    }

    /// Head vertex of an edge.
    ///
    /// # Panics
    /// If `id` or its `next` link is outside the edge arena.
    #[inline]
    pub fn to(&self, id: EdgeId) -> Vec3 {
        self.edges[self.edges[id.index()].next.index()].origin
    }

    pub fn segment(&self, id: EdgeId) -> LineSegment {
        LineSegment::new(self.from(id), self.to(id))
    }

    pub fn squared_length(&self, id: EdgeId) -> f32 {
        self.from(id).distance_squared(self.to(id))
    }

    /// Normalized tail-to-head direction.
    pub fn direction(&self, id: EdgeId) -> Vec3 {
        (self.to(id) - self.from(id)).normalize_or_zero()
    }

    /// Make two edges each other's twin.
    pub(crate) fn link_twins(&mut self, a: EdgeId, b: EdgeId) {
        self.edges[a.index()].twin = Some(b);
        self.edges[b.index()].twin = Some(a);
    }

    /// Edges of a polygon's ring, starting at its first edge. Empty for an
    /// unknown polygon.
    pub fn ring(&self, polygon: PolygonId) -> Ring<'_> {
        let start = self.polygons.get(polygon.index()).map(|p| p.edge);
        Ring {
            mesh: self,
            start: start.unwrap_or(EdgeId(0)),
            current: start,
            remaining: self.edges.len(),
        }
    }

    /// Vertices of a polygon, in ring order.
    pub fn contour(&self, polygon: PolygonId) -> SmallVec<[Vec3; 8]> {
        self.ring(polygon).map(|edge| self.from(edge)).collect()
    }

    pub fn compute_centroid(&mut self, polygon: PolygonId) {
        let contour = self.contour(polygon);
        let centroid = contour.iter().copied().sum::<Vec3>() / contour.len().max(1) as f32;
        if let Some(p) = self.polygons.get_mut(polygon.index()) {
            p.centroid = centroid;
        }
    }

    /// Convex half-plane test against every ring edge, followed by a plane
    /// distance test with the given vertical tolerance.
    pub fn contains(&self, polygon: PolygonId, point: Vec3, epsilon: f32) -> bool {
        for edge in self.ring(polygon) {
            if !left_on(self.from(edge), self.to(edge), point) {
                return false;
            }
        }

        self.polygons
            .get(polygon.index())
            .is_some_and(|p| p.plane.distance_to_point(point).abs() <= epsilon)
    }

    /// Every consecutive vertex triple turns counter-clockwise (or is collinear).
    pub fn is_convex(&self, polygon: PolygonId) -> bool {
        vertices_convex(&self.contour(polygon))
    }

    /// Every ring vertex lies within `epsilon` of the polygon's plane.
    pub fn is_coplanar(&self, polygon: PolygonId, epsilon: f32) -> bool {
        let Some(plane) = self.polygons.get(polygon.index()).map(|p| p.plane) else {
            return false;
        };
        self.ring(polygon)
            .all(|edge| plane.distance_to_point(self.from(edge)).abs() <= epsilon)
    }

    /// Shared edge leading from `polygon` into `neighbor`, as `(left, right)`
    /// seen from inside `polygon`.
    pub fn portal_edge_to(&self, polygon: PolygonId, neighbor: PolygonId) -> Option<(Vec3, Vec3)> {
        self.ring(polygon).find_map(|edge| {
            let twin = self.edges[edge.index()].twin?;
            (self.edges[twin.index()].polygon == neighbor).then(|| (self.from(edge), self.to(edge)))
        })
    }

    /// Regions sharing an edge with `polygon`, in ring order. May repeat.
    pub fn neighbors(&self, polygon: PolygonId) -> impl Iterator<Item = PolygonId> + '_ {
        self.ring(polygon).filter_map(move |edge| {
            let twin = self.edges[edge.index()].twin?;
            Some(self.edges[twin.index()].polygon)
        })
    }
}

/// `true` when every consecutive triple of a closed vertex loop satisfies `left_on`.
pub(crate) fn vertices_convex(vertices: &[Vec3]) -> bool {
    let count = vertices.len();
    (0..count).all(|i| {
        left_on(vertices[i], vertices[(i + 1) % count], vertices[(i + 2) % count])
    })
}

/// Iterator over the edges of one polygon ring.
///
/// Bounded by the arena size so a corrupted ring cannot loop forever.
pub struct Ring<'a> {
    mesh: &'a HalfEdgeMesh,
    start: EdgeId,
    current: Option<EdgeId>,
    remaining: usize,
}

impl Iterator for Ring<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let current = self.current?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let next = self.mesh.edges[current.index()].next;
        self.current = (next != self.start).then_some(next);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> [Vec3; 4] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_ring_links_are_consistent() {
        let mut mesh = HalfEdgeMesh::new();
        let polygon = mesh.add_contour(&square()).unwrap();

        let ring: Vec<EdgeId> = mesh.ring(polygon).collect();
        assert_eq!(ring.len(), 4);
        for &edge in &ring {
            let next = mesh.edge(edge).unwrap().next;
            assert_eq!(mesh.edge(next).unwrap().prev, edge);
            assert_eq!(mesh.to(edge), mesh.from(next));
        }
    }

    #[test]
    fn test_contour_rejects_fewer_than_three_points() {
        let mut mesh = HalfEdgeMesh::new();
        let result = mesh.add_contour(&[Vec3::ZERO, Vec3::X]);

        assert_eq!(result, Err(NavMeshError::DegenerateContour { points: 2 }));
        assert!(mesh.polygons().is_empty());
        assert!(mesh.edges().is_empty());
    }

    #[test]
    fn test_contour_rejects_non_finite_vertices() {
        let mut mesh = HalfEdgeMesh::new();
        let result = mesh.add_contour(&[Vec3::ZERO, Vec3::Z, Vec3::new(f32::NAN, 0.0, 0.0)]);

        assert_eq!(result, Err(NavMeshError::NonFiniteVertex { vertex: 2 }));
    }

    #[test]
    fn test_contour_rejects_zero_area() {
        let mut mesh = HalfEdgeMesh::new();
        let corner = Vec3::new(1.0, 0.0, 1.0);

        assert_eq!(
            mesh.add_contour(&[Vec3::ZERO, corner, corner]),
            Err(NavMeshError::ZeroAreaContour { points: 3 })
        );
        assert_eq!(
            mesh.add_contour(&[Vec3::ZERO, Vec3::Z, Vec3::Z * 2.0]),
            Err(NavMeshError::ZeroAreaContour { points: 3 })
        );
        assert!(mesh.polygons().is_empty());
        assert!(mesh.edges().is_empty());
    }

    #[test]
    fn test_plane_skips_collinear_leading_vertices() {
        let mut mesh = HalfEdgeMesh::new();
        let polygon = mesh
            .add_contour(&[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 2.0),
                Vec3::new(2.0, 0.0, 2.0),
                Vec3::new(2.0, 0.0, 0.0),
            ])
            .unwrap();

        assert_eq!(mesh.polygon(polygon).unwrap().plane.normal, Vec3::Y);
        assert!(!mesh.contains(polygon, Vec3::new(0.5, 3.0, 0.5), 1e-3));
    }

    #[test]
    fn test_centroid_and_containment() {
        let mut mesh = HalfEdgeMesh::new();
        let polygon = mesh.add_contour(&square()).unwrap();
        let centroid = mesh.polygon(polygon).unwrap().centroid;

        assert_eq!(centroid, Vec3::new(0.5, 0.0, 0.5));
        assert!(mesh.contains(polygon, centroid, 1e-3));
        assert!(mesh.contains(polygon, Vec3::new(1.0, 0.0, 1.0), 1e-3), "corners are inside");
        assert!(!mesh.contains(polygon, Vec3::new(1.5, 0.0, 0.5), 1e-3));
        assert!(!mesh.contains(polygon, Vec3::new(0.5, 0.5, 0.5), 1e-3), "too far above the plane");
        assert!(mesh.contains(polygon, Vec3::new(0.5, 0.5, 0.5), 1.0));
    }

    #[test]
    fn test_convexity_detects_reflex_vertex() {
        let mut mesh = HalfEdgeMesh::new();
        let convex = mesh.add_contour(&square()).unwrap();
        let dart = mesh
            .add_contour(&[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 2.0),
                Vec3::new(0.5, 0.0, 0.5),
                Vec3::new(2.0, 0.0, 0.0),
            ])
            .unwrap();

        assert!(mesh.is_convex(convex));
        assert!(!mesh.is_convex(dart));
    }

    #[test]
    fn test_coplanar_tolerance() {
        let mut mesh = HalfEdgeMesh::new();
        let mut contour = square();
        contour[3].y = 0.01;
        let polygon = mesh.add_contour(&contour).unwrap();

        assert!(!mesh.is_coplanar(polygon, 1e-3));
        assert!(mesh.is_coplanar(polygon, 0.1));
    }
}
