use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use kestrel_macros::profile;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::NavMesh;
use crate::nav::graph::{Edge, Graph, Node};
use crate::nav::half_edge::{vertices_convex, EdgeId, HalfEdge, HalfEdgeMesh, Polygon, PolygonId};
use crate::nav::spatial::CellSpacePartitioning;

/// Bit pattern of a vertex; `-0.0` and `0.0` map to the same key.
type VertexKey = [u32; 3];

fn vertex_key(v: Vec3) -> VertexKey {
    [(v.x + 0.0).to_bits(), (v.y + 0.0).to_bits(), (v.z + 0.0).to_bits()]
}

impl NavMesh {
    /// Build the mesh from polygon contours, replacing any previous content.
    ///
    /// Contours are expected counter-clockwise seen from above. Invalid
    /// contours are logged and skipped.
    #[profile]
    pub fn from_polygons<I, C>(&mut self, contours: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[Vec3]>,
    {
        self.clear();

        let mut mesh = HalfEdgeMesh::new();
        let mut input_count = 0;
        let mut rejected = 0;

        for (i, contour) in contours.into_iter().enumerate() {
            input_count += 1;
            if let Err(e) = mesh.add_contour(contour.as_ref()) {
                rejected += 1;
                warn!("[NAVMESH] Skipping contour {}: {}", i, e);
            }
        }

        let candidates = link_twins(&mut mesh);
        let mut removed = FixedBitSet::with_capacity(mesh.polygons().len());
        let merges = if self.config.merge_convex_regions {
            merge_convex_regions(&mut mesh, &candidates, self.config.epsilon_coplanar_test, &mut removed)
        } else {
            0
        };

        self.mesh = compact(&mesh, &removed);
        self.border_edges = (0..self.mesh.edges().len())
            .map(|i| EdgeId(i as u32))
            .filter(|&edge| self.mesh.edges()[edge.index()].twin.is_none())
            .collect();
        self.graph = build_graph(&self.mesh);

        if let Some(config) = self.config.spatial_index {
            self.set_spatial_index(Some(CellSpacePartitioning::from_config(&config)));
        }

        info!(
            "[NAVMESH] Built from {} contours ({} rejected): {} twin pairs, {} merges, {} regions, {} border edges, {} graph edges",
            input_count,
            rejected,
            candidates.len(),
            merges,
            self.region_count(),
            self.border_edges.len(),
            self.graph.edge_count()
        );

        self
    }

    /// Build the mesh from a flat `[x, y, z, ...]` position buffer.
    ///
    /// With an index buffer every three indices form a triangle, otherwise
    /// every three consecutive vertices do. Out of range triangles and
    /// trailing values are logged and skipped.
    pub fn from_buffers(&mut self, positions: &[f32], indices: Option<&[u32]>) -> &mut Self {
        if positions.len() % 3 != 0 {
            warn!(
                "[NAVMESH] Position buffer length {} is not a multiple of 3, ignoring the remainder",
                positions.len()
            );
        }

        let vertices: Vec<Vec3> = positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();

        let triangles: Vec<[Vec3; 3]> = match indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    warn!(
                        "[NAVMESH] Index buffer length {} is not a multiple of 3, ignoring the remainder",
                        indices.len()
                    );
                }
                indices
                    .chunks_exact(3)
                    .filter_map(|triangle| {
                        let corner = |i: u32| vertices.get(i as usize).copied();
                        match (corner(triangle[0]), corner(triangle[1]), corner(triangle[2])) {
                            (Some(a), Some(b), Some(c)) => Some([a, b, c]),
                            _ => {
                                warn!(
                                    "[NAVMESH] Triangle {:?} references a vertex outside 0..{}",
                                    triangle,
                                    vertices.len()
                                );
                                None
                            }
                        }
                    })
                    .collect()
            }
            None => {
                if vertices.len() % 3 != 0 {
                    warn!(
                        "[NAVMESH] {} vertices do not form whole triangles, ignoring the remainder",
                        vertices.len()
                    );
                }
                vertices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect()
            }
        };

        self.from_polygons(triangles)
    }
}

/// Pair every half-edge with the first later edge running the opposite way
/// along the same endpoints.
///
/// Returns one edge per pair, sorted by descending length.
fn link_twins(mesh: &mut HalfEdgeMesh) -> Vec<EdgeId> {
    let edge_count = mesh.edges().len();

    let mut by_endpoints: FxHashMap<(VertexKey, VertexKey), Vec<EdgeId>> = FxHashMap::default();
    for i in 0..edge_count {
        let edge = EdgeId(i as u32);
        by_endpoints
            .entry((vertex_key(mesh.from(edge)), vertex_key(mesh.to(edge))))
            .or_default()
            .push(edge);
    }

    let mut candidates = Vec::new();
    for i in 0..edge_count {
        let edge = EdgeId(i as u32);
        if mesh.edges()[i].twin.is_some() || mesh.squared_length(edge) == 0.0 {
            continue;
        }

        let polygon = mesh.edges()[i].polygon;
        let reverse = (vertex_key(mesh.to(edge)), vertex_key(mesh.from(edge)));
        let twin = by_endpoints.get(&reverse).and_then(|matches| {
            matches.iter().copied().find(|&other| {
                let candidate = &mesh.edges()[other.index()];
                other.index() > i && candidate.twin.is_none() && candidate.polygon != polygon
            })
        });

        if let Some(twin) = twin {
            mesh.link_twins(edge, twin);
            candidates.push(edge);
        }
    }

    candidates.sort_by(|a, b| mesh.squared_length(*b).total_cmp(&mesh.squared_length(*a)));
    candidates
}

/// Follow `next` from `start` until `stop`, pushing every edge except `stop`.
fn walk(mesh: &HalfEdgeMesh, start: EdgeId, stop: EdgeId, ring: &mut SmallVec<[EdgeId; 16]>) -> bool {
    let mut current = start;
    for _ in 0..=mesh.edges().len() {
        if current == stop {
            return true;
        }
        ring.push(current);
        current = mesh.edges()[current.index()].next;
    }
    false
}

/// Ring that would result from removing the shared edge between the polygons
/// of `edge` and `twin`. Leaves the mesh untouched.
fn spliced_ring(mesh: &HalfEdgeMesh, edge: EdgeId, twin: EdgeId) -> Option<SmallVec<[EdgeId; 16]>> {
    let e = &mesh.edges()[edge.index()];
    let t = &mesh.edges()[twin.index()];

    let mut ring = SmallVec::new();
    ring.push(e.prev);
    if !walk(mesh, t.next, twin, &mut ring) || !walk(mesh, e.next, e.prev, &mut ring) {
        return None;
    }
    Some(ring)
}

/// Relink `ring` as the sole boundary of `polygon`.
fn commit_ring(mesh: &mut HalfEdgeMesh, ring: &[EdgeId], polygon: PolygonId) {
    let count = ring.len();
    for (i, &id) in ring.iter().enumerate() {
        let edge = mesh.edge_mut(id);
        edge.next = ring[(i + 1) % count];
        edge.prev = ring[(i + count - 1) % count];
        edge.polygon = polygon;
    }
    mesh.polygon_mut(polygon).edge = ring[0];
}

/// Greedily merge polygons across the candidate edges while the union stays
/// convex and planar. Absorbed polygons are flagged in `removed`.
fn merge_convex_regions(
    mesh: &mut HalfEdgeMesh,
    candidates: &[EdgeId],
    epsilon: f32,
    removed: &mut FixedBitSet,
) -> usize {
    let mut merges = 0;

    for &edge in candidates {
        let Some(twin) = mesh.edges()[edge.index()].twin else {
            continue;
        };
        let polygon = mesh.edges()[edge.index()].polygon;
        let absorbed = mesh.edges()[twin.index()].polygon;
        if polygon == absorbed {
            continue;
        }

        let Some(ring) = spliced_ring(mesh, edge, twin) else {
            warn!("[NAVMESH] Broken ring around edge {}, skipping merge", edge.index());
            continue;
        };

        let vertices: SmallVec<[Vec3; 16]> = ring.iter().map(|&id| mesh.from(id)).collect();
        if !vertices_convex(&vertices) {
            continue;
        }

        let plane = mesh.polygons()[polygon.index()].plane;
        if !vertices.iter().all(|&v| plane.distance_to_point(v).abs() <= epsilon) {
            continue;
        }

        commit_ring(mesh, &ring, polygon);
        removed.insert(absorbed.index());
        merges += 1;
    }

    merges
}

/// Copy surviving polygons into a fresh arena so that polygon ids are dense
/// and every ring is stored contiguously.
fn compact(mesh: &HalfEdgeMesh, removed: &FixedBitSet) -> HalfEdgeMesh {
    let mut compacted = HalfEdgeMesh::new();
    let mut remap: FxHashMap<EdgeId, EdgeId> = FxHashMap::default();
    let mut old_twins = Vec::with_capacity(mesh.edges().len());

    for (i, polygon) in mesh.polygons().iter().enumerate() {
        if removed.contains(i) {
            continue;
        }

        let ring: SmallVec<[EdgeId; 16]> = mesh.ring(PolygonId(i as u32)).collect();
        let id = PolygonId(compacted.polygons().len() as u32);
        let base = compacted.edges().len();
        let count = ring.len();

        for (offset, &old) in ring.iter().enumerate() {
            let new = compacted.push_edge(HalfEdge {
                origin: mesh.from(old),
                next: EdgeId((base + (offset + 1) % count) as u32),
                prev: EdgeId((base + (offset + count - 1) % count) as u32),
                twin: None,
                polygon: id,
            });
            remap.insert(old, new);
            old_twins.push(mesh.edges()[old.index()].twin);
        }

        compacted.push_polygon(Polygon { edge: EdgeId(base as u32), centroid: Vec3::ZERO, plane: polygon.plane });
        compacted.compute_centroid(id);
    }

    for (i, old_twin) in old_twins.into_iter().enumerate() {
        compacted.edge_mut(EdgeId(i as u32)).twin = old_twin.and_then(|twin| remap.get(&twin).copied());
    }

    compacted
}

/// Directed region graph weighted by centroid distance.
fn build_graph(mesh: &HalfEdgeMesh) -> Graph {
    let mut graph = Graph::directed();
    let mut neighborhoods: Vec<SmallVec<[usize; 8]>> = Vec::with_capacity(mesh.polygons().len());

    for (i, polygon) in mesh.polygons().iter().enumerate() {
        let neighbors: SmallVec<[usize; 8]> =
            mesh.neighbors(PolygonId(i as u32)).map(PolygonId::index).collect();

        if !neighbors.is_empty() && !graph.has_node(i) {
            graph.add_node(Node::new(i, polygon.centroid));
        }
        neighborhoods.push(neighbors);
    }

    for (from, neighbors) in neighborhoods.iter().enumerate() {
        for &to in neighbors {
            if from == to || graph.has_edge(from, to) {
                continue;
            }
            let (Some(a), Some(b)) = (graph.node(from), graph.node(to)) else {
                continue;
            };
            let cost = a.position.distance(b.position);
            graph.add_edge(Edge::new(from, to, cost));
        }
    }

    graph
}
