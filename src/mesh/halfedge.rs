//! Half-edge mesh data structure with tombstone deactivation.
//!
//! This module provides a half-edge representation for triangle meshes that
//! supports repeated local mutation: entities are stored in index-addressed
//! arenas and are deactivated rather than removed, so ids stay valid across
//! edge collapses and their exact inverses.
//!
//! # Structure
//!
//! - Each face owns exactly three half-edges, stored inline in the half-edge
//!   arena at indices `3f`, `3f + 1`, `3f + 2`, linked into a `next`/`prev`
//!   3-cycle
//! - Each half-edge knows its **mate** (the opposite half-edge across the
//!   shared edge, invalid on a boundary), its **origin** vertex and its
//!   undirected **edge** record
//! - Each vertex stores one outgoing half-edge used as a traversal seed
//! - Each undirected edge stores up to two half-edge slots; slot 1 is invalid
//!   for boundary edges, slot 0 is never invalid while the edge is active
//!
//! # Boundary Handling
//!
//! There are no dedicated boundary half-edges. A half-edge whose mate is
//! invalid lies on the mesh boundary, and its origin vertex is flagged
//! `is_boundary`. Ring traversals truncate at the boundary and restart in the
//! opposite rotational direction to cover the remaining fan.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Area-weighted average of incident face normals.
    pub normal: Vector3<f64>,

    /// One outgoing half-edge from this vertex, kept pointing into an active
    /// face while the vertex is active.
    pub halfedge: HalfEdgeId,

    /// True if the vertex lies on an open boundary.
    pub is_boundary: bool,

    /// Tombstone bit; a deactivated vertex keeps its slot for exact undo.
    pub is_active: bool,
}

impl Vertex {
    /// Create a new active vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            halfedge: HalfEdgeId::invalid(),
            is_boundary: false,
            is_active: true,
        }
    }
}

/// A half-edge in the mesh.
///
/// The owning face is not stored; it is derived from the arena index, since
/// face `f` owns the half-edges `3f..3f + 3`.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from.
    pub origin: VertexId,

    /// The opposite half-edge across the shared edge.
    /// Invalid for boundary half-edges.
    pub mate: HalfEdgeId,

    /// The next half-edge in the face cycle (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge in the face cycle.
    pub prev: HalfEdgeId,

    /// The undirected edge record this half-edge belongs to.
    pub edge: EdgeId,
}

impl HalfEdge {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            mate: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            edge: EdgeId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.mate.is_valid()
    }
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// Unit face normal.
    pub normal: Vector3<f64>,

    /// Face area (half the cross-product magnitude).
    pub area: f64,

    /// Tombstone bit; deactivated on collapse, reactivated on matching split.
    pub is_active: bool,
}

impl Face {
    /// Create a new active face with geometry still to be computed.
    pub fn new() -> Self {
        Self {
            normal: Vector3::zeros(),
            area: 0.0,
            is_active: true,
        }
    }
}

impl Default for Face {
    fn default() -> Self {
        Self::new()
    }
}

/// An undirected edge record.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// The one or two half-edges over this edge. Slot 0 is never invalid
    /// while the edge is active; slot 1 is invalid for boundary edges.
    pub half: [HalfEdgeId; 2],

    /// Bumped every time the edge's collapse priority is recomputed, so
    /// stale queue entries can be detected lazily.
    pub generation: u64,

    /// Tombstone bit; false once both incident faces are gone.
    pub is_active: bool,
}

impl Edge {
    /// Create a new active edge over the given half-edges.
    pub fn new(he0: HalfEdgeId, he1: HalfEdgeId) -> Self {
        Self {
            half: [he0, he1],
            generation: 0,
            is_active: true,
        }
    }
}

/// A half-edge mesh for triangle meshes under incremental simplification.
///
/// All entity storage is arena-based and never shrinks; `is_active` flags act
/// as tombstones checked by traversals, so a collapse can be undone exactly.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex>,

    /// All half-edges, three consecutive entries per face.
    pub(crate) halfedges: Vec<HalfEdge>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face>,

    /// All undirected edge records.
    pub(crate) edges: Vec<Edge>,
}

impl HalfEdgeMesh {
    // ==================== Accessors ====================

    /// Get the total number of vertices, including deactivated ones.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the total number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the total number of faces, including deactivated ones.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the total number of edge records.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Count the currently active faces.
    pub fn active_face_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_active).count()
    }

    /// Count the currently active vertices.
    pub fn active_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_active).count()
    }

    /// Get a vertex by id.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by id.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by id.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by id.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by id.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get a mutable face by id.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id.index()]
    }

    /// Get an edge by id.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Get a mutable edge by id.
    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    // ==================== Topology Queries ====================

    /// Get the mate (opposite) half-edge; invalid on a boundary.
    #[inline]
    pub fn mate(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).mate
    }

    /// Get the next half-edge in the face cycle.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge in the face cycle.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    ///
    /// Resolved through `next` rather than `mate`, so it also works for
    /// boundary half-edges.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.next(he))
    }

    /// Get the undirected edge record of a half-edge.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId) -> EdgeId {
        self.halfedge(he).edge
    }

    /// Get the face owning a half-edge (derived from the arena layout).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        FaceId::new(he.index() / 3)
    }

    /// Get the `i`-th half-edge of a face (`i` in `0..3`).
    #[inline]
    pub fn face_halfedge(&self, f: FaceId, i: usize) -> HalfEdgeId {
        debug_assert!(i < 3);
        HalfEdgeId::new(f.index() * 3 + i)
    }

    /// Check if an edge lies on the boundary (only one incident face).
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId) -> bool {
        !self.edge(e).half[1].is_valid()
    }

    /// Starting half-edge for a full counter-clockwise fan walk around the
    /// origin of `base`.
    ///
    /// For an interior vertex any outgoing half-edge works; for a boundary
    /// vertex the walk must start at the outgoing boundary half-edge, found
    /// by rotating clockwise (`mate.next`) from `base`.
    pub fn boundary_fan_start(&self, base: HalfEdgeId) -> HalfEdgeId {
        let mut he = base;
        loop {
            let mate = self.mate(he);
            if !mate.is_valid() {
                return he;
            }
            he = self.next(mate);
            if he == base {
                // no boundary found; the caller's boundary flag was stale
                return he;
            }
        }
    }

    /// Starting half-edge for a full fan walk around `v`, honoring its
    /// boundary flag.
    pub fn fan_start(&self, v: VertexId) -> HalfEdgeId {
        let seed = self.vertex(v).halfedge;
        if self.vertex(v).is_boundary {
            self.boundary_fan_start(seed)
        } else {
            seed
        }
    }

    /// Iterate over the outgoing half-edges around the origin of `start`,
    /// rotating counter-clockwise via `prev.mate` and truncating at the
    /// boundary.
    pub fn fan_from(&self, start: HalfEdgeId) -> FanIter<'_> {
        FanIter::new(self, start)
    }

    /// Iterate over the outgoing half-edges around `v`, covering the whole
    /// fan even for boundary vertices.
    pub fn vertex_fan(&self, v: VertexId) -> FanIter<'_> {
        self.fan_from(self.fan_start(v))
    }

    /// Collect the 1-ring vertices around the origin of `start`.
    ///
    /// The walk follows `prev.mate`; when it truncates at the boundary, the
    /// origin of the final `prev` half-edge closes the ring, so the result
    /// covers the full neighborhood either way.
    pub fn ring_vertices(&self, start: HalfEdgeId) -> Vec<VertexId> {
        let mut ring = Vec::new();
        let mut he = start;
        loop {
            ring.push(self.dest(he));
            let hp = self.prev(he);
            let hp_mate = self.mate(hp);
            if !hp_mate.is_valid() {
                ring.push(self.origin(hp));
                break;
            }
            he = hp_mate;
            if he == start {
                break;
            }
        }
        ring
    }

    /// Compute the valence (degree) of a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex_fan(v).count()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge ids.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over the ids of active faces.
    pub fn active_face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.face_ids().filter(|&f| self.face(f).is_active)
    }

    // ==================== Geometry ====================

    /// Get the three vertices of a face in winding order.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        [
            self.origin(self.face_halfedge(f, 0)),
            self.origin(self.face_halfedge(f, 1)),
            self.origin(self.face_halfedge(f, 2)),
        ]
    }

    /// Get the positions of the three vertices of a face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    /// Recompute the normal and area of a face from its current corners.
    ///
    /// The normal of a zero-area face is left as the zero vector.
    pub fn update_face_geometry(&mut self, f: FaceId) {
        let [p0, p1, p2] = self.face_positions(f);
        let n = (p1 - p0).cross(&(p2 - p0));
        let len = n.norm();

        let face = self.face_mut(f);
        face.area = 0.5 * len;
        face.normal = if len != 0.0 { n / len } else { n };
    }

    /// Recompute the normal of a vertex as the area-weighted average of its
    /// incident face normals.
    ///
    /// The ring is visited counter-clockwise from the seed half-edge via
    /// `prev.mate`; when the walk hits a boundary it restarts from the mate
    /// of the seed and rotates the opposite direction to cover the remaining
    /// fan.
    pub fn update_vertex_normal(&mut self, v: VertexId) {
        let seed = self.vertex(v).halfedge;
        if !seed.is_valid() {
            return;
        }

        let mut normal = Vector3::zeros();
        let mut cumulative_area = 0.0;
        let mut hit_boundary = false;

        let mut he = seed;
        loop {
            let face = self.face(self.face_of(he));
            normal += face.normal * face.area;
            cumulative_area += face.area;

            let step = self.mate(self.prev(he));
            if !step.is_valid() {
                hit_boundary = true;
                break;
            }
            he = step;
            if he == seed {
                break;
            }
        }

        if hit_boundary {
            let mut he = self.mate(seed);
            while he.is_valid() {
                let face = self.face(self.face_of(he));
                normal += face.normal * face.area;
                cumulative_area += face.area;

                he = self.mate(self.next(he));
            }
        }

        if cumulative_area != 0.0 {
            normal /= cumulative_area;
        }
        self.vertex_mut(v).normal = normal;
    }

    /// Compute the bounding box of the active vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut active = self.vertices.iter().filter(|v| v.is_active);
        let first = active.next()?;

        let mut min = first.position;
        let mut max = first.position;
        for v in active {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }
        Some((min, max))
    }

    /// Compute the total surface area of the active faces.
    pub fn surface_area(&self) -> f64 {
        self.faces
            .iter()
            .filter(|f| f.is_active)
            .map(|f| f.area)
            .sum()
    }

    /// For every active face, yield its three (normal, position) corner pairs
    /// in winding order. This is the read-only contract a renderer consumes.
    pub fn active_triangles(
        &self,
    ) -> impl Iterator<Item = [(Vector3<f64>, Point3<f64>); 3]> + '_ {
        self.active_face_ids().map(|f| {
            std::array::from_fn(|i| {
                let v = self.origin(self.face_halfedge(f, i));
                (self.vertex(v).normal, self.vertex(v).position)
            })
        })
    }

    // ==================== Validation ====================

    /// Check the structural invariants over all active entities.
    ///
    /// Verifies the face 3-cycles, mate symmetry, edge slot consistency,
    /// vertex seed half-edges, and that no vertex pair is shared by more than
    /// two active faces.
    pub fn validate(&self) -> bool {
        use std::collections::HashMap;

        for f in self.face_ids() {
            if !self.face(f).is_active {
                continue;
            }
            let h0 = self.face_halfedge(f, 0);
            if self.next(self.next(self.next(h0))) != h0 {
                return false;
            }
            for i in 0..3 {
                let he = self.face_halfedge(f, i);
                if !self.vertex(self.origin(he)).is_active {
                    return false;
                }
                let mate = self.mate(he);
                if mate.is_valid() {
                    if self.mate(mate) != he {
                        return false;
                    }
                    if !self.face(self.face_of(mate)).is_active {
                        return false;
                    }
                }
                if !self.edge(self.edge_of(he)).is_active {
                    return false;
                }
            }
        }

        for e in self.edge_ids() {
            let edge = self.edge(e);
            if !edge.is_active {
                continue;
            }
            let [h0, h1] = edge.half;
            if !h0.is_valid() {
                return false;
            }
            if !self.face(self.face_of(h0)).is_active {
                return false;
            }
            if h1.is_valid() {
                // both slots span the same vertex pair, in opposite direction
                if self.origin(h0) != self.dest(h1) || self.origin(h1) != self.dest(h0) {
                    return false;
                }
                if !self.face(self.face_of(h1)).is_active {
                    return false;
                }
            }
        }

        for v in self.vertex_ids() {
            let vertex = self.vertex(v);
            if !vertex.is_active {
                continue;
            }
            let seed = vertex.halfedge;
            if !seed.is_valid() {
                continue; // isolated vertex
            }
            if self.origin(seed) != v {
                return false;
            }
            if !self.face(self.face_of(seed)).is_active {
                return false;
            }
        }

        // manifold: no vertex pair shared by more than two active faces
        let mut pair_count: HashMap<(VertexId, VertexId), usize> = HashMap::new();
        for f in self.active_face_ids() {
            for i in 0..3 {
                let he = self.face_halfedge(f, i);
                let (a, b) = (self.origin(he), self.dest(he));
                let key = if a < b { (a, b) } else { (b, a) };
                *pair_count.entry(key).or_insert(0) += 1;
            }
        }
        pair_count.values().all(|&count| count <= 2)
    }
}

/// Iterator over the outgoing half-edges around a vertex.
///
/// Rotates counter-clockwise via `prev.mate` and stops after the last fan
/// half-edge when the walk truncates at a boundary.
pub struct FanIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> FanIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, start: HalfEdgeId) -> Self {
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a> Iterator for FanIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        let step = self.mesh.mate(self.mesh.prev(result));
        if !step.is_valid() || step == self.start {
            self.done = true;
        }
        self.current = step;

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use nalgebra::Point3;

    fn tetrahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn two_triangles() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_tetrahedron_topology() {
        let mesh = tetrahedron();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_halfedges(), 12);
        assert_eq!(mesh.num_edges(), 6);
        assert!(mesh.validate());

        for v in mesh.vertex_ids() {
            assert!(!mesh.vertex(v).is_boundary);
            assert_eq!(mesh.valence(v), 3);
        }
    }

    #[test]
    fn test_boundary_flags() {
        let mesh = two_triangles();
        assert_eq!(mesh.num_edges(), 5);
        assert!(mesh.validate());

        // every vertex of an open fan is on the boundary
        for v in mesh.vertex_ids() {
            assert!(mesh.vertex(v).is_boundary);
        }

        // the shared edge (0, 1) is interior, all others boundary
        let interior: Vec<_> = mesh
            .edge_ids()
            .filter(|&e| !mesh.is_boundary_edge(e))
            .collect();
        assert_eq!(interior.len(), 1);
    }

    #[test]
    fn test_fan_covers_boundary_vertex() {
        let mesh = two_triangles();
        // vertex 0 and 1 touch both triangles
        assert_eq!(mesh.vertex_fan(VertexId::new(0)).count(), 2);
        assert_eq!(mesh.vertex_fan(VertexId::new(1)).count(), 2);
        // vertex 2 and 3 touch one
        assert_eq!(mesh.vertex_fan(VertexId::new(2)).count(), 1);
        assert_eq!(mesh.vertex_fan(VertexId::new(3)).count(), 1);
    }

    #[test]
    fn test_ring_vertices() {
        let mesh = two_triangles();
        let v1 = VertexId::new(1);
        let ring = mesh.ring_vertices(mesh.fan_start(v1));
        // neighbors of vertex 1 are 0, 2 and 3
        assert_eq!(ring.len(), 3);
        for v in [0, 2, 3] {
            assert!(ring.contains(&VertexId::new(v)));
        }
    }

    #[test]
    fn test_face_geometry() {
        let mesh = two_triangles();
        let f = FaceId::new(0);
        assert!((mesh.face(f).area - 0.5).abs() < 1e-12);
        assert!((mesh.face(f).normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_vertex_normal_flat() {
        let mesh = two_triangles();
        // all faces are coplanar in z = 0, so every vertex normal is +z
        for v in mesh.vertex_ids() {
            assert!((mesh.vertex(v).normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_active_triangles() {
        let mesh = tetrahedron();
        assert_eq!(mesh.active_triangles().count(), 4);

        let first = mesh.active_triangles().next().unwrap();
        assert_eq!(first[0].1, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_dest_through_next() {
        let mesh = two_triangles();
        for he in mesh.halfedge_ids() {
            let mate = mesh.mate(he);
            if mate.is_valid() {
                assert_eq!(mesh.dest(he), mesh.origin(mate));
                assert_eq!(mesh.mate(mate), he);
            }
        }
    }
}
