//! Incremental mesh simplification with exact undo.
//!
//! This module implements quadric-error-metric edge collapse (Garland &
//! Heckbert, 1997) on the half-edge structure, driven one operation at a
//! time. Every collapse records enough state to be undone exactly by a
//! vertex split, so the level of detail can be moved up and down
//! deterministically.
//!
//! # Scheduling
//!
//! Candidate collapses live in a min-heap keyed by quadric cost. Entries are
//! never removed eagerly; instead each entry carries the generation of its
//! edge at push time, and entries whose generation no longer matches are
//! skipped on pop. Candidates that fail the manifold link condition are
//! parked on a suspended list and retried once the neighborhood has changed.
//! Edges re-created by a split go onto a re-add queue that outranks
//! everything else, so redoing a collapse after an undo replays the exact
//! same operation.
//!
//! # Example
//!
//! ```
//! use whittle::algo::simplify::Simplifier;
//! use whittle::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let mut simplifier = Simplifier::new(mesh);
//! assert!(simplifier.collapse());
//! assert_eq!(simplifier.active_face_count(), 2);
//!
//! // undo restores the tetrahedron exactly
//! assert!(simplifier.split());
//! assert_eq!(simplifier.active_face_count(), 4);
//! ```
//!
//! # References
//!
//! - Garland, M. & Heckbert, P. (1997). "Surface Simplification Using
//!   Quadric Error Metrics." SIGGRAPH '97.

mod collapse;
mod quadric;

pub use quadric::Quadric;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::Point3;

use crate::mesh::{EdgeId, HalfEdgeId, HalfEdgeMesh, VertexId};

/// Fixed cost added to every edge touching a boundary vertex, discouraging
/// boundary erosion.
const BOUNDARY_COST: f64 = 1.0;

/// Shrink factor applied to the face target per level-of-detail step.
const LOD_DECAY: f64 = 0.95;

/// A scheduled edge collapse: the edge, where its endpoints merge, and what
/// that merge costs.
#[derive(Debug, Clone)]
struct CollapseTarget {
    /// The edge to collapse.
    edge: EdgeId,

    /// Merged vertex position minimizing the combined quadric.
    position: Point3<f64>,

    /// Quadric error of the merge.
    cost: f64,

    /// The edge's generation when this target was pushed; a mismatch means
    /// the target was superseded by a later recomputation.
    generation: u64,
}

// Min-heap ordering on cost
impl PartialEq for CollapseTarget {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for CollapseTarget {}

impl PartialOrd for CollapseTarget {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollapseTarget {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

/// Undo record for one collapse, pushed when the collapse happens and
/// consumed by the matching split.
#[derive(Debug, Clone)]
struct SplitRecord {
    /// The collapsed edge.
    edge: EdgeId,

    /// Position of the surviving vertex before it moved to the merged
    /// position.
    prior_position: Point3<f64>,

    /// Boundary flag of the surviving vertex before the collapse.
    prior_boundary: bool,

    /// The half-edges that were retargeted from the removed vertex to the
    /// survivor; the split points them back.
    rewired: Vec<HalfEdgeId>,
}

/// An explicit control request for [`Simplifier::apply`].
///
/// Viewer-level toggles map to these requests instead of shared flags, so a
/// caller drives the engine through a single entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Collapse the cheapest valid edge.
    Collapse,

    /// Undo the most recent collapse.
    Split,

    /// Drive the active face count toward the given level-of-detail step.
    SetLevel(u32),
}

/// The simplification engine.
///
/// Owns the mesh, the per-vertex quadrics and all scheduling state. All
/// operations are synchronous and run to completion; a single instance must
/// not be shared across threads mutably.
pub struct Simplifier {
    mesh: HalfEdgeMesh,

    /// Per-vertex error quadrics, parallel to the vertex arena.
    quadrics: Vec<Quadric>,

    /// Min-heap of collapse candidates, invalidated lazily by generation.
    heap: BinaryHeap<CollapseTarget>,

    /// Candidates that failed the link condition, retried before the heap.
    suspended: Vec<CollapseTarget>,

    /// Targets re-created by splits; replayed with absolute priority.
    readded: Vec<CollapseTarget>,

    /// Undo stack, one record per collapse.
    splits: Vec<SplitRecord>,

    /// Source of generation ids for pushed targets.
    generation_base: u64,

    active_faces: usize,
    initial_faces: usize,

    /// Set when a degenerate collapse left surrounding normals stale.
    normals_dirty: bool,
}

impl Simplifier {
    /// Create a simplifier over a freshly built mesh: seeds every vertex
    /// quadric and pushes an initial collapse target for every edge.
    pub fn new(mesh: HalfEdgeMesh) -> Self {
        let active_faces = mesh.active_face_count();
        let initial_faces = mesh.num_faces();
        let quadrics = vec![Quadric::zero(); mesh.num_vertices()];

        let mut simplifier = Self {
            mesh,
            quadrics,
            heap: BinaryHeap::new(),
            suspended: Vec::new(),
            readded: Vec::new(),
            splits: Vec::new(),
            generation_base: 0,
            active_faces,
            initial_faces,
            normals_dirty: false,
        };

        simplifier.assign_initial_quadrics();
        for ei in 0..simplifier.mesh.num_edges() {
            let e = EdgeId::new(ei);
            if simplifier.mesh.edge(e).is_active {
                simplifier.push_cost(e);
            }
        }
        simplifier
    }

    // ==================== Accessors ====================

    /// Read-only access to the mesh.
    #[inline]
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// Consume the simplifier and return the mesh.
    pub fn into_mesh(self) -> HalfEdgeMesh {
        self.mesh
    }

    /// Number of currently active faces.
    #[inline]
    pub fn active_face_count(&self) -> usize {
        self.active_faces
    }

    /// Face count of the mesh as loaded; the reference for level-of-detail
    /// targets.
    #[inline]
    pub fn initial_face_count(&self) -> usize {
        self.initial_faces
    }

    /// Depth of the undo stack (number of collapses that can be split back).
    #[inline]
    pub fn undo_depth(&self) -> usize {
        self.splits.len()
    }

    /// True if a degenerate collapse left some normals around the surviving
    /// vertex stale.
    #[inline]
    pub fn normals_dirty(&self) -> bool {
        self.normals_dirty
    }

    // ==================== Quadric seeding ====================

    /// Accumulate the initial error quadric of every vertex from its
    /// incident face planes, plus two synthetic fold planes for boundary
    /// vertices.
    fn assign_initial_quadrics(&mut self) {
        for vi in 0..self.mesh.num_vertices() {
            let v = VertexId::new(vi);
            let vertex = self.mesh.vertex(v);
            if !vertex.is_active || !vertex.halfedge.is_valid() {
                self.quadrics[vi] = Quadric::zero();
                continue;
            }

            let is_boundary = vertex.is_boundary;
            let start = self.mesh.fan_start(v);
            let mut end = HalfEdgeId::invalid();

            let mut q = Quadric::zero();
            let mut he = start;
            loop {
                let f = self.mesh.face_of(he);
                let n = self.mesh.face(f).normal;
                let p0 = self.mesh.position(self.mesh.origin(self.mesh.face_halfedge(f, 0)));
                q += Quadric::from_plane(n, -n.dot(&p0.coords));

                let hp = self.mesh.prev(he);
                let step = self.mesh.mate(hp);
                if is_boundary && !step.is_valid() {
                    end = hp;
                    break;
                }
                if !step.is_valid() || step == start {
                    break;
                }
                he = step;
            }

            if is_boundary && end.is_valid() {
                // Fold planes: perpendicular to the incident face, containing
                // the boundary edge, one for each end of the fan. They
                // penalize collapses that would deform the silhouette.
                for bhe in [start, end] {
                    let origin = *self.mesh.position(self.mesh.origin(bhe));
                    let edge_vector = self.mesh.position(self.mesh.dest(bhe)) - origin;
                    let face_normal = self.mesh.face(self.mesh.face_of(bhe)).normal;

                    let mut pseudo = edge_vector.cross(&face_normal);
                    if let Some(unit) = pseudo.try_normalize(0.0) {
                        pseudo = unit;
                    }
                    q += Quadric::from_plane(pseudo, -pseudo.dot(&origin.coords));
                }
            }

            self.quadrics[vi] = q;
        }
    }

    // ==================== Cost computation ====================

    /// Recompute the optimal merge position and cost of an edge and push it
    /// as a fresh target, bumping the edge's generation so older targets for
    /// this edge become stale.
    pub(crate) fn push_cost(&mut self, e: EdgeId) {
        let he = self.mesh.edge(e).half[0];
        let v0 = self.mesh.origin(he);
        let v1 = self.mesh.dest(he);

        let combined = self.quadrics[v0.index()] + self.quadrics[v1.index()];

        let (mut cost, position) = match combined.minimizer() {
            Some(p) => (combined.evaluate(&p), p),
            None => {
                // Singular system: the neighborhood is flat, every point in
                // it is optimal. Keep the first endpoint's position when it
                // sits on a boundary so the silhouette does not move.
                let p = if self.mesh.vertex(v0).is_boundary {
                    self.mesh.vertex(v0).position
                } else {
                    self.mesh.vertex(v1).position
                };
                (0.0, p)
            }
        };

        if self.mesh.vertex(v0).is_boundary || self.mesh.vertex(v1).is_boundary {
            cost += BOUNDARY_COST;
        }

        let generation = self.generation_base;
        self.generation_base += 1;
        self.mesh.edge_mut(e).generation = generation;

        self.heap.push(CollapseTarget {
            edge: e,
            position,
            cost,
            generation,
        });
    }

    fn is_stale(&self, target: &CollapseTarget) -> bool {
        let edge = self.mesh.edge(target.edge);
        !edge.is_active || target.generation != edge.generation
    }

    // ==================== Collapse scheduling ====================

    /// Collapse the best available edge.
    ///
    /// Priority order: a target re-added by a split replays first and
    /// unconditionally (the topology it needs was just restored verbatim);
    /// then suspended targets whose link condition now passes; then the
    /// cheapest valid heap entry. Returns `false` once fewer than 3 active
    /// faces remain or no valid candidate exists anywhere.
    pub fn collapse(&mut self) -> bool {
        if self.active_faces < 3 {
            return false;
        }

        if let Some(target) = self.readded.pop() {
            self.remove_edge(target.edge, target.position, false);
            return true;
        }

        let mut i = 0;
        while i < self.suspended.len() {
            if self.is_stale(&self.suspended[i]) {
                self.suspended.remove(i);
                continue;
            }
            if self.link_condition_holds(self.suspended[i].edge) {
                let target = self.suspended.remove(i);
                self.remove_edge(target.edge, target.position, true);
                return true;
            }
            i += 1;
        }

        while let Some(target) = self.heap.pop() {
            if self.is_stale(&target) {
                continue;
            }
            if self.link_condition_holds(target.edge) {
                self.remove_edge(target.edge, target.position, true);
                return true;
            }
            self.suspended.push(target);
        }

        false
    }

    /// Manifold link condition: collapsing the edge must not create a fin.
    ///
    /// Every vertex adjacent to both endpoints has to be one of the (at most
    /// two) opposite vertices of the faces bordering the edge; any other
    /// shared neighbor would leave two faces sharing two edges after the
    /// collapse.
    fn link_condition_holds(&self, e: EdgeId) -> bool {
        let mesh = &self.mesh;
        let hec = mesh.edge(e).half[0];
        let v0 = mesh.origin(hec);
        let v1 = mesh.dest(hec);

        let start0 = if mesh.vertex(v0).is_boundary {
            mesh.boundary_fan_start(hec)
        } else {
            hec
        };
        let hen = mesh.next(hec);
        let start1 = if mesh.vertex(v1).is_boundary {
            mesh.boundary_fan_start(hen)
        } else {
            hen
        };

        let ring0 = mesh.ring_vertices(start0);
        let ring1 = mesh.ring_vertices(start1);

        let opposite0 = mesh.origin(mesh.prev(hec));
        let mate = mesh.mate(hec);
        let opposite1 = if mate.is_valid() {
            Some(mesh.origin(mesh.prev(mate)))
        } else {
            None
        };

        for &common in &ring0 {
            if !ring1.contains(&common) {
                continue;
            }
            if common == opposite0 || opposite1 == Some(common) {
                continue;
            }
            return false;
        }
        true
    }

    // ==================== Level of detail ====================

    /// Drive the active face count toward `initial_faces * 0.95^step`.
    ///
    /// Collapses while above the target (stopping early when no candidate
    /// remains) or splits while below it (stopping when the undo stack is
    /// exhausted). Returns true if any operation was performed. Only
    /// sequentially adjacent steps are guaranteed monotonic.
    pub fn advance(&mut self, step: u32) -> bool {
        let target = (self.initial_faces as f64 * LOD_DECAY.powi(step as i32)) as usize;
        let before = self.active_faces;

        if target < self.active_faces {
            while target < self.active_faces {
                if !self.collapse() {
                    break;
                }
            }
        } else if target > self.active_faces {
            while target > self.active_faces {
                if !self.split() {
                    break;
                }
            }
        }

        self.active_faces != before
    }

    /// Dispatch an explicit control request.
    pub fn apply(&mut self, request: Request) -> bool {
        match request {
            Request::Collapse => self.collapse(),
            Request::Split => self.split(),
            Request::SetLevel(step) => self.advance(step),
        }
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

    fn octahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn cube() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn grid(n: usize) -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }

        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;

                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn snapshot(s: &Simplifier) -> (Vec<Point3<f64>>, Vec<bool>, Vec<bool>, Vec<bool>) {
        let mesh = s.mesh();
        (
            mesh.vertex_ids().map(|v| mesh.vertex(v).position).collect(),
            mesh.vertex_ids().map(|v| mesh.vertex(v).is_boundary).collect(),
            mesh.vertex_ids().map(|v| mesh.vertex(v).is_active).collect(),
            mesh.face_ids().map(|f| mesh.face(f).is_active).collect(),
        )
    }

    #[test]
    fn test_cube_collapse_then_split() {
        let mut s = Simplifier::new(cube());
        assert_eq!(s.active_face_count(), 12);

        let before = snapshot(&s);

        assert!(s.collapse());
        assert_eq!(s.active_face_count(), 10);
        assert_eq!(s.undo_depth(), 1);
        assert!(s.mesh().validate());

        assert!(s.split());
        assert_eq!(s.active_face_count(), 12);
        assert_eq!(s.undo_depth(), 0);
        assert!(s.mesh().validate());

        // the round trip restores positions, flags and activity exactly
        let after = snapshot(&s);
        assert_eq!(before, after);
    }

    #[test]
    fn test_split_restores_edge_records() {
        let mut s = Simplifier::new(cube());

        let edges_before: Vec<_> = s
            .mesh()
            .edge_ids()
            .map(|e| (s.mesh().edge(e).half, s.mesh().edge(e).is_active))
            .collect();
        let mates_before: Vec<_> = s.mesh().halfedge_ids().map(|h| s.mesh().mate(h)).collect();

        assert!(s.collapse());
        assert!(s.split());

        let edges_after: Vec<_> = s
            .mesh()
            .edge_ids()
            .map(|e| (s.mesh().edge(e).half, s.mesh().edge(e).is_active))
            .collect();
        let mates_after: Vec<_> = s.mesh().halfedge_ids().map(|h| s.mesh().mate(h)).collect();

        assert_eq!(edges_before, edges_after);
        assert_eq!(mates_before, mates_after);
    }

    #[test]
    fn test_split_without_collapse_is_noop() {
        let mut s = Simplifier::new(cube());
        assert!(!s.split());
        assert_eq!(s.active_face_count(), 12);
    }

    #[test]
    fn test_replay_after_split_is_deterministic() {
        let mut s = Simplifier::new(cube());

        assert!(s.collapse());
        let bitmap: Vec<bool> = s.mesh().face_ids().map(|f| s.mesh().face(f).is_active).collect();
        let positions: Vec<_> = s.mesh().vertex_ids().map(|v| s.mesh().vertex(v).position).collect();

        assert!(s.split());
        assert!(s.collapse());

        let replayed: Vec<bool> = s.mesh().face_ids().map(|f| s.mesh().face(f).is_active).collect();
        let replayed_positions: Vec<_> =
            s.mesh().vertex_ids().map(|v| s.mesh().vertex(v).position).collect();
        assert_eq!(bitmap, replayed);
        assert_eq!(positions, replayed_positions);
    }

    #[test]
    fn test_quadrics_merge_on_collapse() {
        let mut s = Simplifier::new(cube());
        let before = s.quadrics.clone();
        let active_before: Vec<bool> =
            s.mesh().vertex_ids().map(|v| s.mesh().vertex(v).is_active).collect();

        assert!(s.collapse());

        let removed = s
            .mesh()
            .vertex_ids()
            .find(|v| active_before[v.index()] && !s.mesh().vertex(*v).is_active)
            .unwrap();
        let survivor = s
            .mesh()
            .vertex_ids()
            .find(|v| {
                s.mesh().vertex(*v).is_active && s.quadrics[v.index()] != before[v.index()]
            })
            .unwrap();

        let merged = before[survivor.index()] + before[removed.index()];
        assert_eq!(s.quadrics[survivor.index()], merged);
    }

    #[test]
    fn test_collapse_stops_below_three_faces() {
        let mut s = Simplifier::new(tetrahedron());
        assert!(s.collapse());
        assert_eq!(s.active_face_count(), 2);
        // fewer than 3 active faces: no further collapse
        assert!(!s.collapse());
    }

    #[test]
    fn test_flat_region_uses_singular_fallback() {
        // interior edges of a flat grid have a singular combined quadric;
        // the merged vertex falls back onto an existing grid position
        let n = 3;
        let mut s = Simplifier::new(grid(n));
        let originals: Vec<Point3<f64>> =
            s.mesh().vertex_ids().map(|v| s.mesh().vertex(v).position).collect();

        assert!(s.collapse());
        assert!(s.mesh().validate());

        for v in s.mesh().vertex_ids() {
            if s.mesh().vertex(v).is_active {
                let p = s.mesh().vertex(v).position;
                assert!(originals.iter().any(|o| (o - p).norm() < 1e-12));
            }
        }
    }

    #[test]
    fn test_boundary_roundtrip() {
        let mut s = Simplifier::new(grid(2));
        let before = snapshot(&s);

        assert!(s.collapse());
        assert!(s.mesh().validate());
        assert!(s.split());
        assert!(s.mesh().validate());

        assert_eq!(before, snapshot(&s));
    }

    #[test]
    fn test_multi_level_undo_is_lifo_exact() {
        let mut s = Simplifier::new(octahedron());
        let initial = snapshot(&s);

        assert!(s.collapse());
        let after_one = snapshot(&s);
        assert!(s.collapse());
        assert_eq!(s.active_face_count(), 4);
        assert!(s.mesh().validate());

        assert!(s.split());
        assert_eq!(snapshot(&s), after_one);
        assert!(s.split());
        assert_eq!(snapshot(&s), initial);
        assert!(s.mesh().validate());
    }

    #[test]
    fn test_advance_zero_is_noop() {
        let mut s = Simplifier::new(cube());
        assert!(!s.advance(0));
        assert_eq!(s.active_face_count(), 12);
        assert_eq!(s.undo_depth(), 0);
    }

    #[test]
    fn test_advance_monotonic_then_reversible() {
        let mut s = Simplifier::new(grid(4));
        let initial = s.active_face_count();

        let mut previous = initial;
        for step in 0..=8 {
            s.advance(step);
            assert!(s.active_face_count() <= previous);
            assert!(s.mesh().validate());
            previous = s.active_face_count();
        }
        assert!(s.active_face_count() < initial);

        // walking the steps back down splits the mesh back up
        for step in (0..8).rev() {
            s.advance(step);
        }
        assert_eq!(s.active_face_count(), initial);
    }

    #[test]
    fn test_apply_requests() {
        let mut s = Simplifier::new(cube());
        assert!(s.apply(Request::Collapse));
        assert_eq!(s.active_face_count(), 10);
        assert!(s.apply(Request::Split));
        assert_eq!(s.active_face_count(), 12);
        assert!(!s.apply(Request::SetLevel(0)));
    }

    #[test]
    fn test_link_condition_rejects_fin() {
        // two triangles glued along every vertex pair of a narrow strip:
        // collapsing the center edge of a 4-face band around two triangles
        // would create a fin. Build a double pyramid sharing a rim of 3
        // vertices; collapsing a rim edge must be rejected.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.3, 1.0),
            Point3::new(0.5, 0.3, -1.0),
        ];
        let faces = vec![
            [0, 1, 3],
            [1, 2, 3],
            [2, 0, 3],
            [1, 0, 4],
            [2, 1, 4],
            [0, 2, 4],
        ];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();
        let mut s = Simplifier::new(mesh);

        // rim edges (0,1), (1,2), (2,0) all fail the link condition: apex
        // vertices 3 and 4 are adjacent to both endpoints but only one of
        // them is an opposite vertex of the bordering faces. Apex edges can
        // collapse.
        for e in s.mesh.edge_ids() {
            let he = s.mesh.edge(e).half[0];
            let pair = (s.mesh.origin(he).index(), s.mesh.dest(he).index());
            let rim = |v: usize| v < 3;
            if rim(pair.0) && rim(pair.1) {
                assert!(!s.link_condition_holds(e), "rim edge {:?} accepted", pair);
            } else {
                assert!(s.link_condition_holds(e), "apex edge {:?} rejected", pair);
            }
        }
    }

    #[test]
    fn test_boundary_cost_penalty() {
        // every edge of an open grid touches the boundary except the four
        // edges between interior vertices of grid(3)
        let s = Simplifier::new(grid(3));
        let interior = |v: VertexId| !s.mesh.vertex(v).is_boundary;

        for target in s.heap.iter() {
            let he = s.mesh.edge(target.edge).half[0];
            let v0 = s.mesh.origin(he);
            let v1 = s.mesh.dest(he);
            if interior(v0) && interior(v1) {
                assert!(target.cost < BOUNDARY_COST);
            } else {
                assert!(target.cost >= BOUNDARY_COST);
            }
        }
    }
}
