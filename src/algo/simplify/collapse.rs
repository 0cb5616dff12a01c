//! Edge collapse surgery and its exact inverse.
//!
//! A collapse merges the origin of an edge into its destination: the one or
//! two bordering faces are tombstoned, the half-edges leaving the removed
//! vertex are retargeted to the survivor, and the mate and edge-slot links of
//! the two flanking edge pairs are rewired so each pair collapses into a
//! single edge record. Everything needed to undo the operation is pushed onto
//! the undo stack first, so a vertex split can restore the exact prior state
//! of the most recent collapse.

use nalgebra::Point3;

use super::{CollapseTarget, Simplifier, SplitRecord};
use crate::mesh::{EdgeId, FaceId, HalfEdgeId};

impl Simplifier {
    /// Restore the slot invariant after a slot was overwritten: slot 0 must
    /// stay valid while the edge is active; an edge with no half-edges left
    /// is dead.
    fn canonicalize_edge(&mut self, e: EdgeId) {
        let edge = self.mesh.edge_mut(e);
        if !edge.half[0].is_valid() {
            if edge.half[1].is_valid() {
                edge.half.swap(0, 1);
            } else {
                edge.is_active = false;
            }
        }
    }

    /// Collapse `e`, moving the surviving vertex to `position`.
    ///
    /// `is_first` is false when replaying a collapse that was undone by a
    /// split: a replay must not merge quadrics or recompute ring costs
    /// again, since the first run already did both.
    pub(crate) fn remove_edge(&mut self, e: EdgeId, position: Point3<f64>, is_first: bool) {
        let hec = self.mesh.edge(e).half[0];
        let v0 = self.mesh.origin(hec);
        let v1 = self.mesh.dest(hec);

        // tombstone the bordering faces
        let f0 = self.mesh.face_of(hec);
        self.mesh.face_mut(f0).is_active = false;
        self.active_faces -= 1;

        let mate_c = self.mesh.mate(hec);
        if mate_c.is_valid() {
            let f1 = self.mesh.face_of(mate_c);
            self.mesh.face_mut(f1).is_active = false;
            self.active_faces -= 1;
        }

        let mut record = SplitRecord {
            edge: e,
            prior_position: self.mesh.vertex(v1).position,
            prior_boundary: self.mesh.vertex(v1).is_boundary,
            rewired: Vec::new(),
        };

        // fan walks run on the still-unrepaired connectivity and therefore
        // cover the tombstoned faces too; the survivor reseeds from the
        // first face of this set that is still active afterwards
        let start0 = if self.mesh.vertex(v0).is_boundary {
            self.mesh.boundary_fan_start(hec)
        } else {
            hec
        };
        let hen = self.mesh.next(hec);
        let start1 = if self.mesh.vertex(v1).is_boundary {
            self.mesh.boundary_fan_start(hen)
        } else {
            hen
        };

        let fan0: Vec<HalfEdgeId> = self.mesh.fan_from(start0).collect();
        let fan1: Vec<HalfEdgeId> = self.mesh.fan_from(start1).collect();
        let mut incident_faces: Vec<FaceId> =
            Vec::with_capacity(fan0.len() + fan1.len());
        incident_faces.extend(fan0.iter().map(|&he| self.mesh.face_of(he)));
        incident_faces.extend(fan1.iter().map(|&he| self.mesh.face_of(he)));

        // retarget the half-edges of surviving faces from v0 to v1; the
        // tombstoned faces keep pointing at v0, which is what lets a split
        // recover it
        for &he in &fan0 {
            if self.mesh.face(self.mesh.face_of(he)).is_active {
                self.mesh.halfedge_mut(he).origin = v1;
                record.rewired.push(he);
            }
        }
        self.mesh.vertex_mut(v0).is_active = false;

        self.mesh.vertex_mut(v1).position = position;
        if is_first {
            let removed = self.quadrics[v0.index()];
            self.quadrics[v1.index()] += removed;
        }

        self.splits.push(record);

        // repair mates and edge records on the hec side: the edges flanking
        // the collapsed triangle merge, with the edge incident to the
        // survivor absorbing the other's outside half-edge
        self.mesh.edge_mut(e).is_active = false;

        let hep = self.mesh.prev(hec);
        let hen_mate = self.mesh.mate(hen);
        let hep_mate = self.mesh.mate(hep);

        if hen_mate.is_valid() {
            self.mesh.halfedge_mut(hen_mate).mate = hep_mate;
        }
        if hep_mate.is_valid() {
            self.mesh.halfedge_mut(hep_mate).mate = hen_mate;
        }

        let e_prev = self.mesh.edge_of(hep);
        self.mesh.edge_mut(e_prev).is_active = false;

        let e_next = self.mesh.edge_of(hen);
        let slot = if self.mesh.edge(e_next).half[0] == hen { 0 } else { 1 };
        self.mesh.edge_mut(e_next).half[slot] = hep_mate;
        self.canonicalize_edge(e_next);
        if hep_mate.is_valid() {
            self.mesh.halfedge_mut(hep_mate).edge = e_next;
        }

        // same repair on the mate side, roles mirrored
        if mate_c.is_valid() {
            let m_hen = self.mesh.next(mate_c);
            let m_hep = self.mesh.prev(mate_c);
            let m_hen_mate = self.mesh.mate(m_hen);
            let m_hep_mate = self.mesh.mate(m_hep);

            if m_hen_mate.is_valid() {
                self.mesh.halfedge_mut(m_hen_mate).mate = m_hep_mate;
            }
            if m_hep_mate.is_valid() {
                self.mesh.halfedge_mut(m_hep_mate).mate = m_hen_mate;
            }

            let e_mnext = self.mesh.edge_of(m_hen);
            self.mesh.edge_mut(e_mnext).is_active = false;

            let e_mprev = self.mesh.edge_of(m_hep);
            let slot = if self.mesh.edge(e_mprev).half[0] == m_hep { 0 } else { 1 };
            self.mesh.edge_mut(e_mprev).half[slot] = m_hen_mate;
            self.canonicalize_edge(e_mprev);
            if m_hen_mate.is_valid() {
                self.mesh.halfedge_mut(m_hen_mate).edge = e_mprev;
            }
        }

        // both repaired edges dead means the local patch vanished entirely;
        // surrounding normals are left stale and flagged
        let mate_side_gone = !mate_c.is_valid() || {
            let e_mprev = self.mesh.edge_of(self.mesh.prev(mate_c));
            !self.mesh.edge(e_mprev).is_active
        };
        if !self.mesh.edge(e_next).is_active && mate_side_gone {
            self.normals_dirty = true;
            return;
        }

        if self.mesh.vertex(v0).is_boundary {
            self.mesh.vertex_mut(v1).is_boundary = true;
        }

        // reseed the survivor from the first surviving incident face
        'reseed: for &f in &incident_faces {
            if self.mesh.face(f).is_active {
                for i in 0..3 {
                    let he = self.mesh.face_halfedge(f, i);
                    if self.mesh.origin(he) == v1 {
                        self.mesh.vertex_mut(v1).halfedge = he;
                        break;
                    }
                }
                break 'reseed;
            }
        }

        // refresh collapse costs, face geometry and seed half-edges over the
        // survivor's new ring
        let start = self.mesh.fan_start(v1);
        let mut he = start;
        loop {
            if is_first {
                let ring_edge = self.mesh.edge_of(he);
                self.push_cost(ring_edge);
            }
            let f = self.mesh.face_of(he);
            self.mesh.update_face_geometry(f);

            let hn = self.mesh.next(he);
            let hn_origin = self.mesh.origin(hn);
            self.mesh.vertex_mut(hn_origin).halfedge = hn;

            let hp = self.mesh.prev(he);
            let hp_mate = self.mesh.mate(hp);
            if !hp_mate.is_valid() {
                if is_first {
                    let rim_edge = self.mesh.edge_of(hp);
                    self.push_cost(rim_edge);
                }
                let hp_origin = self.mesh.origin(hp);
                self.mesh.vertex_mut(hp_origin).halfedge = hp;
                break;
            }
            he = hp_mate;
            if he == start {
                break;
            }
        }

        // vertex normals over the same ring
        self.mesh.update_vertex_normal(v1);
        let mut he = start;
        loop {
            let hn_origin = self.mesh.origin(self.mesh.next(he));
            self.mesh.update_vertex_normal(hn_origin);

            let hp = self.mesh.prev(he);
            let hp_mate = self.mesh.mate(hp);
            if !hp_mate.is_valid() {
                let hp_origin = self.mesh.origin(hp);
                self.mesh.update_vertex_normal(hp_origin);
                break;
            }
            he = hp_mate;
            if he == start {
                break;
            }
        }
    }

    /// Undo the most recent collapse (vertex split).
    ///
    /// Restores the removed vertex, the tombstoned faces and edges, the mate
    /// and slot links, and the survivor's original position and boundary
    /// flag. The undone edge is pushed onto the re-add queue with its merged
    /// position so the next fresh collapse replays the same operation
    /// deterministically. Returns `false` if the undo stack is empty.
    pub fn split(&mut self) -> bool {
        let Some(record) = self.splits.pop() else {
            return false;
        };

        let e = record.edge;
        let hec = self.mesh.edge(e).half[0];
        let v0 = self.mesh.origin(hec);
        let v1 = self.mesh.dest(hec);

        // the merged position is about to be overwritten; park it on the
        // re-add queue so redoing the collapse lands on the same geometry
        self.readded.push(CollapseTarget {
            edge: e,
            position: self.mesh.vertex(v1).position,
            cost: -1.0,
            generation: 0,
        });

        self.mesh.vertex_mut(v1).position = record.prior_position;
        self.mesh.vertex_mut(v1).is_boundary = record.prior_boundary;
        self.mesh.vertex_mut(v0).is_active = true;

        self.mesh.edge_mut(e).is_active = true;

        // f0 side: revive the face, re-link mates, give hen back its slot in
        // the absorbed edge and detach hep's mate from it
        let f0 = self.mesh.face_of(hec);
        self.mesh.face_mut(f0).is_active = true;
        self.active_faces += 1;

        let hen = self.mesh.next(hec);
        let hep = self.mesh.prev(hec);
        let hen_mate = self.mesh.mate(hen);
        let hep_mate = self.mesh.mate(hep);

        if hen_mate.is_valid() {
            self.mesh.halfedge_mut(hen_mate).mate = hen;
        }
        if hep_mate.is_valid() {
            self.mesh.halfedge_mut(hep_mate).mate = hep;
        }

        let e_prev = self.mesh.edge_of(hep);
        self.mesh.edge_mut(e_prev).is_active = true;
        if hep_mate.is_valid() {
            self.mesh.halfedge_mut(hep_mate).edge = e_prev;
        }

        let e_next = self.mesh.edge_of(hen);
        self.mesh.edge_mut(e_next).is_active = true;
        if self.mesh.edge(e_next).half[0] == hen_mate {
            self.mesh.edge_mut(e_next).half[1] = hen;
        } else {
            self.mesh.edge_mut(e_next).half[0] = hen;
        }
        self.canonicalize_edge(e_next);

        for i in 0..3 {
            let he = self.mesh.face_halfedge(f0, i);
            let origin = self.mesh.origin(he);
            self.mesh.vertex_mut(origin).halfedge = he;
        }

        // mate side, roles mirrored
        let mate_c = self.mesh.mate(hec);
        if mate_c.is_valid() {
            let f1 = self.mesh.face_of(mate_c);
            self.mesh.face_mut(f1).is_active = true;
            self.active_faces += 1;

            let m_hen = self.mesh.next(mate_c);
            let m_hep = self.mesh.prev(mate_c);
            let m_hen_mate = self.mesh.mate(m_hen);
            let m_hep_mate = self.mesh.mate(m_hep);

            if m_hen_mate.is_valid() {
                self.mesh.halfedge_mut(m_hen_mate).mate = m_hen;
            }
            if m_hep_mate.is_valid() {
                self.mesh.halfedge_mut(m_hep_mate).mate = m_hep;
            }

            let e_mnext = self.mesh.edge_of(m_hen);
            self.mesh.edge_mut(e_mnext).is_active = true;
            if m_hen_mate.is_valid() {
                self.mesh.halfedge_mut(m_hen_mate).edge = e_mnext;
            }

            let e_mprev = self.mesh.edge_of(m_hep);
            self.mesh.edge_mut(e_mprev).is_active = true;
            if self.mesh.edge(e_mprev).half[0] == m_hep_mate {
                self.mesh.edge_mut(e_mprev).half[1] = m_hep;
            } else {
                self.mesh.edge_mut(e_mprev).half[0] = m_hep;
            }
            self.canonicalize_edge(e_mprev);

            for i in 0..3 {
                let he = self.mesh.face_halfedge(f1, i);
                let origin = self.mesh.origin(he);
                self.mesh.vertex_mut(origin).halfedge = he;
            }
        }

        // point the rewired half-edges back at the recreated vertex
        for &he in &record.rewired {
            self.mesh.halfedge_mut(he).origin = v0;
        }

        // refresh face and vertex normals around both vertices
        for target in [v0, v1] {
            let start = self.mesh.fan_start(target);

            let mut he = start;
            loop {
                let f = self.mesh.face_of(he);
                self.mesh.update_face_geometry(f);

                let step = self.mesh.mate(self.mesh.prev(he));
                if !step.is_valid() {
                    break;
                }
                he = step;
                if he == start {
                    break;
                }
            }

            self.mesh.update_vertex_normal(target);

            let mut he = start;
            loop {
                let hn_origin = self.mesh.origin(self.mesh.next(he));
                self.mesh.update_vertex_normal(hn_origin);

                let hp = self.mesh.prev(he);
                let hp_mate = self.mesh.mate(hp);
                if !hp_mate.is_valid() {
                    let hp_origin = self.mesh.origin(hp);
                    self.mesh.update_vertex_normal(hp_origin);
                    break;
                }
                he = hp_mate;
                if he == start {
                    break;
                }
            }
        }

        true
    }
}
