//! # Whittle
//!
//! An incremental triangle-mesh simplification engine with exact undo.
//!
//! Whittle implements quadric-error-metric edge collapse on a half-edge
//! structure whose entities are tombstoned instead of removed. Every collapse
//! is recorded on an undo stack and can be reversed by a vertex split that
//! restores the exact prior state, so the level of detail of a mesh can be
//! driven up and down deterministically, one operation at a time.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe,
//!   stable indices
//! - **Topology-safe collapses**: a link condition rejects collapses that
//!   would create non-manifold fins
//! - **Exact reversal**: collapse followed by split restores positions,
//!   boundary flags and face activity bit for bit
//! - **Lazy invalidation**: cached collapse costs are superseded through
//!   generation counters instead of heap surgery
//! - **File formats**: OFF and PLY
//!
//! ## Quick Start
//!
//! ```no_run
//! use whittle::algo::simplify::Simplifier;
//!
//! // Load a mesh (normalized into the unit cube for OFF input)
//! let mesh = whittle::io::load("model.off").unwrap();
//! println!("faces: {}", mesh.active_face_count());
//!
//! // Walk it down three level-of-detail steps and back up one
//! let mut simplifier = Simplifier::new(mesh);
//! for step in 0..=3 {
//!     simplifier.advance(step);
//! }
//! simplifier.advance(2);
//!
//! whittle::io::save(simplifier.mesh(), "simplified.off").unwrap();
//! ```
//!
//! ## Single-step control
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
//! simplifier.collapse();
//! simplifier.split();
//! assert_eq!(simplifier.active_face_count(), 4);
//! ```
//!
//! ## Rendering contract
//!
//! A renderer only needs [`mesh::HalfEdgeMesh::active_triangles`], which
//! yields three (normal, position) pairs per active face in winding order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use whittle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::simplify::{Request, Simplifier};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, Edge, EdgeId, Face, FaceId, HalfEdge, HalfEdgeId,
        HalfEdgeMesh, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        // closed mesh: 4 faces * 3 half-edges, every one mated
        assert_eq!(mesh.num_halfedges(), 12);
        assert_eq!(mesh.num_edges(), 6);
        assert!(mesh.validate());

        for v in mesh.vertex_ids() {
            assert!(
                !mesh.vertex(v).is_boundary,
                "vertex {:?} should not be on boundary",
                v
            );
        }
    }
}
