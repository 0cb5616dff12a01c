//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation used by the
//! simplification engine.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], a half-edge structure tailored to
//! incremental simplification: all entities live in index-addressed arenas
//! that never shrink, and deactivation is a tombstone bit instead of removal.
//! That keeps every id stable, which is what makes an edge collapse exactly
//! reversible.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies a full (undirected) edge
//!
//! # Construction
//!
//! Meshes are typically constructed from file I/O or from face-vertex lists:
//!
//! ```
//! use whittle::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_edges(), 3);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{Edge, Face, FanIter, HalfEdge, HalfEdgeMesh, Vertex};
pub use index::{EdgeId, FaceId, HalfEdgeId, VertexId};
