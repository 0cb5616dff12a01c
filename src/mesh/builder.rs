//! Mesh construction utilities.
//!
//! This module builds the half-edge connectivity from a face-vertex list as
//! commonly found in mesh file formats, and converts back for export.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Edge, Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{EdgeId, FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Returns
/// A half-edge mesh with mates paired, edge records deduplicated, boundary
/// vertices flagged and all normals computed, or an error if the input is
/// invalid.
///
/// # Example
/// ```
/// use whittle::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Validate vertex indices
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        // Check for degenerate faces
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh {
        vertices: vertices.iter().map(|&p| Vertex::new(p)).collect(),
        halfedges: Vec::with_capacity(faces.len() * 3),
        faces: Vec::with_capacity(faces.len()),
        edges: Vec::with_capacity(faces.len() * 3 / 2 + 1),
    };

    // First pass: create the inline half-edge cycle of every face.
    // A directed edge seen twice means two faces with the same winding share
    // it, which the half-edge structure cannot represent.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> =
        HashMap::with_capacity(faces.len() * 3);

    for face in faces {
        let base = mesh.halfedges.len();
        for i in 0..3 {
            let he = HalfEdgeId::new(base + i);
            mesh.halfedges.push(HalfEdge {
                origin: VertexId::new(face[i]),
                mate: HalfEdgeId::invalid(),
                next: HalfEdgeId::new(base + (i + 1) % 3),
                prev: HalfEdgeId::new(base + (i + 2) % 3),
                edge: EdgeId::invalid(),
            });
            mesh.vertices[face[i]].halfedge = he;

            let key = (face[i], face[(i + 1) % 3]);
            if edge_map.insert(key, he).is_some() {
                return Err(MeshError::NonManifoldEdge {
                    v0: key.0,
                    v1: key.1,
                });
            }
        }
        mesh.faces.push(Face::new());
    }

    // Second pass: pair mates across opposite directed edges.
    for (&(v0, v1), &he) in &edge_map {
        if let Some(&mate) = edge_map.get(&(v1, v0)) {
            mesh.halfedges[he.index()].mate = mate;
        }
    }

    // Third pass: one edge record per undirected pair. The record is created
    // from the half-edge with the smaller origin id, or from any half-edge
    // lacking a mate; an unmated half-edge marks its origin as boundary.
    for fi in 0..mesh.faces.len() {
        for i in 0..3 {
            let he = mesh.face_halfedge(FaceId::new(fi), i);
            let mate = mesh.mate(he);
            if !mate.is_valid() || mesh.origin(he) < mesh.origin(mate) {
                let eid = EdgeId::new(mesh.edges.len());
                mesh.edges.push(Edge::new(he, mate));
                mesh.halfedges[he.index()].edge = eid;
                if mate.is_valid() {
                    mesh.halfedges[mate.index()].edge = eid;
                }
            }
            if !mate.is_valid() {
                let v = mesh.origin(he);
                mesh.vertices[v.index()].is_boundary = true;
            }
        }
    }

    // Fourth pass: face normals and areas, then area-weighted vertex normals.
    for fi in 0..mesh.faces.len() {
        mesh.update_face_geometry(FaceId::new(fi));
    }
    for vi in 0..mesh.vertices.len() {
        mesh.update_vertex_normal(VertexId::new(vi));
    }

    Ok(mesh)
}

/// Convert the active part of a half-edge mesh back to a face-vertex
/// representation.
///
/// Deactivated vertices and faces are skipped and the remaining vertices are
/// renumbered densely, so indices do not match the original input after
/// simplification.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap = vec![usize::MAX; mesh.num_vertices()];
    let mut vertices = Vec::with_capacity(mesh.active_vertex_count());

    for v in mesh.vertex_ids() {
        if mesh.vertex(v).is_active {
            remap[v.index()] = vertices.len();
            vertices.push(mesh.vertex(v).position);
        }
    }

    let faces = mesh
        .active_face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [remap[v0.index()], remap[v1.index()], remap[v2.index()]]
        })
        .collect();

    (vertices, faces)
}
