//! OFF (Object File Format) support.
//!
//! A plain indexed triangle list: a header line, a `vertices faces [edges]`
//! count line, then one line per vertex position and one line per face
//! (arity followed by three vertex indices).
//!
//! Loading normalizes the model into the cube spanning (-1, -1, -1) to
//! (1, 1, 1) with its bounding-box center at the origin, which keeps quadric
//! magnitudes comparable across inputs.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, HalfEdgeMesh};

fn load_error(path: &Path, message: impl Into<String>) -> MeshError {
    MeshError::LoadError {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Load a mesh from an OFF file, normalized into the unit-ish cube.
///
/// # Example
///
/// ```no_run
/// use whittle::io::off;
///
/// let mesh = off::load("model.off").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut lines = reader.lines();
    let mut next_line = || -> Result<String> {
        loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        return Ok(line);
                    }
                }
                None => return Err(load_error(path, "unexpected end of file")),
            }
        }
    };

    // header line, discarded
    next_line()?;

    let counts = next_line()?;
    let mut fields = counts.split_whitespace();
    let n_vertices: usize = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| load_error(path, "malformed count line"))?;
    let n_faces: usize = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| load_error(path, "malformed count line"))?;

    let mut vertices = Vec::with_capacity(n_vertices);
    for _ in 0..n_vertices {
        let line = next_line()?;
        let mut fields = line.split_whitespace();
        let mut coord = [0.0f64; 3];
        for c in &mut coord {
            *c = fields
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| load_error(path, "malformed vertex line"))?;
        }
        vertices.push(Point3::new(coord[0], coord[1], coord[2]));
    }

    let mut faces = Vec::with_capacity(n_faces);
    for _ in 0..n_faces {
        let line = next_line()?;
        let mut fields = line.split_whitespace();
        let arity: usize = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| load_error(path, "malformed face line"))?;
        if arity != 3 {
            return Err(load_error(path, format!("face with {} vertices", arity)));
        }
        let mut indices = [0usize; 3];
        for i in &mut indices {
            *i = fields
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| load_error(path, "malformed face line"))?;
        }
        faces.push(indices);
    }

    normalize(&mut vertices);

    build_from_triangles(&vertices, &faces)
}

/// Scale and translate positions so the model fits the cube from
/// (-1, -1, -1) to (1, 1, 1) with the bounding-box center at the origin.
fn normalize(vertices: &mut [Point3<f64>]) {
    if vertices.is_empty() {
        return;
    }

    let mut min = vertices[0];
    let mut max = vertices[0];
    for p in vertices.iter() {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }

    let center = Point3::from((min.coords + max.coords) * 0.5);
    let mut largest_range = 0.0f64;
    for i in 0..3 {
        largest_range = largest_range.max(max[i] - min[i]);
    }
    if largest_range == 0.0 {
        return;
    }

    let scale_factor = 2.0 / largest_range;
    for p in vertices.iter_mut() {
        *p = Point3::from((p.coords - center.coords) * scale_factor);
    }
}

/// Save the active part of a mesh to an OFF file.
///
/// Deactivated vertices and faces are dropped and indices renumbered.
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);

    writeln!(writer, "OFF")?;
    writeln!(writer, "{} {} 0", vertices.len(), faces.len())?;

    for v in &vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }
    for f in &faces {
        writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("whittle-{}-{}.off", name, std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_normalizes_into_unit_cube() {
        let path = write_temp(
            "off-normalize",
            "OFF\n\
             4 2 0\n\
             0.0 0.0 0.0\n\
             10.0 0.0 0.0\n\
             10.0 10.0 0.0\n\
             0.0 10.0 0.0\n\
             3 0 1 2\n\
             3 0 2 3\n",
        );
        let mesh = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);

        let (min, max) = mesh.bounding_box().unwrap();
        assert!((min.x - -1.0).abs() < 1e-12);
        assert!((max.x - 1.0).abs() < 1e-12);
        assert!((min.y - -1.0).abs() < 1e-12);
        assert!((max.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_rejects_truncated_file() {
        let path = write_temp("off-truncated", "OFF\n4 2 0\n0.0 0.0 0.0\n");
        let result = load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(MeshError::LoadError { .. })));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let vertices = vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("whittle-off-roundtrip-{}.off", std::process::id()));
        save(&mesh, &path).unwrap();
        let reloaded = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(reloaded.num_vertices(), 4);
        assert_eq!(reloaded.num_faces(), 2);
        // the source already spans the unit cube, so positions survive
        for (v, p) in reloaded.vertex_ids().zip(vertices.iter()) {
            assert!((reloaded.vertex(v).position - p).norm() < 1e-12);
        }
    }
}
