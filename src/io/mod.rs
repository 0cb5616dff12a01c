//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | OFF | `.off` | ✓ | ✓ | Indexed triangle list; normalized on load |
//! | PLY | `.ply` | ✓ | ✓ | Stanford polygon format (ASCII save) |
//!
//! # Usage
//!
//! The easiest way to load and save meshes is using the automatic format
//! detection:
//!
//! ```no_run
//! use whittle::io::{load, save};
//!
//! let mesh = load("model.off").unwrap();
//! save(&mesh, "output.ply").unwrap();
//! ```

pub mod off;
pub mod ply;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::HalfEdgeMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// OFF (Object File Format).
    Off,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "off" => Some(Format::Off),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }
}

fn detect_format(path: &Path) -> Result<Format> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();

    Format::from_extension(&extension).ok_or(MeshError::UnsupportedFormat { extension })
}

/// Load a mesh, detecting the format from the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh> {
    let path = path.as_ref();
    match detect_format(path)? {
        Format::Off => off::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save the active part of a mesh, detecting the format from the file
/// extension.
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect_format(path)? {
        Format::Off => off::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
    }
}
