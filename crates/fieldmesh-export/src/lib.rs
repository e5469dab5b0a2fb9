#![warn(missing_docs)]

//! Mesh export for fieldmesh.
//!
//! Writes [`TriangleMesh`] values as binary STL, ASCII STL, or Wavefront
//! OBJ. Formats are chosen by name or by file extension; anything else is
//! rejected with [`ExportError::UnsupportedFormat`] before a file is created.

pub mod error;
pub mod obj;
pub mod stl;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use fieldmesh_mesh::TriangleMesh;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::{ExportError, Result};

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Binary STL.
    #[default]
    Stl,
    /// ASCII STL.
    StlAscii,
    /// Wavefront OBJ.
    Obj,
}

impl ExportFormat {
    /// Pick a format from a file extension (`stl` or `obj`, any case).
    pub fn from_extension(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "stl" => Ok(Self::Stl),
            "obj" => Ok(Self::Obj),
            _ => Err(ExportError::UnsupportedFormat(ext)),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stl" | "stl_binary" => Ok(Self::Stl),
            "stl_ascii" => Ok(Self::StlAscii),
            "obj" => Ok(Self::Obj),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stl => "stl",
            Self::StlAscii => "stl_ascii",
            Self::Obj => "obj",
        })
    }
}

/// Write `mesh` to any writer.
pub fn write_mesh(writer: &mut impl Write, mesh: &TriangleMesh, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Stl => stl::write_binary(mesh, writer)?,
        ExportFormat::StlAscii => stl::write_ascii(mesh, writer)?,
        ExportFormat::Obj => obj::write_obj(mesh, writer)?,
    }
    Ok(())
}

/// Write `mesh` to a file at `path`.
pub fn export_mesh(mesh: &TriangleMesh, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_mesh(&mut writer, mesh, format)?;
    writer.flush()?;
    info!(path = %path.display(), %format, faces = mesh.num_faces(), "exported mesh");
    Ok(())
}

/// Write `mesh` to `path`, choosing the format from its extension.
pub fn export_mesh_auto(mesh: &TriangleMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ExportFormat::from_extension(path)?;
    export_mesh(mesh, path, format)
}
