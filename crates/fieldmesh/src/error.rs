//! Pipeline errors.

use fieldmesh_export::ExportError;
use fieldmesh_field::FieldError;
use fieldmesh_iso::IsoError;
use fieldmesh_mesh::MeshError;
use thiserror::Error;

/// Errors returned by [`Pipeline`](crate::Pipeline) and [`PipelineConfig`](crate::PipelineConfig).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Field construction or carving failed.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Isosurface extraction failed.
    #[error(transparent)]
    Iso(#[from] IsoError),

    /// A mesh operation rejected its input.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Writing the mesh failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The configuration document could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("config serialization failed: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Reading the configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
