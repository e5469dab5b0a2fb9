//! Export errors.

use thiserror::Error;

/// Errors returned while writing a mesh.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The requested format name or file extension is not supported.
    #[error("unsupported export format: {0:?}")]
    UnsupportedFormat(String),

    /// Writing to the destination failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
