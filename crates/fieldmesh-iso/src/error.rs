use fieldmesh_field::FieldError;
use thiserror::Error;

/// Errors from isosurface extraction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsoError {
    /// Some axis has fewer than two samples, so no cell can be formed.
    #[error("field shape {shape:?} needs at least 2 samples per axis")]
    FieldTooSmall {
        /// Offending field shape.
        shape: [usize; 3],
    },

    /// The lattice has more edges than 32-bit vertex indices can address.
    #[error("field shape {shape:?} is too large for 32-bit vertex indices")]
    FieldTooLarge {
        /// Offending field shape.
        shape: [usize; 3],
    },

    /// Isovalue or spacing is unusable.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The raw input could not be turned into a field.
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, IsoError>;
