//! Error types for field construction and carving.

use thiserror::Error;

/// Errors from field and mask operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The input array does not have exactly three axes.
    #[error("field must be 3D, got shape {shape:?}")]
    NotThreeDimensional {
        /// The offending shape.
        shape: Vec<usize>,
    },

    /// Data length does not match the product of the shape.
    #[error("data length {actual} does not match shape {shape:?} (expected {expected})")]
    DataLength {
        /// Requested shape.
        shape: [usize; 3],
        /// Expected number of samples.
        expected: usize,
        /// Number of samples provided.
        actual: usize,
    },

    /// Two grids that must share a shape do not.
    #[error("shape mismatch: field {field:?} vs mask {mask:?}")]
    ShapeMismatch {
        /// Shape of the scalar field.
        field: [usize; 3],
        /// Shape of the validity mask.
        mask: [usize; 3],
    },

    /// A parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for field operations.
pub type Result<T> = std::result::Result<T, FieldError>;
