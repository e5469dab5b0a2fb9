//! Mesh operation errors.

use thiserror::Error;

/// Errors from mesh construction and geometric operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// Per-vertex displacement data does not match the vertex count.
    #[error("displacement has {actual} entries but mesh has {expected} vertices")]
    DisplacementMismatch {
        /// Number of vertices in the mesh.
        expected: usize,
        /// Number of displacement entries supplied.
        actual: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but mesh has {num_vertices} vertices")]
    InvalidIndex {
        /// Offending face.
        face: usize,
        /// Out-of-range vertex index.
        index: u32,
        /// Vertex count of the mesh.
        num_vertices: usize,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
