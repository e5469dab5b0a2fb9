//! Repair errors.

use thiserror::Error;

/// Errors raised inside the repair pipeline.
///
/// [`repair_mesh`](crate::repair_mesh) logs and swallows these; they only
/// surface when calling the individual steps directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepairError {
    /// Boundary edges could not be traced into closed loops.
    #[error("hole filling failed: {unclosed} boundary chain(s) do not close")]
    HoleFillFailed {
        /// Number of open boundary chains.
        unclosed: usize,
    },
}

/// Result type for repair steps.
pub type Result<T> = std::result::Result<T, RepairError>;
