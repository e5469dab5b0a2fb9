#![warn(missing_docs)]

//! Mesh validation and repair.
//!
//! [`validate_mesh`] reports whether a mesh is printable: watertight, free
//! of degenerate faces, and ideally a consistently wound positive volume.
//! [`repair_mesh`] welds, cleans, closes small holes, and re-orients faces,
//! then leaves it to the caller to validate again.

pub mod error;
pub mod holes;
pub mod repair;
pub mod validate;
pub mod winding;

pub use error::{RepairError, Result};
pub use holes::{detect_holes, fill_hole, fill_holes, BoundaryLoop, HoleScan};
pub use repair::{
    remove_degenerate_faces, remove_duplicate_faces, remove_invalid_faces,
    remove_unreferenced_vertices, repair_mesh, repair_mesh_with_options, weld_vertices, RepairOptions, RepairSummary,
};
pub use validate::{
    validate_mesh, validate_mesh_with_options, Dimensions, ValidationOptions, ValidationReport,
    NOT_WATERTIGHT,
};
pub use winding::fix_winding;
