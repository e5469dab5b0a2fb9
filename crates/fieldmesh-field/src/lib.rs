#![warn(missing_docs)]

//! Scalar fields, boundary masks, and agent-based carving.
//!
//! A [`ScalarField`] is a dense 3D lattice of samples. A [`ValidityMask`] of
//! the same shape restricts where carving agents may travel; the builders in
//! [`boundary`] produce masks for common solids. [`carve`] runs the agents
//! and returns a new, attenuated field ready for isosurface extraction.

pub mod boundary;
pub mod carve;
pub mod error;
pub mod grid;

pub use boundary::{box_mask, cylinder_mask, sphere_mask, vase_mask, Boundary, BoundaryShape};
pub use carve::{carve, CarveParams};
pub use error::{FieldError, Result};
pub use grid::{Grid3, ScalarField, ValidityMask};
