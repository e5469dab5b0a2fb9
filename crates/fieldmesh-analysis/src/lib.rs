#![warn(missing_docs)]

//! Printability analysis for fieldmesh meshes.
//!
//! Overhang statistics decide whether a mesh needs support material;
//! horizontal slicing turns it into closed 2D contours per layer.

pub mod overhang;
pub mod path;
pub mod slice;

pub use overhang::{
    overhang_analysis, overhang_analysis_with_threshold, OverhangReport, DEFAULT_SUPPORT_THRESHOLD,
};
pub use path::Polygon;
pub use slice::{contour_points, layer_heights, slice_at_heights, slice_horizontal, SliceLayer};
