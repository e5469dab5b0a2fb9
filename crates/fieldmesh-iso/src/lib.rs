#![warn(missing_docs)]

//! Isosurface extraction.
//!
//! Converts a [`ScalarField`] into a [`TriangleMesh`] along the level set
//! `field == isovalue`. Samples strictly above the isovalue are inside;
//! triangles face from inside to outside, so a blob of high values becomes
//! a closed, outward-facing surface with positive volume.
//!
//! # Example
//!
//! ```
//! use fieldmesh_field::ScalarField;
//! use fieldmesh_iso::{extract_isosurface, IsoParams};
//!
//! let field = ScalarField::from_fn([3, 3, 3], |x, y, z| {
//!     if [x, y, z] == [1, 1, 1] { 1.0 } else { 0.0 }
//! });
//! let params = IsoParams { smooth: false, ..Default::default() };
//! let mesh = extract_isosurface(&field, &params).unwrap();
//! assert!(mesh.signed_volume() > 0.0);
//! ```

mod error;
mod tetra;

use fieldmesh_field::ScalarField;
use fieldmesh_mesh::{smooth::DEFAULT_LAMBDA, smooth_laplacian, TriangleMesh};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::{IsoError, Result};

/// Extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsoParams {
    /// Level at which to extract the surface.
    pub isovalue: f64,
    /// Physical size of one lattice step along x, y, z.
    pub spacing: [f64; 3],
    /// Apply Laplacian smoothing after extraction.
    pub smooth: bool,
    /// Number of smoothing passes.
    pub smooth_iterations: usize,
}

impl Default for IsoParams {
    fn default() -> Self {
        Self {
            isovalue: 0.5,
            spacing: [1.0; 3],
            smooth: true,
            smooth_iterations: 3,
        }
    }
}

impl IsoParams {
    /// Check the isovalue and spacing.
    pub fn validate(&self) -> Result<()> {
        if !self.isovalue.is_finite() {
            return Err(IsoError::InvalidParameter(format!(
                "isovalue must be finite, got {}",
                self.isovalue
            )));
        }
        if let Some(s) = self.spacing.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(IsoError::InvalidParameter(format!(
                "spacing must be positive and finite, got {s}"
            )));
        }
        Ok(())
    }
}

/// Extract the isosurface of `field` at `params.isovalue`.
///
/// A field lying entirely on one side of the isovalue gives an empty mesh.
/// The returned mesh always carries area-weighted vertex normals.
///
/// # Errors
///
/// [`IsoError::FieldTooSmall`] if any axis has fewer than two samples,
/// [`IsoError::FieldTooLarge`] if the lattice could produce more vertices
/// than a `u32` index reaches, and [`IsoError::InvalidParameter`] for a
/// non-finite isovalue or bad spacing.
pub fn extract_isosurface(field: &ScalarField, params: &IsoParams) -> Result<TriangleMesh> {
    let shape = field.shape();
    if shape.iter().any(|&n| n < 2) {
        return Err(IsoError::FieldTooSmall { shape });
    }
    check_index_range(shape)?;
    params.validate()?;

    let mut mesh = tetra::Extractor::new(field, params.isovalue, params.spacing).run();
    debug!(
        vertices = mesh.num_vertices(),
        faces = mesh.num_faces(),
        isovalue = params.isovalue,
        "isosurface extracted"
    );

    if params.smooth && params.smooth_iterations > 0 && !mesh.is_empty() {
        mesh = smooth_laplacian(&mesh, params.smooth_iterations, DEFAULT_LAMBDA);
    }
    mesh.compute_vertex_normals();
    Ok(mesh)
}

/// At most one vertex per lattice edge: each sample starts three axis edges,
/// three face diagonals, and one body diagonal.
fn check_index_range(shape: [usize; 3]) -> Result<()> {
    let edges = shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .and_then(|samples| samples.checked_mul(7));
    match edges {
        Some(e) if e <= u32::MAX as usize => Ok(()),
        _ => Err(IsoError::FieldTooLarge { shape }),
    }
}

/// Like [`extract_isosurface`], for a raw shape and row-major sample vector.
///
/// # Errors
///
/// [`IsoError::Field`] when the shape is not three-dimensional or does not
/// match the data length, plus everything [`extract_isosurface`] reports.
pub fn extract_isosurface_raw(
    shape: &[usize],
    data: Vec<f64>,
    params: &IsoParams,
) -> Result<TriangleMesh> {
    let field = ScalarField::from_shape_vec(shape, data)?;
    extract_isosurface(&field, params)
}
