//! Boundary masks over a normalized `[-1, 1]³` cube.
//!
//! Each builder samples `n` points per axis with [`linspace`] and marks the
//! cells that fall inside an analytic solid. The masks constrain where
//! carving agents may travel.

use fieldmesh_math::linspace;
use serde::{Deserialize, Serialize};

use crate::grid::{ScalarField, ValidityMask};

/// Default samples per axis for boundary masks.
pub const DEFAULT_RESOLUTION: usize = 64;

/// Vase mask: a circular cross-section whose radius shrinks linearly with height.
///
/// At normalized height `h = (z + 1) / 2` the radius is
/// `radius_frac * (1 - taper * h)`. Returns the mask together with `h` for
/// every cell (0 at the bottom, 1 at the top).
pub fn vase_mask(n: usize, radius_frac: f64, taper: f64) -> (ValidityMask, ScalarField) {
    let coords = linspace(-1.0, 1.0, n);
    let shape = [n, n, n];
    let height = ScalarField::from_fn(shape, |_, _, k| (coords[k] + 1.0) / 2.0);
    let mask = ValidityMask::from_fn(shape, |i, j, k| {
        let h = (coords[k] + 1.0) / 2.0;
        let r = radius_frac * (1.0 - taper * h);
        let (x, y) = (coords[i], coords[j]);
        (x * x + y * y).sqrt() <= r
    });
    (mask, height)
}

/// Straight cylinder along z; a vase with zero taper.
pub fn cylinder_mask(n: usize, radius_frac: f64) -> ValidityMask {
    vase_mask(n, radius_frac, 0.0).0
}

/// Ball centered in the cube.
pub fn sphere_mask(n: usize, radius_frac: f64) -> ValidityMask {
    let coords = linspace(-1.0, 1.0, n);
    ValidityMask::from_fn([n, n, n], |i, j, k| {
        let (x, y, z) = (coords[i], coords[j], coords[k]);
        (x * x + y * y + z * z).sqrt() <= radius_frac
    })
}

/// Axis-aligned cube centered in the lattice with half-extent `size_frac`.
pub fn box_mask(n: usize, size_frac: f64) -> ValidityMask {
    let coords = linspace(-1.0, 1.0, n);
    ValidityMask::from_fn([n, n, n], |i, j, k| {
        coords[i].abs() <= size_frac && coords[j].abs() <= size_frac && coords[k].abs() <= size_frac
    })
}

/// Shape selector for building a boundary from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum BoundaryShape {
    /// Tapered vase.
    Vase {
        /// Radius at the base as a fraction of the half-width.
        #[serde(default = "default_radius_frac")]
        radius_frac: f64,
        /// Fractional radius reduction at the top.
        #[serde(default = "default_taper")]
        taper: f64,
    },
    /// Straight cylinder.
    Cylinder {
        /// Radius as a fraction of the half-width.
        #[serde(default = "default_radius_frac")]
        radius_frac: f64,
    },
    /// Centered ball.
    Sphere {
        /// Radius as a fraction of the half-width.
        #[serde(default = "default_radius_frac")]
        radius_frac: f64,
    },
    /// Centered cube.
    Box {
        /// Half-extent as a fraction of the half-width.
        #[serde(default = "default_size_frac")]
        size_frac: f64,
    },
}

fn default_radius_frac() -> f64 {
    0.7
}

fn default_taper() -> f64 {
    0.3
}

fn default_size_frac() -> f64 {
    0.8
}

impl Default for BoundaryShape {
    fn default() -> Self {
        Self::Vase {
            radius_frac: default_radius_frac(),
            taper: default_taper(),
        }
    }
}

/// A built boundary: the mask plus the per-cell height field when the shape has one.
#[derive(Debug, Clone)]
pub struct Boundary {
    /// Cells agents may occupy.
    pub mask: ValidityMask,
    /// Normalized height per cell (vase only).
    pub height: Option<ScalarField>,
}

impl BoundaryShape {
    /// Build the mask at `n` samples per axis.
    pub fn build(&self, n: usize) -> Boundary {
        match *self {
            Self::Vase { radius_frac, taper } => {
                let (mask, height) = vase_mask(n, radius_frac, taper);
                Boundary {
                    mask,
                    height: Some(height),
                }
            }
            Self::Cylinder { radius_frac } => Boundary {
                mask: cylinder_mask(n, radius_frac),
                height: None,
            },
            Self::Sphere { radius_frac } => Boundary {
                mask: sphere_mask(n, radius_frac),
                height: None,
            },
            Self::Box { size_frac } => Boundary {
                mask: box_mask(n, size_frac),
                height: None,
            },
        }
    }
}
