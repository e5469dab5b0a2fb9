#![warn(missing_docs)]

//! Math types for the fieldmesh pipeline.
//!
//! Thin wrappers around nalgebra providing the point and vector types
//! shared by the field, mesh, and analysis crates, plus the tolerance
//! constants used for degenerate-geometry checks.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in 2D (slice plane) space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// `n` evenly spaced samples over `[start, stop]`, endpoints included.
///
/// A single sample yields `[start]`; zero samples yield an empty vector.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Unnormalized normal of triangle `(a, b, c)`; its length is twice the area.
#[inline]
pub fn triangle_cross(a: &Point3, b: &Point3, c: &Point3) -> Vec3 {
    (b - a).cross(&(c - a))
}

/// Area of triangle `(a, b, c)`.
#[inline]
pub fn triangle_area(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    triangle_cross(a, b, c).norm() * 0.5
}

/// Unit normal of triangle `(a, b, c)`, or `None` when the triangle is degenerate.
pub fn triangle_normal(a: &Point3, b: &Point3, c: &Point3) -> Option<Vec3> {
    let n = triangle_cross(a, b, c);
    let len = n.norm();
    if len > f64::EPSILON {
        Some(n / len)
    } else {
        None
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Linear distance tolerance, used when welding vertices.
    pub linear: f64,
    /// Area tolerance below which a face counts as degenerate.
    pub area: f64,
}

impl Tolerance {
    /// Default mesh tolerances (1e-8 linear, 1e-8 area).
    pub const DEFAULT: Self = Self {
        linear: 1e-8,
        area: 1e-8,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if an area is effectively zero.
    pub fn is_zero_area(&self, area: f64) -> bool {
        area.abs() <= self.area
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-1.0, 1.0, 5);
        assert_eq!(xs.len(), 5);
        assert!((xs[0] + 1.0).abs() < 1e-12);
        assert!(xs[2].abs() < 1e-12);
        assert!((xs[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linspace_degenerate_counts() {
        assert!(linspace(-1.0, 1.0, 0).is_empty());
        assert_eq!(linspace(-1.0, 1.0, 1), vec![-1.0]);
    }

    #[test]
    fn test_triangle_area_and_normal() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 0.0, 0.0);
        let c = Point3::new(0.0, 2.0, 0.0);
        assert!((triangle_area(&a, &b, &c) - 2.0).abs() < 1e-12);
        let n = triangle_normal(&a, &b, &c).unwrap();
        assert!((n.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_triangle_has_no_normal() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 0.0);
        assert!(triangle_normal(&a, &b, &c).is_none());
        assert!(Tolerance::DEFAULT.is_zero_area(triangle_area(&a, &b, &c)));
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-10, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point3::new(1.001, 2.0, 3.0);
        assert!(!tol.points_equal(&a, &c));
    }
}
