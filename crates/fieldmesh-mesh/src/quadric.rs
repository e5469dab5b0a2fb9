//! Quadric error metric.
//!
//! A quadric accumulates the squared distance to a set of planes. Summing
//! the quadrics of two vertices gives the cost of merging them at a point.

use fieldmesh_math::{Point3, Vec3};
use nalgebra::{Matrix3, Matrix4, Vector4};

/// Symmetric 4×4 plane-distance quadric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric(Matrix4<f64>);

impl Default for Quadric {
    fn default() -> Self {
        Self(Matrix4::zeros())
    }
}

impl Quadric {
    /// Quadric of the plane through `point` with unit `normal`.
    pub fn from_plane(normal: &Vec3, point: &Point3) -> Self {
        let d = -normal.dot(&point.coords);
        let p = Vector4::new(normal.x, normal.y, normal.z, d);
        Self(p * p.transpose())
    }

    /// Accumulate another quadric.
    pub fn add(&mut self, other: &Self) {
        self.0 += other.0;
    }

    /// Sum of two quadrics.
    pub fn combined(&self, other: &Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Sum of squared plane distances at `p`.
    pub fn evaluate(&self, p: &Point3) -> f64 {
        let v = Vector4::new(p.x, p.y, p.z, 1.0);
        (v.transpose() * self.0 * v)[(0, 0)]
    }

    /// Point minimizing the error, or `None` when the system is singular
    /// (e.g. all planes parallel).
    pub fn optimal_point(&self) -> Option<Point3> {
        let a: Matrix3<f64> = self.0.fixed_view::<3, 3>(0, 0).into_owned();
        if a.determinant().abs() < 1e-10 {
            return None;
        }
        let b = -self.0.fixed_view::<3, 1>(0, 3).into_owned();
        let inv = a.try_inverse()?;
        Some(Point3::from(inv * b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_distance() {
        let q = Quadric::from_plane(&Vec3::z(), &Point3::origin());
        assert_relative_eq!(q.evaluate(&Point3::new(3.0, -2.0, 0.0)), 0.0);
        assert_relative_eq!(q.evaluate(&Point3::new(0.0, 0.0, 2.0)), 4.0);
    }

    #[test]
    fn test_corner_is_optimal() {
        let corner = Point3::new(1.0, 2.0, 3.0);
        let mut q = Quadric::from_plane(&Vec3::x(), &corner);
        q.add(&Quadric::from_plane(&Vec3::y(), &corner));
        q.add(&Quadric::from_plane(&Vec3::z(), &corner));
        let p = q.optimal_point().unwrap();
        assert_relative_eq!(p, corner, epsilon = 1e-9);
        assert_relative_eq!(q.evaluate(&p), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_coplanar_is_singular() {
        let q = Quadric::from_plane(&Vec3::z(), &Point3::origin())
            .combined(&Quadric::from_plane(&Vec3::z(), &Point3::new(1.0, 1.0, 0.0)));
        assert!(q.optimal_point().is_none());
    }
}
