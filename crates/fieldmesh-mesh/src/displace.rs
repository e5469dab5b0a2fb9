//! Per-vertex displacement.

use fieldmesh_math::Vec3;

use crate::error::{MeshError, Result};
use crate::TriangleMesh;

/// Displacement source for [`apply_displacement`].
#[derive(Debug, Clone, Copy)]
pub enum Displacement<'a> {
    /// One scalar per vertex, applied along the vertex normal.
    AlongNormal(&'a [f64]),
    /// One 3D offset per vertex.
    Vectors(&'a [[f64; 3]]),
}

impl Displacement<'_> {
    fn len(&self) -> usize {
        match self {
            Self::AlongNormal(d) => d.len(),
            Self::Vectors(d) => d.len(),
        }
    }
}

/// Offset every vertex by `amplitude` times its displacement.
///
/// Normals are computed first when the input has none. The returned mesh
/// carries normals recomputed for the displaced surface.
///
/// # Errors
///
/// [`MeshError::DisplacementMismatch`] when the displacement length differs
/// from the vertex count.
pub fn apply_displacement(
    mesh: &TriangleMesh,
    displacement: Displacement<'_>,
    amplitude: f64,
) -> Result<TriangleMesh> {
    if displacement.len() != mesh.num_vertices() {
        return Err(MeshError::DisplacementMismatch {
            expected: mesh.num_vertices(),
            actual: displacement.len(),
        });
    }

    let mut out = mesh.clone();
    match displacement {
        Displacement::AlongNormal(values) => {
            if out.normals.is_none() {
                out.compute_vertex_normals();
            }
            if let Some(normals) = &out.normals {
                for ((p, n), &d) in out.vertices.iter_mut().zip(normals).zip(values) {
                    *p += n * (d * amplitude);
                }
            }
        }
        Displacement::Vectors(offsets) => {
            for (p, d) in out.vertices.iter_mut().zip(offsets) {
                *p += Vec3::from(*d) * amplitude;
            }
        }
    }

    out.compute_vertex_normals();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_cube;
    use approx::assert_relative_eq;
    use fieldmesh_math::Point3;

    #[test]
    fn test_mismatched_length() {
        let cube = unit_cube();
        let err = apply_displacement(&cube, Displacement::AlongNormal(&[1.0; 3]), 1.0).unwrap_err();
        assert_eq!(
            err,
            MeshError::DisplacementMismatch {
                expected: 8,
                actual: 3
            }
        );
        assert!(apply_displacement(&cube, Displacement::Vectors(&[[0.0; 3]; 9]), 1.0).is_err());
    }

    #[test]
    fn test_vector_displacement_translates() {
        let cube = unit_cube();
        let offsets = [[1.0, 0.0, 0.0]; 8];
        let moved = apply_displacement(&cube, Displacement::Vectors(&offsets), 2.0).unwrap();
        assert_relative_eq!(moved.vertices[0], Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(moved.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_displacement_inflates() {
        let cube = unit_cube();
        let inflated = apply_displacement(&cube, Displacement::AlongNormal(&[0.1; 8]), 1.0).unwrap();
        assert!(inflated.signed_volume() > cube.signed_volume());
        let deflated = apply_displacement(&cube, Displacement::AlongNormal(&[0.1; 8]), -1.0).unwrap();
        assert!(deflated.signed_volume() < cube.signed_volume());
        // input untouched
        assert!(cube.normals.is_none());
    }

    #[test]
    fn test_zero_amplitude_keeps_positions() {
        let cube = unit_cube();
        let same = apply_displacement(&cube, Displacement::AlongNormal(&[5.0; 8]), 0.0).unwrap();
        assert_eq!(same.vertices, cube.vertices);
    }
}
