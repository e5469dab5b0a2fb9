//! Overhang analysis for additive manufacturing.

use fieldmesh_mesh::TriangleMesh;
use serde::{Deserialize, Serialize};

/// Share of overhanging faces, in percent, above which supports are needed.
pub const DEFAULT_SUPPORT_THRESHOLD: f64 = 20.0;

/// Overhang statistics for a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverhangReport {
    /// Percentage of faces that overhang.
    pub overhang_percentage: f64,
    /// Number of overhanging faces.
    pub num_overhang_faces: usize,
    /// Number of faces inspected.
    pub total_faces: usize,
    /// Whether the percentage exceeds the support threshold.
    pub needs_supports: bool,
}

/// Analyze with the default support threshold.
pub fn overhang_analysis(mesh: &TriangleMesh, overhang_angle_deg: f64) -> OverhangReport {
    overhang_analysis_with_threshold(mesh, overhang_angle_deg, DEFAULT_SUPPORT_THRESHOLD)
}

/// Count faces pointing down more steeply than `overhang_angle_deg` from vertical.
///
/// A face overhangs when the z component of its unit normal is below
/// `-cos(angle)`. Zero-area faces have a zero normal.
pub fn overhang_analysis_with_threshold(
    mesh: &TriangleMesh,
    overhang_angle_deg: f64,
    support_threshold: f64,
) -> OverhangReport {
    let limit = -overhang_angle_deg.to_radians().cos();
    let total_faces = mesh.num_faces();
    let num_overhang_faces = mesh
        .face_normals()
        .iter()
        .filter(|n| n.z < limit)
        .count();
    let overhang_percentage = if total_faces == 0 {
        0.0
    } else {
        num_overhang_faces as f64 / total_faces as f64 * 100.0
    };
    OverhangReport {
        overhang_percentage,
        num_overhang_faces,
        total_faces,
        needs_supports: overhang_percentage > support_threshold,
    }
}
