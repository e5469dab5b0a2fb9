//! Small closed reference meshes.

use fieldmesh_math::Point3;

use crate::TriangleMesh;

/// Axis-aligned box spanning `min..max`, outward-facing, 8 vertices and 12 faces.
pub fn cuboid(min: Point3, max: Point3) -> TriangleMesh {
    let vertices = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    let faces = vec![
        // -z
        [0, 2, 1],
        [0, 3, 2],
        // +z
        [4, 5, 6],
        [4, 6, 7],
        // -y
        [0, 1, 5],
        [0, 5, 4],
        // +y
        [3, 7, 6],
        [3, 6, 2],
        // -x
        [0, 4, 7],
        [0, 7, 3],
        // +x
        [1, 2, 6],
        [1, 6, 5],
    ];
    TriangleMesh::from_parts(vertices, faces)
}

/// The cube `[0, 1]³`.
pub fn unit_cube() -> TriangleMesh {
    cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
}
