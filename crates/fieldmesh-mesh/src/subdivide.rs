//! Midpoint subdivision and face-count remeshing.

use std::collections::HashMap;

use fieldmesh_math::Point3;
use tracing::debug;

use crate::decimate::decimate;
use crate::topology::edge_key;
use crate::TriangleMesh;

/// Split every triangle into four through its edge midpoints.
///
/// Midpoints are shared between neighbouring faces, so a watertight input
/// stays watertight. Winding is preserved; the four children of face `i`
/// occupy output slots `4i..4i + 4`.
pub fn subdivide_midpoint(mesh: &TriangleMesh) -> TriangleMesh {
    let mut vertices = mesh.vertices.clone();
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut faces = Vec::with_capacity(mesh.num_faces() * 4);

    let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Point3>| -> u32 {
        *midpoints.entry(edge_key(a, b)).or_insert_with(|| {
            let p = nalgebra::center(&vertices[a as usize], &vertices[b as usize]);
            vertices.push(p);
            (vertices.len() - 1) as u32
        })
    };

    for &[a, b, c] in &mesh.faces {
        let ab = midpoint(a, b, &mut vertices);
        let bc = midpoint(b, c, &mut vertices);
        let ca = midpoint(c, a, &mut vertices);
        faces.push([a, ab, ca]);
        faces.push([ab, b, bc]);
        faces.push([ca, bc, c]);
        faces.push([ab, bc, ca]);
    }

    let out = TriangleMesh::from_parts(vertices, faces);
    if mesh.normals.is_some() {
        out.with_vertex_normals()
    } else {
        out
    }
}

/// Bring the face count near `target_faces`.
///
/// Meshes above target are decimated. Meshes below are subdivided until
/// they reach it; an overshoot beyond 1.5× target is decimated back down.
pub fn remesh_to_face_count(mesh: &TriangleMesh, target_faces: usize) -> TriangleMesh {
    let current = mesh.num_faces();
    if current > target_faces {
        return decimate(mesh, target_faces);
    }

    let mut out = mesh.clone();
    if out.is_empty() {
        return out;
    }
    while out.num_faces() < target_faces {
        out = subdivide_midpoint(&out);
        if out.num_faces() as f64 > target_faces as f64 * 1.5 {
            debug!(
                faces = out.num_faces(),
                target = target_faces,
                "subdivision overshot, decimating back"
            );
            out = decimate(&out, target_faces);
            break;
        }
    }
    out
}
