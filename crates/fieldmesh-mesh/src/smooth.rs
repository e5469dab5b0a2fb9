//! Laplacian smoothing.

use fieldmesh_math::{Point3, Vec3};

use crate::topology::VertexAdjacency;
use crate::TriangleMesh;

/// Default smoothing strength.
pub const DEFAULT_LAMBDA: f64 = 0.5;

/// Smooth vertex positions with `iterations` Jacobi passes of
/// `v ← (1 - λ)·v + λ·mean(neighbours)`.
///
/// Each pass reads only the previous pass's positions. Isolated vertices
/// stay put. Face connectivity is unchanged; normals are recomputed if the
/// input carried them.
pub fn smooth_laplacian(mesh: &TriangleMesh, iterations: usize, lambda: f64) -> TriangleMesh {
    let mut out = mesh.clone();
    if iterations == 0 || mesh.is_empty() {
        return out;
    }

    let adjacency = VertexAdjacency::build(mesh.num_vertices(), &mesh.faces);
    for _ in 0..iterations {
        let prev = out.vertices.clone();
        for (v, pos) in out.vertices.iter_mut().enumerate() {
            let neighbors = adjacency.neighbors(v);
            if neighbors.is_empty() {
                continue;
            }
            let sum = neighbors
                .iter()
                .fold(Vec3::zeros(), |acc, &n| acc + prev[n as usize].coords);
            let mean = sum / neighbors.len() as f64;
            *pos = Point3::from(prev[v].coords * (1.0 - lambda) + mean * lambda);
        }
    }

    if mesh.normals.is_some() {
        out.compute_vertex_normals();
    }
    out
}
