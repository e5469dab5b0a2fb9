//! Hole detection and filling.
//!
//! A hole is a closed loop of boundary edges. Loops are traced against the
//! direction of their single adjacent face, so triangles added across the
//! loop wind consistently with the surrounding surface.

use std::collections::HashMap;

use fieldmesh_math::{triangle_cross, Point3, Vec3};
use fieldmesh_mesh::{EdgeTopology, TriangleMesh};
use tracing::{debug, info, warn};

use crate::error::{RepairError, Result};

/// Ordered vertex loop around a hole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Loop vertices; the last connects back to the first.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges in the loop.
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Boundary loops found in a mesh, plus any boundary chains that do not close.
#[derive(Debug, Clone, Default)]
pub struct HoleScan {
    /// Closed loops.
    pub loops: Vec<BoundaryLoop>,
    /// Number of open chains (non-manifold or malformed borders).
    pub unclosed: usize,
}

/// Trace every boundary edge into loops.
pub fn detect_holes(mesh: &TriangleMesh) -> HoleScan {
    let topo = EdgeTopology::build(&mesh.faces);
    // loop edge b → a for each face edge a → b that has no partner
    let mut next: HashMap<u32, Vec<u32>> = HashMap::new();
    for (a, b) in topo.boundary_edges() {
        let (from, to) = if topo.directed_count(a, b) == 1 {
            (b, a)
        } else {
            (a, b)
        };
        next.entry(from).or_default().push(to);
    }

    let mut scan = HoleScan::default();
    let mut starts: Vec<u32> = next.keys().copied().collect();
    starts.sort_unstable();

    for start in starts {
        while next.get(&start).is_some_and(|v| !v.is_empty()) {
            let mut vertices = vec![start];
            let mut current = start;
            let closed = loop {
                let Some(to) = next.get_mut(&current).and_then(Vec::pop) else {
                    break false;
                };
                if to == start {
                    break true;
                }
                vertices.push(to);
                current = to;
            };
            if closed && vertices.len() >= 3 {
                scan.loops.push(BoundaryLoop { vertices });
            } else {
                scan.unclosed += 1;
            }
        }
    }
    debug!(
        loops = scan.loops.len(),
        unclosed = scan.unclosed,
        "boundary scan"
    );
    scan
}

/// Triangulate a loop by ear clipping, falling back to a fan when no ear is found.
pub fn fill_hole(positions: &[Point3], hole: &BoundaryLoop) -> Vec<[u32; 3]> {
    let n = hole.vertices.len();
    if n < 3 {
        return Vec::new();
    }
    let pts: Vec<Point3> = hole
        .vertices
        .iter()
        .map(|&v| positions[v as usize])
        .collect();
    let normal = loop_normal(&pts);

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut tris = Vec::with_capacity(n - 2);
    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let (p, c, q) = (
                remaining[(i + m - 1) % m],
                remaining[i],
                remaining[(i + 1) % m],
            );
            is_ear(&pts, &remaining, p, c, q, &normal)
        });
        let Some(i) = ear else {
            debug!(left = remaining.len(), "no ear found, fanning");
            break;
        };
        let (p, c, q) = (
            remaining[(i + m - 1) % m],
            remaining[i],
            remaining[(i + 1) % m],
        );
        tris.push([hole.vertices[p], hole.vertices[c], hole.vertices[q]]);
        remaining.remove(i);
    }

    for k in 1..remaining.len() - 1 {
        tris.push([
            hole.vertices[remaining[0]],
            hole.vertices[remaining[k]],
            hole.vertices[remaining[k + 1]],
        ]);
    }
    tris
}

/// Newell normal of a polygon.
fn loop_normal(pts: &[Point3]) -> Vec3 {
    let mut n = Vec3::zeros();
    for i in 0..pts.len() {
        let (a, b) = (pts[i], pts[(i + 1) % pts.len()]);
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.try_normalize(f64::EPSILON).unwrap_or_else(Vec3::z)
}

fn is_ear(pts: &[Point3], remaining: &[usize], p: usize, c: usize, q: usize, normal: &Vec3) -> bool {
    let (a, b, d) = (pts[p], pts[c], pts[q]);
    let n = triangle_cross(&a, &b, &d);
    if n.norm() <= f64::EPSILON || n.dot(normal) <= 0.0 {
        return false;
    }
    !remaining
        .iter()
        .filter(|&&k| k != p && k != c && k != q)
        .any(|&k| inside_triangle(&pts[k], &a, &b, &d, normal))
}

fn inside_triangle(x: &Point3, a: &Point3, b: &Point3, c: &Point3, normal: &Vec3) -> bool {
    let s1 = triangle_cross(a, b, x).dot(normal);
    let s2 = triangle_cross(b, c, x).dot(normal);
    let s3 = triangle_cross(c, a, x).dot(normal);
    s1 >= 0.0 && s2 >= 0.0 && s3 >= 0.0
}

/// Fill every hole with at most `max_hole_edges` edges.
///
/// All-or-nothing: when any boundary chain fails to close the mesh is left
/// untouched and an error is returned. Larger holes are skipped with a
/// warning. Returns the number of holes filled.
pub fn fill_holes(mesh: &mut TriangleMesh, max_hole_edges: usize) -> Result<usize> {
    let scan = detect_holes(mesh);
    if scan.unclosed > 0 {
        return Err(RepairError::HoleFillFailed {
            unclosed: scan.unclosed,
        });
    }

    let mut filled = 0;
    let mut new_faces = Vec::new();
    for hole in &scan.loops {
        if hole.edge_count() > max_hole_edges {
            warn!(
                edges = hole.edge_count(),
                max = max_hole_edges,
                "skipping large hole"
            );
            continue;
        }
        new_faces.extend(fill_hole(&mesh.vertices, hole));
        filled += 1;
    }
    mesh.faces.extend(new_faces);

    if filled > 0 {
        info!(filled, faces = mesh.num_faces(), "filled holes");
    }
    Ok(filled)
}
