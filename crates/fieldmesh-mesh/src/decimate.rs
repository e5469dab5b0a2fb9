//! Quadric-error edge-collapse decimation.
//!
//! Edges are collapsed cheapest-first. Boundary vertices never move, so
//! open borders survive untouched. Collapses that would pinch the surface
//! (more than two shared neighbours) or flip a surrounding triangle are
//! rejected.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use fieldmesh_math::{triangle_cross, Point3};
use tracing::{debug, info};

use crate::quadric::Quadric;
use crate::topology::EdgeTopology;
use crate::TriangleMesh;

#[derive(Debug, Clone, Copy)]
struct Collapse {
    cost: f64,
    keep: u32,
    remove: u32,
    stamps: (u32, u32),
    target: Point3,
}

impl PartialEq for Collapse {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Collapse {}

impl PartialOrd for Collapse {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Collapse {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on cost, then on vertex pair
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| (other.keep, other.remove).cmp(&(self.keep, self.remove)))
    }
}

struct Decimator {
    positions: Vec<Point3>,
    alive: Vec<bool>,
    stamp: Vec<u32>,
    boundary: Vec<bool>,
    quadrics: Vec<Quadric>,
    faces: Vec<Option<[u32; 3]>>,
    vert_faces: Vec<Vec<usize>>,
}

impl Decimator {
    fn new(mesh: &TriangleMesh) -> Self {
        let n = mesh.num_vertices();
        let mut quadrics = vec![Quadric::default(); n];
        let mut vert_faces = vec![Vec::new(); n];
        for (fi, f) in mesh.faces.iter().enumerate() {
            let [a, b, c] = mesh.triangle(fi);
            let cross = triangle_cross(&a, &b, &c);
            let len = cross.norm();
            if len > 1e-12 {
                let q = Quadric::from_plane(&(cross / len), &a);
                for &v in f {
                    quadrics[v as usize].add(&q);
                }
            }
            for &v in f {
                vert_faces[v as usize].push(fi);
            }
        }

        let mut boundary = vec![false; n];
        for (a, b) in EdgeTopology::build(&mesh.faces).boundary_edges() {
            boundary[a as usize] = true;
            boundary[b as usize] = true;
        }

        Self {
            positions: mesh.vertices.clone(),
            alive: vec![true; n],
            stamp: vec![0; n],
            boundary,
            quadrics,
            faces: mesh.faces.iter().copied().map(Some).collect(),
            vert_faces,
        }
    }

    fn live_faces(&self, v: u32) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.vert_faces[v as usize]
            .iter()
            .filter_map(|&fi| self.faces[fi])
    }

    fn neighbors(&self, v: u32) -> BTreeSet<u32> {
        self.live_faces(v)
            .flat_map(|f| f.into_iter())
            .filter(|&u| u != v)
            .collect()
    }

    fn candidate(&self, a: u32, b: u32) -> Option<Collapse> {
        let (ba, bb) = (self.boundary[a as usize], self.boundary[b as usize]);
        let q = self.quadrics[a as usize].combined(&self.quadrics[b as usize]);
        let (pa, pb) = (self.positions[a as usize], self.positions[b as usize]);

        let (keep, remove, target) = match (ba, bb) {
            (true, true) => return None,
            (true, false) => (a, b, pa),
            (false, true) => (b, a, pb),
            (false, false) => {
                let mid = nalgebra::center(&pa, &pb);
                let target = q.optimal_point().unwrap_or_else(|| {
                    [pa, pb, mid]
                        .into_iter()
                        .min_by(|x, y| q.evaluate(x).total_cmp(&q.evaluate(y)))
                        .unwrap_or(mid)
                });
                (a, b, target)
            }
        };

        Some(Collapse {
            cost: q.evaluate(&target),
            keep,
            remove,
            stamps: (self.stamp[keep as usize], self.stamp[remove as usize]),
            target,
        })
    }

    fn is_current(&self, c: &Collapse) -> bool {
        self.alive[c.keep as usize]
            && self.alive[c.remove as usize]
            && self.stamp[c.keep as usize] == c.stamps.0
            && self.stamp[c.remove as usize] == c.stamps.1
    }

    fn is_valid(&self, c: &Collapse) -> bool {
        let nk = self.neighbors(c.keep);
        let nr = self.neighbors(c.remove);
        if !nk.contains(&c.remove) {
            return false;
        }
        let shared = nk.intersection(&nr).count();
        let union = nk.union(&nr).filter(|&&u| u != c.keep && u != c.remove).count();
        if shared > 2 || union <= 2 {
            return false;
        }
        // a collapsed triangle must not take a border edge with it
        if self.boundary[c.keep as usize]
            && nk.intersection(&nr).any(|&w| self.boundary[w as usize])
        {
            return false;
        }

        // surviving faces must keep their orientation and stay non-degenerate
        for v in [c.keep, c.remove] {
            for f in self.live_faces(v) {
                if f.contains(&c.keep) && f.contains(&c.remove) {
                    continue;
                }
                let before = f.map(|i| self.positions[i as usize]);
                let after = f.map(|i| {
                    if i == c.keep || i == c.remove {
                        c.target
                    } else {
                        self.positions[i as usize]
                    }
                });
                let n0 = triangle_cross(&before[0], &before[1], &before[2]);
                let n1 = triangle_cross(&after[0], &after[1], &after[2]);
                if n1.norm() < 1e-12 || n0.dot(&n1) <= 0.0 {
                    return false;
                }
            }
        }
        true
    }

    /// Merge `remove` into `keep`; returns the number of faces removed.
    fn apply(&mut self, c: &Collapse) -> usize {
        let (keep, remove) = (c.keep as usize, c.remove as usize);
        self.positions[keep] = c.target;
        let q = self.quadrics[remove];
        self.quadrics[keep].add(&q);
        self.alive[remove] = false;
        self.stamp[keep] += 1;

        let mut removed = 0;
        let moved = std::mem::take(&mut self.vert_faces[remove]);
        for fi in moved {
            let Some(mut f) = self.faces[fi] else {
                continue;
            };
            for i in f.iter_mut() {
                if *i == c.remove {
                    *i = c.keep;
                }
            }
            if f[0] == f[1] || f[1] == f[2] || f[0] == f[2] {
                self.faces[fi] = None;
                removed += 1;
            } else {
                self.faces[fi] = Some(f);
                self.vert_faces[keep].push(fi);
            }
        }
        removed
    }

    fn finish(self, with_normals: bool) -> TriangleMesh {
        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for f in self.faces.iter().flatten() {
            let mapped = f.map(|v| {
                let slot = &mut remap[v as usize];
                if *slot == u32::MAX {
                    *slot = vertices.len() as u32;
                    vertices.push(self.positions[v as usize]);
                }
                *slot
            });
            faces.push(mapped);
        }
        let mesh = TriangleMesh::from_parts(vertices, faces);
        if with_normals {
            mesh.with_vertex_normals()
        } else {
            mesh
        }
    }
}

/// Reduce `mesh` to at most `target_faces` triangles where possible.
///
/// Returns an unchanged copy when the mesh is already at or below target.
/// The result may stay above target when no further valid collapse exists.
pub fn decimate(mesh: &TriangleMesh, target_faces: usize) -> TriangleMesh {
    let original = mesh.num_faces();
    if original <= target_faces {
        return mesh.clone();
    }

    info!(original, target = target_faces, "starting decimation");

    let mut state = Decimator::new(mesh);
    let mut heap = BinaryHeap::new();
    let mut edges: Vec<(u32, u32)> = EdgeTopology::build(&mesh.faces)
        .iter()
        .map(|(e, _)| e)
        .collect();
    edges.sort_unstable();
    for (a, b) in edges {
        if a != b {
            heap.extend(state.candidate(a, b));
        }
    }

    let mut active = original;
    let mut collapses = 0usize;
    let mut rejected = 0usize;
    while active > target_faces {
        let Some(c) = heap.pop() else {
            break;
        };
        if !state.is_current(&c) {
            continue;
        }
        if !state.is_valid(&c) {
            rejected += 1;
            continue;
        }
        active -= state.apply(&c);
        collapses += 1;

        for n in state.neighbors(c.keep) {
            heap.extend(state.candidate(c.keep, n));
        }
    }

    debug!(collapses, rejected, "decimation collapse stats");
    info!(final_faces = active, "decimation complete");

    state.finish(mesh.normals.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{subdivide_midpoint, unit_cube};
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn test_below_target_is_copy() {
        let cube = unit_cube();
        assert_eq!(decimate(&cube, 12), cube);
        assert_eq!(decimate(&cube, 100), cube);
    }

    #[test]
    fn test_subdivided_cube_reaches_target() {
        let dense = subdivide_midpoint(&subdivide_midpoint(&unit_cube()));
        assert_eq!(dense.num_faces(), 192);
        let reduced = decimate(&dense, 48);
        assert!(reduced.num_faces() <= 48);
        assert!(EdgeTopology::build(&reduced.faces).is_watertight());
        // collapses along flat faces and straight edges cost nothing
        assert_relative_eq!(reduced.signed_volume(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_repeated_runs_match() {
        let dense = subdivide_midpoint(&subdivide_midpoint(&unit_cube()));
        let first = decimate(&dense, 40);
        for _ in 0..20 {
            assert_eq!(decimate(&dense, 40), first);
        }
    }

    #[test]
    fn test_boundary_preserved() {
        let mut open = subdivide_midpoint(&unit_cube());
        // drop the top face (four triangles per original triangle)
        open.faces.drain(8..16);
        let before: HashSet<(u32, u32)> = EdgeTopology::build(&open.faces)
            .boundary_edges()
            .into_iter()
            .collect();
        let boundary_points: Vec<Point3> = before
            .iter()
            .flat_map(|&(a, b)| [open.vertices[a as usize], open.vertices[b as usize]])
            .collect();

        let reduced = decimate(&open, 20);
        for p in &boundary_points {
            assert!(reduced.vertices.iter().any(|q| (q - p).norm() < 1e-12));
        }
    }
}
