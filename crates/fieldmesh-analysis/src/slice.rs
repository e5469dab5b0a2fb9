//! Horizontal cross-sections.
//!
//! Every mesh edge that crosses the cutting plane contributes one contour
//! point, identified by the edge itself. Segments from adjacent faces meet
//! at the shared edge's point, so contours of a closed mesh chain up exactly
//! without any distance tolerance.

use std::collections::HashMap;

use fieldmesh_math::{Point2, Point3};
use fieldmesh_mesh::{topology::edge_key, TriangleMesh};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::path::Polygon;

/// Contours of one slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceLayer {
    /// Height of the cutting plane.
    pub z: f64,
    /// Position in the requested height list.
    pub index: usize,
    /// Closed contours, largest area first. Outer boundaries of a
    /// consistently wound mesh are counter-clockwise, holes clockwise.
    pub contours: Vec<Polygon>,
}

type Node = (u32, u32);

struct Segment {
    from: Node,
    to: Node,
}

/// Cut `mesh` with the plane at height `z`.
///
/// Returns an empty list when the plane misses the mesh. Vertices lying
/// exactly on the plane count as above it, so a plane touching only the
/// bottom face of a box yields nothing. Open boundary chains are dropped.
pub fn slice_horizontal(mesh: &TriangleMesh, z: f64) -> Vec<Polygon> {
    let mut positions: HashMap<Node, Point2> = HashMap::new();
    let mut segments = Vec::new();

    for (i, face) in mesh.faces.iter().enumerate() {
        let tri = mesh.triangle(i);
        let above = tri.map(|p| p.z >= z);
        if above.iter().all(|&a| a) || above.iter().all(|&a| !a) {
            continue;
        }

        let mut crossing = Vec::with_capacity(2);
        for k in 0..3 {
            let l = (k + 1) % 3;
            if above[k] == above[l] {
                continue;
            }
            let node = edge_key(face[k], face[l]);
            positions
                .entry(node)
                .or_insert_with(|| plane_point(mesh, node, z));
            crossing.push(node);
        }
        let [a, b] = [crossing[0], crossing[1]];

        // material lies to the left of the segment when seen from above
        let n = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
        let d = positions[&b] - positions[&a];
        let (from, to) = if d.y * n.x - d.x * n.y >= 0.0 {
            (a, b)
        } else {
            (b, a)
        };
        segments.push(Segment { from, to });
    }

    let mut contours = chain(&segments, &positions);
    contours.sort_by(|a, b| b.area().total_cmp(&a.area()));
    contours
}

/// Intersection of edge `node` with the plane, interpolated from its lower index.
fn plane_point(mesh: &TriangleMesh, (lo, hi): Node, z: f64) -> Point2 {
    let p: Point3 = mesh.vertices[lo as usize];
    let q: Point3 = mesh.vertices[hi as usize];
    let t = (z - p.z) / (q.z - p.z);
    Point2::new(p.x + t * (q.x - p.x), p.y + t * (q.y - p.y))
}

fn chain(segments: &[Segment], positions: &HashMap<Node, Point2>) -> Vec<Polygon> {
    let mut incident: HashMap<Node, Vec<usize>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        incident.entry(s.from).or_default().push(i);
        incident.entry(s.to).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();
    let mut open = 0usize;

    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let start = segments[seed].from;
        let mut current = segments[seed].to;
        let mut nodes = vec![start, current];
        let mut forward = 1i64;

        let closed = loop {
            if current == start {
                break true;
            }
            let next = incident
                .get(&current)
                .and_then(|segs| segs.iter().copied().find(|&s| !used[s]));
            let Some(s) = next else {
                break false;
            };
            used[s] = true;
            let seg = &segments[s];
            if seg.from == current {
                forward += 1;
                current = seg.to;
            } else {
                forward -= 1;
                current = seg.from;
            }
            nodes.push(current);
        };
        if !closed {
            open += 1;
            continue;
        }

        nodes.pop();
        let mut points: Vec<Point2> = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let p = positions[node];
            if points.last().map_or(true, |q| (p - q).norm() > 1e-12) {
                points.push(p);
            }
        }
        while points.len() > 1 && (points[0] - points[points.len() - 1]).norm() <= 1e-12 {
            points.pop();
        }
        if points.len() < 3 {
            continue;
        }
        let mut polygon = Polygon::new(points);
        if forward < 0 {
            polygon.reverse();
        }
        contours.push(polygon);
    }

    if open > 0 {
        debug!(open, "dropped open slice chains");
    }
    contours
}

/// Slice at every height in `heights`, in parallel. Layers keep input order.
pub fn slice_at_heights(mesh: &TriangleMesh, heights: &[f64]) -> Vec<SliceLayer> {
    heights
        .par_iter()
        .enumerate()
        .map(|(index, &z)| SliceLayer {
            z,
            index,
            contours: slice_horizontal(mesh, z),
        })
        .collect()
}

/// Evenly spaced layer heights through `[z_min, z_max]`, centred in each layer.
pub fn layer_heights(z_min: f64, z_max: f64, layer_height: f64) -> Vec<f64> {
    if layer_height.is_nan() || layer_height <= 0.0 || z_max <= z_min {
        return Vec::new();
    }
    let count = ((z_max - z_min) / layer_height).floor() as usize;
    (0..count)
        .map(|i| z_min + (i as f64 + 0.5) * layer_height)
        .collect()
}

/// Flatten contours into `[x, y]` points, contour by contour.
pub fn contour_points(contours: &[Polygon]) -> Vec<[f64; 2]> {
    contours
        .iter()
        .flat_map(|c| c.points.iter().map(|p| [p.x, p.y]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fieldmesh_mesh::{cuboid, unit_cube};

    #[test]
    fn test_cube_slice_is_one_square() {
        let contours = slice_horizontal(&unit_cube(), 0.5);
        assert_eq!(contours.len(), 1);
        let square = &contours[0];
        // four corners plus the midpoint of each wall diagonal
        assert_eq!(square.len(), 8);
        assert!(square.is_ccw());
        assert_relative_eq!(square.signed_area(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(square.perimeter(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverted_cube_gives_clockwise_contour() {
        let mut cube = unit_cube();
        cube.invert();
        let contours = slice_horizontal(&cube, 0.25);
        assert_eq!(contours.len(), 1);
        assert_relative_eq!(contours[0].signed_area(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_plane_misses_mesh() {
        assert!(slice_horizontal(&unit_cube(), 2.0).is_empty());
        assert!(slice_horizontal(&unit_cube(), -0.1).is_empty());
        assert!(slice_horizontal(&TriangleMesh::new(), 0.0).is_empty());
    }

    #[test]
    fn test_largest_contour_first() {
        let mut mesh = unit_cube();
        mesh.merge(&cuboid(Point3::new(2.0, 0.0, 0.0), Point3::new(5.0, 3.0, 1.0)));
        let contours = slice_horizontal(&mesh, 0.5);
        assert_eq!(contours.len(), 2);
        assert_relative_eq!(contours[0].area(), 9.0, epsilon = 1e-12);
        assert_relative_eq!(contours[1].area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_mesh_drops_chain() {
        let mut cube = unit_cube();
        // remove one side wall so the cross-section cannot close
        cube.faces.retain(|f| !(f.contains(&1) && f.contains(&6)));
        assert!(slice_horizontal(&cube, 0.5).is_empty());
    }

    #[test]
    fn test_slice_at_heights_keeps_order() {
        let heights = layer_heights(0.0, 1.0, 0.25);
        assert_eq!(heights, vec![0.125, 0.375, 0.625, 0.875]);
        let layers = slice_at_heights(&unit_cube(), &heights);
        assert_eq!(layers.len(), 4);
        for (i, layer) in layers.iter().enumerate() {
            assert_eq!(layer.index, i);
            assert_eq!(layer.z, heights[i]);
            assert_eq!(layer.contours.len(), 1);
        }
    }

    #[test]
    fn test_contour_points() {
        let contours = slice_horizontal(&unit_cube(), 0.5);
        let pts = contour_points(&contours);
        assert_eq!(pts.len(), 8);
        for [x, y] in pts {
            let on_edge = x.abs() < 1e-12
                || (x - 1.0).abs() < 1e-12
                || y.abs() < 1e-12
                || (y - 1.0).abs() < 1e-12;
            assert!(on_edge);
        }
    }
}
