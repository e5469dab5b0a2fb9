//! Best-effort repair pipeline.

use std::collections::{HashMap, HashSet};

use fieldmesh_math::{triangle_area, Point3};
use fieldmesh_mesh::{EdgeTopology, TriangleMesh};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::holes::fill_holes;
use crate::winding::fix_winding;

/// Repair settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOptions {
    /// Vertices closer than this are merged.
    pub weld_tolerance: f64,
    /// Faces with area at or below this are dropped.
    pub degenerate_area_tolerance: f64,
    /// Attempt to close holes when the mesh is not watertight.
    pub fill_holes: bool,
    /// Largest hole, in edges, that will be filled.
    pub max_hole_edges: usize,
    /// Re-orient faces when winding is inconsistent.
    pub fix_winding: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            weld_tolerance: 1e-8,
            degenerate_area_tolerance: 1e-8,
            fill_holes: true,
            max_hole_edges: 64,
            fix_winding: true,
        }
    }
}

/// What a repair pass changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairSummary {
    /// Faces dropped for referring to a vertex that does not exist.
    pub invalid_faces_removed: usize,
    /// Vertices merged into another vertex.
    pub vertices_welded: usize,
    /// Faces dropped for repeated indices or zero area.
    pub degenerate_faces_removed: usize,
    /// Faces dropped as copies of an earlier face.
    pub duplicate_faces_removed: usize,
    /// Vertices dropped because no face used them.
    pub unreferenced_vertices_removed: usize,
    /// Holes closed.
    pub holes_filled: usize,
    /// Faces whose orientation was reversed.
    pub faces_flipped: usize,
    /// Hole-filling failure, if one occurred.
    pub hole_fill_error: Option<String>,
}

impl RepairSummary {
    /// True if any step modified the mesh.
    pub fn had_changes(&self) -> bool {
        self.invalid_faces_removed > 0
            || self.vertices_welded > 0
            || self.degenerate_faces_removed > 0
            || self.duplicate_faces_removed > 0
            || self.unreferenced_vertices_removed > 0
            || self.holes_filled > 0
            || self.faces_flipped > 0
    }
}

/// Repair with default options.
///
/// Never fails; re-validate the result to learn whether it succeeded.
pub fn repair_mesh(mesh: &TriangleMesh) -> TriangleMesh {
    repair_mesh_with_options(mesh, &RepairOptions::default()).0
}

/// Run the repair pipeline on a copy of `mesh`.
///
/// Steps, in order: drop faces with out-of-range indices, weld coincident
/// vertices, drop degenerate faces, drop
/// duplicate faces, drop unreferenced vertices, fill holes when not
/// watertight, fix winding when inconsistent, recompute vertex normals.
pub fn repair_mesh_with_options(
    mesh: &TriangleMesh,
    options: &RepairOptions,
) -> (TriangleMesh, RepairSummary) {
    let mut out = TriangleMesh::from_parts(mesh.vertices.clone(), mesh.faces.clone());
    let mut summary = RepairSummary {
        invalid_faces_removed: remove_invalid_faces(&mut out),
        ..Default::default()
    };
    summary.vertices_welded = weld_vertices(&mut out, options.weld_tolerance);
    summary.degenerate_faces_removed =
        remove_degenerate_faces(&mut out, options.degenerate_area_tolerance);
    summary.duplicate_faces_removed = remove_duplicate_faces(&mut out);
    summary.unreferenced_vertices_removed = remove_unreferenced_vertices(&mut out);

    if options.fill_holes && !out.is_empty() && !EdgeTopology::build(&out.faces).is_watertight() {
        match fill_holes(&mut out, options.max_hole_edges) {
            Ok(n) => summary.holes_filled = n,
            Err(e) => {
                warn!(error = %e, "hole filling failed, continuing without it");
                summary.hole_fill_error = Some(e.to_string());
            }
        }
    }

    if options.fix_winding && !EdgeTopology::build(&out.faces).is_winding_consistent() {
        summary.faces_flipped = fix_winding(&mut out);
    }

    out.compute_vertex_normals();
    info!(
        invalid = summary.invalid_faces_removed,
        welded = summary.vertices_welded,
        degenerate = summary.degenerate_faces_removed,
        duplicate = summary.duplicate_faces_removed,
        holes = summary.holes_filled,
        flipped = summary.faces_flipped,
        "repair complete"
    );
    (out, summary)
}

fn cell_of(p: &Point3, size: f64) -> (i64, i64, i64) {
    (
        (p.x / size).floor() as i64,
        (p.y / size).floor() as i64,
        (p.z / size).floor() as i64,
    )
}

/// Merge vertices within `tolerance` of an earlier vertex. Returns the number merged.
pub fn weld_vertices(mesh: &mut TriangleMesh, tolerance: f64) -> usize {
    if mesh.vertices.is_empty() || tolerance.is_nan() || tolerance <= 0.0 {
        return 0;
    }
    let size = tolerance * 2.0;
    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    let mut remap = Vec::with_capacity(mesh.vertices.len());
    let mut kept: Vec<Point3> = Vec::new();

    for p in &mesh.vertices {
        let (cx, cy, cz) = cell_of(p, size);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    if let Some(&k) = candidates
                        .iter()
                        .find(|&&k| (kept[k as usize] - p).norm() < tolerance)
                    {
                        found = Some(k);
                        break 'search;
                    }
                }
            }
        }
        let idx = found.unwrap_or_else(|| {
            let k = kept.len() as u32;
            kept.push(*p);
            grid.entry((cx, cy, cz)).or_default().push(k);
            k
        });
        remap.push(idx);
    }

    let merged = mesh.vertices.len() - kept.len();
    if merged > 0 {
        for f in &mut mesh.faces {
            *f = f.map(|v| remap[v as usize]);
        }
        mesh.vertices = kept;
        mesh.normals = None;
        debug!(merged, "welded vertices");
    }
    merged
}

/// Drop faces referring to a vertex index past the end of the vertex list.
pub fn remove_invalid_faces(mesh: &mut TriangleMesh) -> usize {
    let before = mesh.faces.len();
    let n = mesh.vertices.len();
    mesh.faces.retain(|f| f.iter().all(|&v| (v as usize) < n));
    let removed = before - mesh.faces.len();
    if removed > 0 {
        warn!(removed, "dropped faces with out-of-range vertex indices");
    }
    removed
}

/// Drop faces with repeated indices or area at or below `area_tolerance`.
pub fn remove_degenerate_faces(mesh: &mut TriangleMesh, area_tolerance: f64) -> usize {
    let before = mesh.faces.len();
    let vertices = &mesh.vertices;
    mesh.faces.retain(|&[a, b, c]| {
        a != b
            && b != c
            && a != c
            && triangle_area(
                &vertices[a as usize],
                &vertices[b as usize],
                &vertices[c as usize],
            ) > area_tolerance
    });
    before - mesh.faces.len()
}

/// Drop faces using the same three vertices as an earlier face, in either orientation.
pub fn remove_duplicate_faces(mesh: &mut TriangleMesh) -> usize {
    let before = mesh.faces.len();
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(before);
    mesh.faces.retain(|f| {
        let mut key = *f;
        key.sort_unstable();
        seen.insert(key)
    });
    before - mesh.faces.len()
}

/// Drop vertices no face refers to, compacting indices.
pub fn remove_unreferenced_vertices(mesh: &mut TriangleMesh) -> usize {
    let mut used = vec![false; mesh.vertices.len()];
    for f in &mesh.faces {
        for &v in f {
            used[v as usize] = true;
        }
    }
    let removed = used.iter().filter(|&&u| !u).count();
    if removed == 0 {
        return 0;
    }

    let mut remap = vec![u32::MAX; mesh.vertices.len()];
    let mut next = 0u32;
    for (i, &u) in used.iter().enumerate() {
        if u {
            remap[i] = next;
            next += 1;
        }
    }
    let mut i = 0;
    mesh.vertices.retain(|_| {
        let keep = used[i];
        i += 1;
        keep
    });
    if let Some(normals) = &mut mesh.normals {
        let mut i = 0;
        normals.retain(|_| {
            let keep = used[i];
            i += 1;
            keep
        });
    }
    for f in &mut mesh.faces {
        *f = f.map(|v| remap[v as usize]);
    }
    removed
}
