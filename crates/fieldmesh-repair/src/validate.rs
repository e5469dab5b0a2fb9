//! Mesh validation.
//!
//! [`validate_mesh`] inspects one mesh snapshot and returns an immutable
//! [`ValidationReport`]. Only missing watertightness, degenerate faces, and
//! faces with out-of-range vertex indices make a mesh invalid; every other
//! finding is advisory.

use std::collections::HashSet;
use std::fmt;

use fieldmesh_mesh::{Bounds, EdgeTopology, TriangleMesh};
use serde::{Deserialize, Serialize};

/// Error recorded when the mesh has open edges.
pub const NOT_WATERTIGHT: &str = "Mesh is not watertight (has holes)";

/// Validation thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Faces with area at or below this are degenerate.
    pub degenerate_area_tolerance: f64,
    /// The self-intersection heuristic only runs below this face count.
    pub self_intersection_face_limit: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            degenerate_area_tolerance: 1e-8,
            self_intersection_face_limit: 50_000,
        }
    }
}

/// Bounding box extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Extent along x.
    pub x: f64,
    /// Extent along y.
    pub y: f64,
    /// Extent along z.
    pub z: f64,
}

/// Findings for one mesh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Watertight and free of degenerate faces.
    pub is_valid: bool,
    /// Every edge is shared by exactly two faces.
    pub is_watertight: bool,
    /// No directed edge is used twice.
    pub is_winding_consistent: bool,
    /// Watertight, consistently wound, and positive volume.
    pub is_volume: bool,
    /// Vertex count.
    pub num_vertices: usize,
    /// Face count.
    pub num_faces: usize,
    /// Edges used by exactly one face.
    pub boundary_edges: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edges: usize,
    /// Faces referring to a vertex that does not exist.
    pub invalid_faces: usize,
    /// Faces with area at or below tolerance.
    pub degenerate_faces: usize,
    /// Vertices sharing an exact position with an earlier vertex.
    pub duplicate_vertices: usize,
    /// Total face area.
    pub surface_area: f64,
    /// Enclosed volume, present only when the mesh is a volume.
    pub volume: Option<f64>,
    /// Vertex bounds, absent for a mesh with no vertices.
    pub bounds: Option<Bounds>,
    /// Bounds extents, zero for a mesh with no vertices.
    pub dimensions: Dimensions,
    /// Advisory findings, in check order.
    pub warnings: Vec<String>,
    /// Findings that make the mesh invalid, in check order.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// At least one degenerate face was found.
    pub fn has_degenerate_faces(&self) -> bool {
        self.degenerate_faces > 0
    }

    /// At least one duplicated vertex position was found.
    pub fn has_duplicate_vertices(&self) -> bool {
        self.duplicate_vertices > 0
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        writeln!(
            f,
            "Mesh: {} vertices, {} faces",
            self.num_vertices, self.num_faces
        )?;
        writeln!(f, "  valid:      {}", yes_no(self.is_valid))?;
        writeln!(f, "  watertight: {}", yes_no(self.is_watertight))?;
        writeln!(f, "  winding:    {}", yes_no(self.is_winding_consistent))?;
        writeln!(f, "  volume:     {}", yes_no(self.is_volume))?;
        writeln!(
            f,
            "  size:       {:.3} x {:.3} x {:.3}",
            self.dimensions.x, self.dimensions.y, self.dimensions.z
        )?;
        for e in &self.errors {
            writeln!(f, "  error: {e}")?;
        }
        for w in &self.warnings {
            writeln!(f, "  warning: {w}")?;
        }
        Ok(())
    }
}

/// Validate with default options.
pub fn validate_mesh(mesh: &TriangleMesh) -> ValidationReport {
    validate_mesh_with_options(mesh, &ValidationOptions::default())
}

/// Validate `mesh` against `options`.
pub fn validate_mesh_with_options(
    mesh: &TriangleMesh,
    options: &ValidationOptions,
) -> ValidationReport {
    let num_faces = mesh.num_faces();
    let n = mesh.num_vertices();
    let in_range = |f: &[u32; 3]| f.iter().all(|&v| (v as usize) < n);
    let invalid_faces = mesh.faces.iter().filter(|f| !in_range(*f)).count();
    // geometry is measured over the faces that can be resolved
    let filtered;
    let mesh = if invalid_faces > 0 {
        filtered = TriangleMesh::from_parts(
            mesh.vertices.clone(),
            mesh.faces.iter().copied().filter(|f| in_range(f)).collect(),
        );
        &filtered
    } else {
        mesh
    };

    let topo = EdgeTopology::build(&mesh.faces);
    let is_watertight = topo.is_watertight();
    let is_winding_consistent = topo.is_winding_consistent();
    let signed_volume = mesh.signed_volume();
    let is_volume = is_watertight && is_winding_consistent && signed_volume > 0.0;

    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    if !is_watertight {
        errors.push(NOT_WATERTIGHT.to_string());
    }
    if invalid_faces > 0 {
        errors.push(format!(
            "Found {invalid_faces} faces with out-of-range vertex indices"
        ));
    }
    if !is_winding_consistent {
        warnings.push("Face winding is inconsistent".to_string());
    }

    let face_areas = mesh.face_areas();
    let degenerate_faces = face_areas
        .iter()
        .filter(|&&a| a <= options.degenerate_area_tolerance)
        .count();
    if degenerate_faces > 0 {
        errors.push(format!(
            "Found {degenerate_faces} degenerate faces (zero area)"
        ));
    }

    let duplicate_vertices = count_duplicate_positions(mesh);
    if duplicate_vertices > 0 {
        warnings.push(format!("Found {duplicate_vertices} duplicate vertices"));
    }

    if num_faces < options.self_intersection_face_limit && !is_volume {
        warnings.push("Mesh may have self-intersections or is not a volume".to_string());
    }

    let bounds = mesh.bounds();
    let dimensions = bounds
        .map(|b| {
            let d = b.dimensions();
            Dimensions {
                x: d.x,
                y: d.y,
                z: d.z,
            }
        })
        .unwrap_or_default();

    ValidationReport {
        is_valid: is_watertight && degenerate_faces == 0 && invalid_faces == 0,
        is_watertight,
        is_winding_consistent,
        is_volume,
        num_vertices: mesh.num_vertices(),
        num_faces,
        boundary_edges: topo.boundary_edges().len(),
        non_manifold_edges: topo.non_manifold_edges(),
        invalid_faces,
        degenerate_faces,
        duplicate_vertices,
        surface_area: face_areas.iter().sum(),
        volume: is_volume.then_some(signed_volume),
        bounds,
        dimensions,
        warnings,
        errors,
    }
}

/// Vertices whose exact position already appeared earlier. `-0.0` equals `0.0`.
fn count_duplicate_positions(mesh: &TriangleMesh) -> usize {
    let key = |c: f64| if c == 0.0 { 0.0f64.to_bits() } else { c.to_bits() };
    let unique: HashSet<[u64; 3]> = mesh
        .vertices
        .iter()
        .map(|p| [key(p.x), key(p.y), key(p.z)])
        .collect();
    mesh.num_vertices() - unique.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fieldmesh_math::Point3;
    use fieldmesh_mesh::unit_cube;

    #[test]
    fn test_closed_cube_is_valid() {
        let report = validate_mesh(&unit_cube());
        assert!(report.is_valid);
        assert!(report.is_watertight);
        assert!(report.is_winding_consistent);
        assert!(report.is_volume);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert_relative_eq!(report.volume.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.surface_area, 6.0, epsilon = 1e-12);
        assert_eq!(
            report.dimensions,
            Dimensions {
                x: 1.0,
                y: 1.0,
                z: 1.0
            }
        );
    }

    #[test]
    fn test_open_cube_not_watertight() {
        let mut cube = unit_cube();
        cube.faces.truncate(10);
        let report = validate_mesh(&cube);
        assert!(!report.is_valid);
        assert!(!report.is_watertight);
        assert!(!report.is_volume);
        assert!(report.volume.is_none());
        assert_eq!(report.errors, vec![NOT_WATERTIGHT.to_string()]);
        assert_eq!(report.boundary_edges, 4);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("self-intersections")));
    }

    #[test]
    fn test_inverted_cube_is_not_volume_but_valid() {
        let mut cube = unit_cube();
        cube.invert();
        let report = validate_mesh(&cube);
        assert!(report.is_valid);
        assert!(report.is_winding_consistent);
        assert!(!report.is_volume);
        assert!(report.volume.is_none());
    }

    #[test]
    fn test_flipped_face_warns_only() {
        let mut cube = unit_cube();
        cube.flip_face(0);
        let report = validate_mesh(&cube);
        assert!(report.is_valid);
        assert!(!report.is_winding_consistent);
        assert_eq!(report.warnings[0], "Face winding is inconsistent");
    }

    #[test]
    fn test_degenerate_faces_invalidate() {
        let mut cube = unit_cube();
        // collinear sliver attached to existing vertices
        cube.vertices.push(Point3::new(0.5, 0.0, 0.0));
        cube.faces.push([0, 8, 1]);
        let report = validate_mesh(&cube);
        assert!(!report.is_valid);
        assert_eq!(report.degenerate_faces, 1);
        assert!(report.has_degenerate_faces());
        assert!(report
            .errors
            .contains(&"Found 1 degenerate faces (zero area)".to_string()));
    }

    #[test]
    fn test_out_of_range_index_reported() {
        let mut cube = unit_cube();
        cube.faces.push([0, 1, 99]);
        let report = validate_mesh(&cube);
        assert!(!report.is_valid);
        assert_eq!(report.invalid_faces, 1);
        assert_eq!(report.num_faces, 13);
        assert!(report.is_watertight);
        assert_relative_eq!(report.surface_area, 6.0, epsilon = 1e-12);
        assert_eq!(
            report.errors,
            vec!["Found 1 faces with out-of-range vertex indices".to_string()]
        );
    }

    #[test]
    fn test_duplicate_vertices_warn() {
        let mut cube = unit_cube();
        cube.vertices.push(Point3::new(1.0, 1.0, 1.0));
        cube.vertices.push(Point3::new(-0.0, 0.0, 0.0));
        let report = validate_mesh(&cube);
        assert_eq!(report.duplicate_vertices, 2);
        assert!(report.is_valid);
        assert!(report
            .warnings
            .contains(&"Found 2 duplicate vertices".to_string()));
    }

    #[test]
    fn test_empty_mesh() {
        let report = validate_mesh(&TriangleMesh::new());
        assert!(!report.is_watertight);
        assert!(!report.is_valid);
        assert!(report.bounds.is_none());
        assert_eq!(report.dimensions, Dimensions::default());
        assert_eq!(report.surface_area, 0.0);
    }

    #[test]
    fn test_self_intersection_limit() {
        let mut cube = unit_cube();
        cube.faces.truncate(10);
        let options = ValidationOptions {
            self_intersection_face_limit: 5,
            ..Default::default()
        };
        let report = validate_mesh_with_options(&cube, &options);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_report_json() {
        let report = validate_mesh(&unit_cube());
        let json = report.to_json().unwrap();
        let back: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_faces, 12);
        assert!(json.contains("\"is_watertight\": true"));
    }
}
