//! Stage composition.

use std::path::Path;

use fieldmesh_analysis::{overhang_analysis_with_threshold, OverhangReport};
use fieldmesh_export::{export_mesh, ExportFormat};
use fieldmesh_field::{carve, Boundary, ScalarField, ValidityMask};
use fieldmesh_iso::extract_isosurface;
use fieldmesh_mesh::TriangleMesh;
use fieldmesh_repair::{
    repair_mesh_with_options, validate_mesh_with_options, RepairSummary, ValidationReport,
};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::Result;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Field after carving.
    pub carved: ScalarField,
    /// Final mesh, repaired if repair ran.
    pub mesh: TriangleMesh,
    /// Validation of the extracted mesh before any repair.
    pub initial_report: ValidationReport,
    /// Validation of the final mesh.
    pub report: ValidationReport,
    /// Repair statistics when repair ran.
    pub repair: Option<RepairSummary>,
    /// Overhang statistics of the final mesh.
    pub overhang: OverhangReport,
}

/// Runs carve, extract, validate, repair, and analyze in order.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Pipeline with the given parameters.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Parameters in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Boundary mask at the configured resolution.
    pub fn boundary(&self) -> Boundary {
        self.config.boundary.build(self.config.grid.resolution)
    }

    /// Solid field for the configured boundary: 1 inside, 0 outside.
    ///
    /// Useful as a starting field when no generator is at hand; carving it
    /// drills tunnels into the boundary shape.
    pub fn solid_field(&self) -> ScalarField {
        self.boundary().mask.to_field(1.0, 0.0)
    }

    /// Carve `field` within the configured boundary.
    pub fn carve(&self, field: &ScalarField) -> Result<ScalarField> {
        self.carve_with_mask(field, &self.boundary().mask)
    }

    /// Carve `field` within an explicit mask.
    pub fn carve_with_mask(&self, field: &ScalarField, mask: &ValidityMask) -> Result<ScalarField> {
        Ok(carve(field, mask, &self.config.carve)?)
    }

    /// Extract the isosurface of `field`.
    pub fn extract(&self, field: &ScalarField) -> Result<TriangleMesh> {
        Ok(extract_isosurface(field, &self.config.iso)?)
    }

    /// Validate `mesh`, then repair it if it fails and auto-repair is on.
    pub fn validate_and_repair(
        &self,
        mesh: TriangleMesh,
    ) -> (TriangleMesh, ValidationReport, Option<(RepairSummary, ValidationReport)>) {
        let report = validate_mesh_with_options(&mesh, &self.config.validation);
        if report.is_valid || !self.config.auto_repair || mesh.is_empty() {
            return (mesh, report, None);
        }

        warn!(errors = ?report.errors, "mesh failed validation, repairing");
        let (repaired, summary) = repair_mesh_with_options(&mesh, &self.config.repair);
        let after = validate_mesh_with_options(&repaired, &self.config.validation);
        if !after.is_valid {
            warn!(errors = ?after.errors, "mesh still invalid after repair");
        }
        (repaired, report, Some((summary, after)))
    }

    /// Overhang statistics for `mesh`.
    pub fn analyze(&self, mesh: &TriangleMesh) -> OverhangReport {
        let a = &self.config.analysis;
        overhang_analysis_with_threshold(mesh, a.overhang_angle, a.support_threshold)
    }

    /// Run every stage on `field` within the configured boundary.
    pub fn run(&self, field: &ScalarField) -> Result<PipelineOutput> {
        self.run_with_mask(field, &self.boundary().mask)
    }

    /// Run every stage on `field` within an explicit mask.
    pub fn run_with_mask(&self, field: &ScalarField, mask: &ValidityMask) -> Result<PipelineOutput> {
        let carved = self.carve_with_mask(field, mask)?;
        let mesh = self.extract(&carved)?;
        let (mesh, initial_report, repaired) = self.validate_and_repair(mesh);
        let (repair, report) = match repaired {
            Some((summary, after)) => (Some(summary), after),
            None => (None, initial_report.clone()),
        };
        let overhang = self.analyze(&mesh);

        info!(
            vertices = mesh.num_vertices(),
            faces = mesh.num_faces(),
            valid = report.is_valid,
            overhang = overhang.overhang_percentage,
            "pipeline complete"
        );
        Ok(PipelineOutput {
            carved,
            mesh,
            initial_report,
            report,
            repair,
            overhang,
        })
    }
}

impl PipelineOutput {
    /// Write the final mesh to `path`.
    pub fn export(&self, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        Ok(export_mesh(&self.mesh, path, format)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fieldmesh_field::{sphere_mask, BoundaryShape, CarveParams, FieldError};
    use fieldmesh_iso::IsoParams;
    use fieldmesh_repair::validate_mesh;
    use std::f64::consts::PI;

    fn carve_config(seed: u64) -> PipelineConfig {
        PipelineConfig {
            grid: crate::config::GridConfig { resolution: 32 },
            boundary: BoundaryShape::Sphere { radius_frac: 0.7 },
            carve: CarveParams {
                n_agents: 1,
                agent_steps: 20,
                radius: 2.0,
                reduction_factor: 0.3,
                seed: Some(seed),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_carving_is_deterministic() {
        let field = ScalarField::filled([32, 32, 32], 1.0);
        let a = Pipeline::new(carve_config(42)).carve(&field).unwrap();
        let b = Pipeline::new(carve_config(42)).carve(&field).unwrap();
        let c = Pipeline::new(carve_config(43)).carve(&field).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_slice().iter().any(|&v| v < 1.0));
    }

    #[test]
    fn test_carving_stays_inside_boundary() {
        let pipeline = Pipeline::new(carve_config(5));
        let field = ScalarField::filled([32, 32, 32], 1.0);
        let carved = pipeline.carve(&field).unwrap();
        let mask = pipeline.boundary().mask;
        // a 2-cell brush can reach at most two cells past the mask
        let reach = sphere_mask(32, 0.7 + 2.0 * 2.0 / 31.0 + 1e-9);
        for ((&v, &inside), &near) in carved
            .as_slice()
            .iter()
            .zip(mask.as_slice())
            .zip(reach.as_slice())
        {
            if v < 1.0 {
                assert!(inside || near);
            }
        }
    }

    #[test]
    fn test_shape_mismatch_is_field_error() {
        let pipeline = Pipeline::new(carve_config(1));
        let field = ScalarField::filled([16, 16, 16], 1.0);
        let err = pipeline.run(&field).unwrap_err();
        assert!(matches!(
            err,
            crate::PipelineError::Field(FieldError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_sphere_end_to_end() {
        let n = 48;
        let config = PipelineConfig {
            grid: crate::config::GridConfig { resolution: n },
            boundary: BoundaryShape::Sphere { radius_frac: 0.5 },
            carve: CarveParams {
                n_agents: 0,
                ..Default::default()
            },
            iso: IsoParams {
                smooth: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let pipeline = Pipeline::new(config);
        let out = pipeline.run(&pipeline.solid_field()).unwrap();

        assert!(out.report.is_watertight);
        assert!(out.report.is_valid);
        assert!(out.report.is_volume);
        assert!(out.repair.is_none());
        let r = 0.5 * (n - 1) as f64 / 2.0;
        let expected = 4.0 / 3.0 * PI * r.powi(3);
        assert_relative_eq!(out.report.volume.unwrap(), expected, max_relative = 0.05);
        // lower hemisphere faces point down
        assert!(out.overhang.overhang_percentage > 0.0);
        assert_eq!(out.overhang.total_faces, out.mesh.num_faces());
    }

    #[test]
    fn test_carved_sphere_stays_closed() {
        let config = PipelineConfig {
            grid: crate::config::GridConfig { resolution: 24 },
            boundary: BoundaryShape::Sphere { radius_frac: 0.8 },
            carve: CarveParams {
                n_agents: 3,
                agent_steps: 30,
                radius: 1.5,
                seed: Some(11),
                ..Default::default()
            },
            ..Default::default()
        };
        let pipeline = Pipeline::new(config);
        let out = pipeline.run(&pipeline.solid_field()).unwrap();
        assert!(!out.mesh.is_empty());
        assert!(out.carved.as_slice().iter().any(|&v| v > 0.0 && v < 1.0));
        assert!(out.report.is_watertight);
        assert!(out.mesh.normals.is_some());
        assert_eq!(validate_mesh(&out.mesh).is_valid, out.report.is_valid);
    }

    #[test]
    fn test_repair_runs_on_invalid_mesh() {
        let pipeline = Pipeline::default();
        let mut open = fieldmesh_mesh::unit_cube();
        open.faces.truncate(10);
        let (mesh, before, repaired) = pipeline.validate_and_repair(open);
        assert!(!before.is_valid);
        let (summary, after) = repaired.unwrap();
        assert_eq!(summary.holes_filled, 1);
        assert!(after.is_valid);
        assert_eq!(mesh.num_faces(), 12);
    }

    #[test]
    fn test_auto_repair_off() {
        let pipeline = Pipeline::new(PipelineConfig {
            auto_repair: false,
            ..Default::default()
        });
        let mut open = fieldmesh_mesh::unit_cube();
        open.faces.truncate(10);
        let (mesh, report, repaired) = pipeline.validate_and_repair(open);
        assert!(!report.is_valid);
        assert!(repaired.is_none());
        assert_eq!(mesh.num_faces(), 10);
    }
}
