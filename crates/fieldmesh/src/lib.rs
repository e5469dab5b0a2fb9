#![warn(missing_docs)]

//! fieldmesh: scalar fields to printable meshes.
//!
//! Carving agents perforate a field inside a boundary mask, the carved field
//! is turned into a triangle mesh at an isovalue, and the mesh is validated,
//! repaired when needed, and checked for overhangs. [`Pipeline`] runs the
//! stages from one [`PipelineConfig`], which loads from TOML.
//!
//! # Example
//!
//! ```rust,no_run
//! use fieldmesh::{ExportFormat, Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_toml_str(
//!     r#"
//!     [grid]
//!     resolution = 48
//!
//!     [carve]
//!     n_agents = 6
//!     seed = 42
//!     "#,
//! )
//! .unwrap();
//! let pipeline = Pipeline::new(config);
//! let out = pipeline.run(&pipeline.solid_field()).unwrap();
//! println!("{}", out.report);
//! out.export("vase.stl", ExportFormat::Stl).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{AnalysisConfig, GridConfig, PipelineConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutput};

pub use fieldmesh_analysis;
pub use fieldmesh_export;
pub use fieldmesh_field;
pub use fieldmesh_iso;
pub use fieldmesh_math;
pub use fieldmesh_mesh;
pub use fieldmesh_repair;

pub use fieldmesh_analysis::{overhang_analysis, slice_horizontal, OverhangReport, Polygon};
pub use fieldmesh_export::{export_mesh, export_mesh_auto, ExportError, ExportFormat};
pub use fieldmesh_field::{
    box_mask, carve, cylinder_mask, sphere_mask, vase_mask, BoundaryShape, CarveParams,
    FieldError, ScalarField, ValidityMask,
};
pub use fieldmesh_iso::{extract_isosurface, IsoError, IsoParams};
pub use fieldmesh_mesh::TriangleMesh;
pub use fieldmesh_repair::{repair_mesh, validate_mesh, RepairOptions, ValidationReport};
