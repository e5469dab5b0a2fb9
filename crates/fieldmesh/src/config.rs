//! TOML-loadable pipeline parameters.
//!
//! Every field has a default, so a document only needs the values it
//! changes:
//!
//! ```toml
//! [grid]
//! resolution = 48
//!
//! [boundary]
//! shape = "sphere"
//! radius_frac = 0.6
//!
//! [carve]
//! n_agents = 4
//! seed = 7
//! ```

use std::path::Path;

use fieldmesh_field::{BoundaryShape, CarveParams};
use fieldmesh_iso::IsoParams;
use fieldmesh_repair::{RepairOptions, ValidationOptions};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Lattice settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Samples per axis of the cubic lattice.
    pub resolution: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: fieldmesh_field::boundary::DEFAULT_RESOLUTION,
        }
    }
}

/// Printability analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Faces steeper than this many degrees past vertical overhang.
    pub overhang_angle: f64,
    /// Overhang percentage above which supports are required.
    pub support_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            overhang_angle: 45.0,
            support_threshold: fieldmesh_analysis::DEFAULT_SUPPORT_THRESHOLD,
        }
    }
}

/// Full parameter set for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Run repair automatically on meshes that fail validation.
    pub auto_repair: bool,
    /// Lattice size.
    pub grid: GridConfig,
    /// Region the carving agents are confined to.
    pub boundary: BoundaryShape,
    /// Carving agents.
    pub carve: CarveParams,
    /// Surface extraction.
    pub iso: IsoParams,
    /// Validation thresholds.
    pub validation: ValidationOptions,
    /// Repair applied when validation fails.
    pub repair: RepairOptions,
    /// Overhang analysis.
    pub analysis: AnalysisConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            auto_repair: true,
            grid: GridConfig::default(),
            boundary: BoundaryShape::default(),
            carve: CarveParams::default(),
            iso: IsoParams::default(),
            validation: ValidationOptions::default(),
            repair: RepairOptions::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
