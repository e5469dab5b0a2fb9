//! Agent-based carving.
//!
//! Random-walk agents roam the valid region of a mask and attenuate every
//! sample within `radius` of their position at each step. Repeated visits
//! compound, so heavily travelled regions fall furthest below the
//! isovalue and open up into tunnels once the field is meshed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FieldError, Result};
use crate::grid::{ScalarField, ValidityMask};

/// Parameters for [`carve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarveParams {
    /// Number of agents, run one after another.
    pub n_agents: usize,
    /// Steps each agent takes.
    pub agent_steps: usize,
    /// Carving radius in lattice units.
    pub radius: f64,
    /// Multiplier applied to each sample within the radius, per step.
    pub reduction_factor: f64,
    /// RNG seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for CarveParams {
    fn default() -> Self {
        Self {
            n_agents: 10,
            agent_steps: 100,
            radius: 1.0,
            reduction_factor: 0.3,
            seed: None,
        }
    }
}

impl CarveParams {
    /// Check that the radius and reduction factor are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(FieldError::InvalidParameter(format!(
                "carve radius must be finite and non-negative, got {}",
                self.radius
            )));
        }
        if !(0.0..=1.0).contains(&self.reduction_factor) {
            return Err(FieldError::InvalidParameter(format!(
                "reduction_factor must be in [0, 1], got {}",
                self.reduction_factor
            )));
        }
        Ok(())
    }
}

/// Carve `field` with random-walk agents confined to `mask`.
///
/// Returns a new field; the input is untouched. With no agents, no steps,
/// or an empty mask the result is an unmodified copy.
///
/// # Errors
///
/// [`FieldError::ShapeMismatch`] when the mask and field shapes differ, and
/// [`FieldError::InvalidParameter`] for an unusable radius or reduction factor.
pub fn carve(field: &ScalarField, mask: &ValidityMask, params: &CarveParams) -> Result<ScalarField> {
    if mask.shape() != field.shape() {
        return Err(FieldError::ShapeMismatch {
            field: field.shape(),
            mask: mask.shape(),
        });
    }

    let mut out = field.clone();
    if params.n_agents == 0 || params.agent_steps == 0 {
        return Ok(out);
    }

    let cells = mask.cells();
    if cells.is_empty() {
        debug!("carve: mask has no valid cells, returning field unchanged");
        return Ok(out);
    }

    params.validate()?;

    let mut rng = match params.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let shape = field.shape();
    let mut restarts = 0usize;

    for _ in 0..params.n_agents {
        let mut pos = random_cell(&cells, &mut rng);
        for _ in 0..params.agent_steps {
            carve_sphere(&mut out, pos, params.radius, params.reduction_factor);

            for axis in 0..3 {
                let delta = rng.gen_range(-1i32..=1) as f64;
                pos[axis] = (pos[axis] + delta).clamp(0.0, (shape[axis] - 1) as f64);
            }

            let cell = [pos[0] as usize, pos[1] as usize, pos[2] as usize];
            if !mask[cell] {
                pos = random_cell(&cells, &mut rng);
                restarts += 1;
            }
        }
    }

    debug!(
        agents = params.n_agents,
        steps = params.agent_steps,
        restarts,
        "carve complete"
    );

    Ok(out)
}

fn random_cell(cells: &[[usize; 3]], rng: &mut impl Rng) -> [f64; 3] {
    let [x, y, z] = cells[rng.gen_range(0..cells.len())];
    [x as f64, y as f64, z as f64]
}

/// Multiply every sample within `radius` of `pos` by `factor`.
fn carve_sphere(field: &mut ScalarField, pos: [f64; 3], radius: f64, factor: f64) {
    let shape = field.shape();
    let mut lo = [0usize; 3];
    let mut hi = [0usize; 3];
    for axis in 0..3 {
        lo[axis] = (pos[axis] - radius).trunc().max(0.0) as usize;
        hi[axis] = ((pos[axis] + radius + 1.0).trunc() as usize).min(shape[axis]);
    }

    let r2 = radius * radius;
    for x in lo[0]..hi[0] {
        let dx = x as f64 - pos[0];
        for y in lo[1]..hi[1] {
            let dy = y as f64 - pos[1];
            for z in lo[2]..hi[2] {
                let dz = z as f64 - pos[2];
                if dx * dx + dy * dy + dz * dz <= r2 {
                    field[[x, y, z]] *= factor;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{box_mask, sphere_mask};

    fn seeded(seed: u64) -> CarveParams {
        CarveParams {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_mask_is_noop() {
        let field = ScalarField::filled([8, 8, 8], 1.0);
        let mask = ValidityMask::filled([8, 8, 8], false);
        assert_eq!(carve(&field, &mask, &seeded(1)).unwrap(), field);
    }

    #[test]
    fn test_zero_agents_or_steps_is_noop() {
        let field = ScalarField::filled([8, 8, 8], 1.0);
        let mask = ValidityMask::full([8, 8, 8]);
        let params = CarveParams {
            n_agents: 0,
            ..seeded(1)
        };
        assert_eq!(carve(&field, &mask, &params).unwrap(), field);
        let params = CarveParams {
            agent_steps: 0,
            ..seeded(1)
        };
        assert_eq!(carve(&field, &mask, &params).unwrap(), field);
    }

    #[test]
    fn test_shape_mismatch() {
        let field = ScalarField::filled([8, 8, 8], 1.0);
        let mask = ValidityMask::full([8, 8, 4]);
        let err = carve(&field, &mask, &seeded(1)).unwrap_err();
        assert!(matches!(err, FieldError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_invalid_parameters() {
        let field = ScalarField::filled([4, 4, 4], 1.0);
        let mask = ValidityMask::full([4, 4, 4]);
        let params = CarveParams {
            reduction_factor: 1.5,
            ..seeded(1)
        };
        assert!(matches!(
            carve(&field, &mask, &params),
            Err(FieldError::InvalidParameter(_))
        ));
        let params = CarveParams {
            radius: f64::NAN,
            ..seeded(1)
        };
        assert!(carve(&field, &mask, &params).is_err());
    }

    #[test]
    fn test_carving_only_decreases() {
        let field = ScalarField::filled([16, 16, 16], 1.0);
        let mask = sphere_mask(16, 0.8);
        let carved = carve(&field, &mask, &seeded(7)).unwrap();
        assert!(carved.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(carved.as_slice().iter().any(|&v| v < 1.0));
        // input untouched
        assert!(field.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_graded_field_never_grows() {
        let field = ScalarField::from_fn([16, 16, 16], |x, y, z| (x + y + z) as f64);
        let mask = sphere_mask(16, 0.8);
        let carved = carve(&field, &mask, &seeded(11)).unwrap();
        let mut lowered = 0;
        for (i, (&after, &before)) in carved.as_slice().iter().zip(field.as_slice()).enumerate() {
            assert!(after <= before, "cell {:?} grew from {before} to {after}", carved.coords(i));
            if after < before {
                lowered += 1;
            }
        }
        assert!(lowered > 0);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let field = ScalarField::filled([16, 16, 16], 1.0);
        let mask = box_mask(16, 0.6);
        let a = carve(&field, &mask, &seeded(42)).unwrap();
        let b = carve(&field, &mask, &seeded(42)).unwrap();
        let c = carve(&field, &mask, &seeded(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_radius_stays_inside_mask() {
        let field = ScalarField::filled([12, 12, 12], 1.0);
        let mask = box_mask(12, 0.5);
        let params = CarveParams {
            radius: 0.0,
            n_agents: 5,
            agent_steps: 200,
            ..seeded(3)
        };
        let carved = carve(&field, &mask, &params).unwrap();
        for (i, &v) in carved.as_slice().iter().enumerate() {
            let cell = carved.coords(i);
            if !mask[cell] {
                assert_eq!(v, 1.0, "cell {cell:?} outside mask was carved");
            }
        }
        assert!(carved.as_slice().iter().any(|&v| v < 1.0));
    }

    #[test]
    fn test_unit_reduction_factor_leaves_field() {
        let field = ScalarField::from_fn([6, 6, 6], |x, y, z| (x + y + z) as f64);
        let mask = ValidityMask::full([6, 6, 6]);
        let params = CarveParams {
            reduction_factor: 1.0,
            ..seeded(9)
        };
        assert_eq!(carve(&field, &mask, &params).unwrap(), field);
    }

    #[test]
    fn test_carve_sphere_compounds() {
        let mut field = ScalarField::filled([5, 5, 5], 1.0);
        carve_sphere(&mut field, [2.0, 2.0, 2.0], 1.0, 0.5);
        carve_sphere(&mut field, [2.0, 2.0, 2.0], 1.0, 0.5);
        assert_eq!(field[[2, 2, 2]], 0.25);
        assert_eq!(field[[2, 2, 3]], 0.25);
        // diagonal neighbour is sqrt(2) away
        assert_eq!(field[[3, 3, 2]], 1.0);
    }
}
