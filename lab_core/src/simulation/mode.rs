//! Mode Adaptation
//!
//! Rescales a material's modulus and strength quantities into curve-native
//! units for the requested test mode. Tension and compression use the
//! axial values as-is; torsion converts to shear quantities via isotropic
//! elasticity and the Von Mises yield criterion.

use serde::{Deserialize, Serialize};

use crate::errors::{SimError, SimResult};
use crate::materials::MaterialSpec;
use crate::simulation::TestMode;

/// Von Mises shear-yield approximation, 1/sqrt(3)
const VON_MISES_SHEAR_FACTOR: f64 = 0.577;

/// Ultimate shear strength as a fraction of axial ultimate
const TORSION_ULTIMATE_FACTOR: f64 = 0.6;

/// Modulus and strength quantities in curve-native units.
///
/// For tension/compression these are the axial values (MPa vs. strain);
/// for torsion they are shear values (MPa vs. shear angle in radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeScaled {
    /// Elastic or shear modulus (MPa)
    pub modulus_mpa: f64,
    /// Yield point in curve-native stress (MPa)
    pub yield_point_mpa: f64,
    /// Ultimate point in curve-native stress (MPa)
    pub ultimate_point_mpa: f64,
}

/// Rescale a resolved material spec for the requested test mode.
///
/// Torsion derives the shear modulus `G = E / (2(1+nu))`; a Poisson ratio
/// at or below -1 makes that denominator non-positive and fails with
/// `InvalidSpec`.
pub fn adapt(spec: &MaterialSpec, mode: TestMode) -> SimResult<ModeScaled> {
    match mode {
        TestMode::Tension | TestMode::Compression => Ok(ModeScaled {
            modulus_mpa: spec.elastic_modulus_mpa,
            yield_point_mpa: spec.yield_strength_mpa,
            ultimate_point_mpa: spec.ultimate_strength_mpa,
        }),
        TestMode::Torsion => {
            if spec.poisson_ratio <= -1.0 {
                return Err(SimError::invalid_spec(
                    "poisson_ratio",
                    spec.poisson_ratio.to_string(),
                    "Shear modulus undefined for poisson_ratio <= -1",
                ));
            }
            Ok(ModeScaled {
                modulus_mpa: spec.elastic_modulus_mpa / (2.0 * (1.0 + spec.poisson_ratio)),
                yield_point_mpa: spec.yield_strength_mpa * VON_MISES_SHEAR_FACTOR,
                ultimate_point_mpa: spec.ultimate_strength_mpa * TORSION_ULTIMATE_FACTOR,
            })
        }
    }
}
