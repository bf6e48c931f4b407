//! Keypoint Construction
//!
//! Builds the ordered control-point sequence a test curve is interpolated
//! from: origin, yield, ultimate (ductile only), fracture, and a
//! post-fracture densification point for compression. The sequence must be
//! strictly increasing in strain; inputs that would collapse or reorder
//! points fail with `DegenerateCurve` instead of producing a garbled curve.

use serde::{Deserialize, Serialize};

use crate::errors::{SimError, SimResult};
use crate::simulation::mode::ModeScaled;
use crate::simulation::rupture::RuptureProfile;
use crate::simulation::TestMode;

/// Where between yield and rupture the hardening plateau reaches ultimate
const ULTIMATE_PLATEAU_FRACTION: f64 = 0.7;

/// Engineering stress retained at separation after post-necking softening
const NECKING_RESIDUAL_FACTOR: f64 = 0.85;

/// Compression densification point: strain and stress multipliers applied
/// to the machine limit and ultimate point
const DENSIFICATION_STRAIN_FACTOR: f64 = 1.5;
const DENSIFICATION_STRESS_FACTOR: f64 = 1.5;

/// Compression curves never truncate inside the visible domain; the
/// effective fracture strain sits past the end of machine travel
const COMPRESSION_TRUNCATION_FACTOR: f64 = 2.0;

/// A single control point on the stress-strain curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Strain (or shear angle, for torsion)
    pub strain: f64,
    /// Engineering stress magnitude (MPa)
    pub stress_mpa: f64,
}

/// Keypoint sequence plus the effective fracture strain the synthesizer
/// truncates at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointPlan {
    /// Strictly strain-increasing control points, anchored at the origin
    pub points: Vec<Keypoint>,
    /// Samples strictly beyond this strain are undefined (except compression)
    pub fracture_strain: f64,
}

impl KeypointPlan {
    /// Yield strain (second point of the sequence)
    pub fn yield_strain(&self) -> f64 {
        self.points[1].strain
    }
}

/// Build the keypoint sequence for one simulation.
///
/// Ductile materials get a strain-hardening plateau reaching ultimate at
/// 70% of the plastic range, then either a post-necking fracture point or,
/// for compression, an apparent-densification point past machine travel.
/// Brittle materials run elastic straight to fracture.
pub fn build(
    scaled: &ModeScaled,
    profile: &RuptureProfile,
    mode: TestMode,
    max_strain_machine: f64,
) -> SimResult<KeypointPlan> {
    let rupture = profile.intrinsic_rupture_strain;
    let yield_strain = scaled.yield_point_mpa / scaled.modulus_mpa;

    let mut points = vec![
        Keypoint {
            strain: 0.0,
            stress_mpa: 0.0,
        },
        Keypoint {
            strain: yield_strain,
            stress_mpa: scaled.yield_point_mpa,
        },
    ];

    let mut fracture_strain = rupture;

    if profile.is_brittle {
        // Elastic-to-fracture: no plastic plateau
        points.push(Keypoint {
            strain: rupture,
            stress_mpa: scaled.ultimate_point_mpa,
        });
    } else {
        let intermediate = yield_strain + ULTIMATE_PLATEAU_FRACTION * (rupture - yield_strain);
        points.push(Keypoint {
            strain: intermediate,
            stress_mpa: scaled.ultimate_point_mpa,
        });

        if mode == TestMode::Compression {
            // Compression specimens do not fracture in this model: the
            // section grows and the curve keeps stiffening past machine
            // travel, so truncation never triggers in the visible domain.
            points.push(Keypoint {
                strain: DENSIFICATION_STRAIN_FACTOR * max_strain_machine,
                stress_mpa: DENSIFICATION_STRESS_FACTOR * scaled.ultimate_point_mpa,
            });
            fracture_strain = COMPRESSION_TRUNCATION_FACTOR * max_strain_machine;
        } else {
            points.push(Keypoint {
                strain: rupture,
                stress_mpa: NECKING_RESIDUAL_FACTOR * scaled.ultimate_point_mpa,
            });
        }
    }

    ensure_strictly_increasing(&points)?;

    Ok(KeypointPlan {
        points,
        fracture_strain,
    })
}

fn ensure_strictly_increasing(points: &[Keypoint]) -> SimResult<()> {
    for pair in points.windows(2) {
        if pair[1].strain <= pair[0].strain {
            return Err(SimError::degenerate_curve(format!(
                "keypoint strains not strictly increasing: {:.6} then {:.6}",
                pair[0].strain, pair[1].strain
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn steel_scaled() -> ModeScaled {
        ModeScaled {
            modulus_mpa: 200_000.0,
            yield_point_mpa: 250.0,
            ultimate_point_mpa: 400.0,
        }
    }

    fn ductile_metal() -> RuptureProfile {
        RuptureProfile {
            intrinsic_rupture_strain: 0.18,
            is_brittle: false,
        }
    }

    #[test]
    fn test_ductile_tension_sequence() {
        let plan = build(&steel_scaled(), &ductile_metal(), TestMode::Tension, 0.10).unwrap();

        assert_eq!(plan.points.len(), 4);
        assert_eq!(plan.points[0].strain, 0.0);
        assert_eq!(plan.points[0].stress_mpa, 0.0);

        // ey = 250 / 200000
        assert_relative_eq!(plan.yield_strain(), 0.00125);
        assert_eq!(plan.points[1].stress_mpa, 250.0);

        // intermediate = ey + 0.7 * (0.18 - ey)
        let expected_intermediate = 0.00125 + 0.7 * (0.18 - 0.00125);
        assert_relative_eq!(plan.points[2].strain, expected_intermediate);
        assert_eq!(plan.points[2].stress_mpa, 400.0);

        // fracture at rupture strain, softened to 85% of ultimate
        assert_relative_eq!(plan.points[3].strain, 0.18);
        assert_relative_eq!(plan.points[3].stress_mpa, 340.0, max_relative = 1e-12);
        assert_relative_eq!(plan.fracture_strain, 0.18);
    }

    #[test]
    fn test_brittle_sequence_has_two_nonorigin_points() {
        let profile = RuptureProfile {
            intrinsic_rupture_strain: 0.011,
            is_brittle: true,
        };
        let scaled = ModeScaled {
            modulus_mpa: 370_000.0,
            yield_point_mpa: 3_000.0,
            ultimate_point_mpa: 3_700.0,
        };
        let plan = build(&scaled, &profile, TestMode::Tension, 0.02).unwrap();

        assert_eq!(plan.points.len(), 3);
        assert_relative_eq!(plan.points[2].strain, 0.011);
        assert_eq!(plan.points[2].stress_mpa, 3_700.0);
    }

    #[test]
    fn test_compression_densification_point() {
        let plan = build(&steel_scaled(), &ductile_metal(), TestMode::Compression, 0.10).unwrap();

        let last = plan.points.last().unwrap();
        assert_relative_eq!(last.strain, 0.15, max_relative = 1e-12);
        assert_relative_eq!(last.stress_mpa, 600.0);

        // Truncation sits past the machine limit
        assert_relative_eq!(plan.fracture_strain, 0.20, max_relative = 1e-12);
    }

    #[test]
    fn test_compression_with_short_travel_is_degenerate() {
        // Machine limit 0.05 puts the densification point at 0.075, inside
        // the hardening plateau (intermediate ~0.126) - not a valid sequence
        let err = build(&steel_scaled(), &ductile_metal(), TestMode::Compression, 0.05)
            .unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_CURVE");
    }

    #[test]
    fn test_rupture_inside_elastic_range_is_degenerate() {
        // Rupture strain below the yield strain cannot be ordered
        let profile = RuptureProfile {
            intrinsic_rupture_strain: 0.001,
            is_brittle: true,
        };
        let err = build(&steel_scaled(), &profile, TestMode::Tension, 0.10).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_CURVE");
    }

    #[test]
    fn test_collapsed_plateau_is_degenerate() {
        // Rupture pinned exactly at yield: the 0.7-interpolated point lands
        // on the yield point
        let profile = RuptureProfile {
            intrinsic_rupture_strain: 0.00125,
            is_brittle: false,
        };
        let err = build(&steel_scaled(), &profile, TestMode::Tension, 0.10).unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_CURVE");
    }
}
