//! Curve Synthesis
//!
//! Interpolates a dense, uniformly-sampled stress-strain curve from a
//! keypoint sequence. Three regimes compose the curve: linear elastic up to
//! yield, a power-law hardening blend up to the ultimate point (ductile
//! materials), and linear interpolation across the remaining keypoint
//! segments. Samples strictly past the fracture strain are undefined, which
//! is how a renderer detects early termination for brittle materials.

use serde::{Deserialize, Serialize};

use crate::simulation::keypoints::Keypoint;
use crate::simulation::TestMode;

/// Hardening-curvature parameter for the yield-to-ultimate blend. Fixed, not
/// configurable: produces the concave knee typical of ductile metals.
const HARDENING_EXPONENT: f64 = 0.4;

/// One sampled point of a synthesized curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Canonical strain (mm/mm) or shear angle (rad)
    pub strain: f64,
    /// Engineering stress (MPa); `None` past fracture (curve terminated)
    pub stress_mpa: Option<f64>,
    /// Display axis: percent for tension/compression, radians for torsion
    pub strain_display: f64,
}

/// A synthesized test curve for one material and mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Material name the curve belongs to
    pub material: String,
    /// Test mode the curve was synthesized for
    pub mode: TestMode,
    /// Uniformly spaced samples, strain-ascending, first always (0, 0, 0)
    pub points: Vec<CurvePoint>,
}

impl Curve {
    /// Samples with a defined stress value
    pub fn defined_points(&self) -> impl Iterator<Item = &CurvePoint> {
        self.points.iter().filter(|p| p.stress_mpa.is_some())
    }

    /// Whether the curve terminated before the end of machine travel
    pub fn is_truncated(&self) -> bool {
        self.points.iter().any(|p| p.stress_mpa.is_none())
    }

    /// Largest strain with a defined stress (the visible end of the curve)
    pub fn last_defined_strain(&self) -> Option<f64> {
        self.defined_points().last().map(|p| p.strain)
    }
}

/// Synthesize the dense sampled curve.
///
/// `sample_count` uniform strains over `[0, max_strain_machine]`. For
/// non-compression modes, samples strictly beyond `fracture_strain` are
/// undefined. Compression negates the stress sign (and never truncates:
/// its fracture strain sits past machine travel by construction).
///
/// If the keypoint sequence has fewer than two distinct strain values,
/// interpolation cannot be constructed and the whole domain degrades to
/// pure linear elastic - the renderer always receives a plottable curve.
pub fn synthesize(
    points: &[Keypoint],
    modulus_mpa: f64,
    max_strain_machine: f64,
    sample_count: usize,
    mode: TestMode,
    fracture_strain: f64,
    is_brittle: bool,
) -> Vec<CurvePoint> {
    let interpolable = distinct_strains(points) >= 2;

    let mut samples = Vec::with_capacity(sample_count);
    for i in 0..sample_count {
        let t = i as f64 / (sample_count - 1) as f64;
        let strain = max_strain_machine * t;

        let magnitude = if !interpolable {
            Some(modulus_mpa * strain)
        } else {
            sample_stress(
                points,
                modulus_mpa,
                mode,
                fracture_strain,
                is_brittle,
                strain,
            )
        };

        let stress_mpa = magnitude.map(|s| match mode {
            // Compression convention: stress is negative by sign. The origin
            // stays exactly +0.
            TestMode::Compression if s != 0.0 => -s,
            _ => s,
        });

        let strain_display = match mode {
            TestMode::Torsion => strain,
            TestMode::Tension | TestMode::Compression => strain * 100.0,
        };

        samples.push(CurvePoint {
            strain,
            stress_mpa,
            strain_display,
        });
    }

    samples
}

/// Stress magnitude at one strain, or `None` past fracture
fn sample_stress(
    points: &[Keypoint],
    modulus_mpa: f64,
    mode: TestMode,
    fracture_strain: f64,
    is_brittle: bool,
    strain: f64,
) -> Option<f64> {
    if strain > fracture_strain && mode != TestMode::Compression {
        return None;
    }

    let yield_strain = points[1].strain;
    let yield_stress = points[1].stress_mpa;

    if strain <= yield_strain {
        return Some(modulus_mpa * strain);
    }

    if !is_brittle {
        let intermediate = points[2];
        if strain <= intermediate.strain {
            let ratio = ((strain - yield_strain) / (intermediate.strain - yield_strain)).max(0.0);
            return Some(
                yield_stress
                    + (intermediate.stress_mpa - yield_stress) * ratio.powf(HARDENING_EXPONENT),
            );
        }
    }

    Some(interpolate_segments(points, strain))
}

/// Piecewise-linear interpolation across keypoint segments, extrapolating
/// linearly past the last point
fn interpolate_segments(points: &[Keypoint], strain: f64) -> f64 {
    let mut segment = points.len() - 2;
    for i in 0..points.len() - 1 {
        if strain <= points[i + 1].strain {
            segment = i;
            break;
        }
    }

    let a = points[segment];
    let b = points[segment + 1];
    let slope = (b.stress_mpa - a.stress_mpa) / (b.strain - a.strain);
    a.stress_mpa + slope * (strain - a.strain)
}

fn distinct_strains(points: &[Keypoint]) -> usize {
    let mut count = 0;
    let mut last: Option<f64> = None;
    for p in points {
        if last != Some(p.strain) {
            count += 1;
            last = Some(p.strain);
        }
    }
    count
}
