//! # Flexure Transform
//!
//! Three-point bending is not a mode of the synthesis engine: a flexure
//! curve is the Tension-mode result pushed through a beam-geometry
//! transform. For a rectangular specimen of span `L`, width `b`, and depth
//! `d` (millimetres):
//!
//! ```text
//! F = 2 * sigma * b * d^2 / (3 * L)      [N]
//! delta = epsilon * L^2 / (6 * d)        [mm]
//! ```
//!
//! The transform is linear in both axes, so curve shape and keypoint
//! ordering survive unchanged; samples the tension curve left undefined
//! (past fracture) stay undefined here.

use serde::{Deserialize, Serialize};

use crate::errors::{SimError, SimResult};
use crate::simulation::{Curve, TestMode};

/// Rectangular three-point bend specimen geometry (millimetres)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamGeometry {
    /// Support span L
    pub span_mm: f64,
    /// Specimen width b
    pub width_mm: f64,
    /// Specimen depth d
    pub depth_mm: f64,
}

impl BeamGeometry {
    /// Create a geometry
    pub fn new(span_mm: f64, width_mm: f64, depth_mm: f64) -> Self {
        BeamGeometry {
            span_mm,
            width_mm,
            depth_mm,
        }
    }

    /// Validate that all dimensions are positive and finite.
    pub fn validate(&self) -> SimResult<()> {
        for (field, value) in [
            ("span_mm", self.span_mm),
            ("width_mm", self.width_mm),
            ("depth_mm", self.depth_mm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid_spec(
                    field,
                    value.to_string(),
                    "Beam dimension must be positive and finite",
                ));
            }
        }
        Ok(())
    }
}

/// One sampled point of a force-deflection curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlexurePoint {
    /// Mid-span deflection (mm)
    pub deflection_mm: f64,
    /// Applied force (N); `None` past fracture
    pub force_n: Option<f64>,
}

/// Force-deflection curve derived from a tension result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexureCurve {
    /// Material name carried over from the tension curve
    pub material: String,
    /// Geometry the transform was computed for
    pub geometry: BeamGeometry,
    /// Deflection-ascending samples
    pub points: Vec<FlexurePoint>,
}

/// Transform a Tension-mode curve into a force-deflection curve.
///
/// Fails with `InvalidSpec` for non-positive geometry or when handed a
/// curve from any mode other than Tension - compression and torsion
/// results have the wrong sign/axis conventions for this transform.
pub fn to_force_deflection(curve: &Curve, geometry: &BeamGeometry) -> SimResult<FlexureCurve> {
    geometry.validate()?;

    if curve.mode != TestMode::Tension {
        return Err(SimError::invalid_spec(
            "mode",
            curve.mode.to_string(),
            "Flexure transform requires a Tension-mode curve",
        ));
    }

    let force_per_stress =
        2.0 * geometry.width_mm * geometry.depth_mm.powi(2) / (3.0 * geometry.span_mm);
    let deflection_per_strain = geometry.span_mm.powi(2) / (6.0 * geometry.depth_mm);

    let points = curve
        .points
        .iter()
        .map(|p| FlexurePoint {
            deflection_mm: p.strain * deflection_per_strain,
            force_n: p.stress_mpa.map(|s| s * force_per_stress),
        })
        .collect();

    Ok(FlexureCurve {
        material: curve.material.clone(),
        geometry: *geometry,
        points,
    })
}
