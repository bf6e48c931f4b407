//! # Test Simulation
//!
//! The mechanical-test curve synthesis engine. Given a material's
//! elastic/strength properties and a requested test mode, it produces a
//! stress-strain (or shear stress-shear angle) curve that is
//! piecewise-elastic, piecewise-hardening, and terminates at a mode- and
//! family-dependent fracture point.
//!
//! Four stages compose in strict order, each a pure function of the one
//! before: property resolution, rupture classification, mode adaptation,
//! keypoint construction, then dense sampling. No stage holds state across
//! invocations - calling [`simulate`] twice with the same input yields
//! bit-identical output, and concurrent calls need no synchronization.
//!
//! ## Example
//!
//! ```rust
//! use lab_core::materials::builtin_catalog;
//! use lab_core::simulation::{simulate, TestInput, TestMode};
//!
//! let catalog = builtin_catalog();
//! let steel = catalog.lookup("Steel A36").unwrap();
//!
//! let input = TestInput::new(steel.clone(), TestMode::Tension, 0.10);
//! let curve = simulate(&input).unwrap();
//!
//! assert_eq!(curve.points.len(), 300);
//! assert_eq!(curve.points[0].stress_mpa, Some(0.0));
//! ```

pub mod curve;
pub mod keypoints;
pub mod mode;
pub mod rupture;

pub use curve::{Curve, CurvePoint};
pub use keypoints::{Keypoint, KeypointPlan};
pub use mode::ModeScaled;
pub use rupture::RuptureProfile;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{SimError, SimResult};
use crate::materials::MaterialRecord;

/// Default curve resolution when the caller does not specify one
pub const DEFAULT_SAMPLE_COUNT: usize = 300;

fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

/// Virtual test mode.
///
/// Flexure is not a mode of this engine: a flexure curve is a geometric
/// transform of a Tension result (see the `flexure` module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestMode {
    /// Uniaxial tension
    Tension,
    /// Uniaxial compression (negative stress convention)
    Compression,
    /// Torsion (shear stress vs. shear angle in radians)
    Torsion,
}

impl TestMode {
    /// All modes for iteration
    pub const ALL: [TestMode; 3] = [TestMode::Tension, TestMode::Compression, TestMode::Torsion];

    /// Parse from a user-facing label (case-insensitive)
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tension" => Some(TestMode::Tension),
            "compression" => Some(TestMode::Compression),
            "torsion" => Some(TestMode::Torsion),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            TestMode::Tension => "Tension",
            TestMode::Compression => "Compression",
            TestMode::Torsion => "Torsion",
        }
    }
}

impl std::fmt::Display for TestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Input for one simulated test.
///
/// ## JSON Example
///
/// ```json
/// {
///   "material": {
///     "name": "Steel A36",
///     "category": "Metal",
///     "elastic_modulus_mpa": 200000.0,
///     "yield_strength_mpa": 250.0,
///     "ultimate_strength_mpa": 400.0,
///     "poisson_ratio": 0.26
///   },
///   "mode": "Tension",
///   "max_strain_machine": 0.1
/// }
/// ```
///
/// `sample_count` defaults to 300 when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestInput {
    /// Raw material row; resolved (defaulted/validated) inside [`simulate`]
    pub material: MaterialRecord,

    /// Requested test mode
    pub mode: TestMode,

    /// Machine travel: strain limit for tension/compression, shear angle in
    /// radians for torsion
    pub max_strain_machine: f64,

    /// Curve resolution (number of uniform samples, at least 2)
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
}

impl TestInput {
    /// Create an input with the default sample count
    pub fn new(material: MaterialRecord, mode: TestMode, max_strain_machine: f64) -> Self {
        TestInput {
            material,
            mode,
            max_strain_machine,
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }

    /// Set the curve resolution
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Validate machine parameters.
    pub fn validate(&self) -> SimResult<()> {
        if !self.max_strain_machine.is_finite() || self.max_strain_machine <= 0.0 {
            return Err(SimError::invalid_spec(
                "max_strain_machine",
                self.max_strain_machine.to_string(),
                "Machine strain limit must be positive and finite",
            ));
        }
        if self.sample_count < 2 {
            return Err(SimError::invalid_spec(
                "sample_count",
                self.sample_count.to_string(),
                "At least 2 samples are required",
            ));
        }
        Ok(())
    }
}

/// Run one virtual test.
///
/// Pure function: resolves the material, classifies its rupture behavior,
/// rescales for the test mode, builds the keypoint sequence, and samples
/// the dense curve. Fails with `InvalidSpec` for unusable properties or
/// `DegenerateCurve` when keypoint ordering cannot be established; either
/// way only this one simulation is affected.
pub fn simulate(input: &TestInput) -> SimResult<Curve> {
    input.validate()?;

    let spec = input.material.resolve()?;
    let profile = rupture::classify(&spec, input.mode);
    let scaled = mode::adapt(&spec, input.mode)?;
    let plan = keypoints::build(&scaled, &profile, input.mode, input.max_strain_machine)?;

    debug!(
        "simulate '{}' {} rupture={:.4} brittle={} keypoints={}",
        spec.name,
        input.mode,
        profile.intrinsic_rupture_strain,
        profile.is_brittle,
        plan.points.len()
    );

    let points = curve::synthesize(
        &plan.points,
        scaled.modulus_mpa,
        input.max_strain_machine,
        input.sample_count,
        input.mode,
        plan.fracture_strain,
        profile.is_brittle,
    );

    Ok(Curve {
        material: spec.name,
        mode: input.mode,
        points,
    })
}

/// Run a batch of tests with per-material failure isolation.
///
/// One invalid material never aborts the others - the dashboard overlays
/// whatever succeeded and warns about the rest. Results keep the input
/// order and are keyed by material name.
pub fn simulate_many(inputs: &[TestInput]) -> Vec<(String, SimResult<Curve>)> {
    inputs
        .iter()
        .map(|input| (input.material.name.clone(), simulate(input)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{builtin_catalog, Category, MaterialRecord};
    use approx::assert_relative_eq;

    fn steel_input(mode: TestMode) -> TestInput {
        TestInput::new(
            MaterialRecord::new("Steel A36", Category::Metal, 200_000.0, 250.0)
                .with_ultimate_strength(400.0)
                .with_poisson_ratio(0.3),
            mode,
            0.10,
        )
    }

    #[test]
    fn test_tension_reference_scenario() {
        let curve = simulate(&steel_input(TestMode::Tension)).unwrap();

        assert_eq!(curve.points.len(), 300);
        assert_eq!(curve.points[0].strain, 0.0);
        assert_eq!(curve.points[0].stress_mpa, Some(0.0));
        assert_eq!(curve.points[0].strain_display, 0.0);
        assert_relative_eq!(curve.points.last().unwrap().strain, 0.10);

        for pair in curve.points.windows(2) {
            assert!(pair[1].strain > pair[0].strain);
        }
    }

    #[test]
    fn test_torsion_reference_scenario() {
        let curve = simulate(&steel_input(TestMode::Torsion)).unwrap();

        // G = 200000/2.6, Ty = 144.25: the elastic slope of the first
        // defined samples must match the shear modulus
        let p = &curve.points[1];
        let g = p.stress_mpa.unwrap() / p.strain;
        assert_relative_eq!(g, 76_923.0769, max_relative = 1e-4);

        // Torsion keeps the display axis in radians
        assert_eq!(p.strain_display, p.strain);
    }

    #[test]
    fn test_compression_reference_scenario() {
        let curve = simulate(&steel_input(TestMode::Compression)).unwrap();

        for p in &curve.points {
            let stress = p.stress_mpa.expect("compression never truncates");
            assert!(stress <= 0.0);
        }
        assert!(!curve.is_truncated());
    }

    #[test]
    fn test_brittle_ceramic_has_no_plastic_plateau() {
        let input = TestInput::new(
            MaterialRecord::new("Test Ceramic", Category::Ceramic, 100_000.0, 900.0)
                .with_ultimate_strength(1_000.0),
            TestMode::Tension,
            0.05,
        );
        let curve = simulate(&input).unwrap();

        // Rupture at (1000/100000) * 1.1 = 0.011; beyond that the curve ends
        assert!(curve.is_truncated());
        assert!(curve.last_defined_strain().unwrap() <= 0.011 + 1e-9);
    }

    #[test]
    fn test_brittle_compression_never_truncates() {
        // Rupture sits at ~0.001 strain, far inside machine travel, but
        // compression ignores fracture and extrapolates the last segment
        let input = TestInput::new(
            MaterialRecord::new("Alumina 99.5%", Category::Ceramic, 370_000.0, 300.0)
                .with_ultimate_strength(330.0),
            TestMode::Compression,
            0.05,
        );
        let curve = simulate(&input).unwrap();

        assert!(!curve.is_truncated());
        for p in &curve.points {
            assert!(p.stress_mpa.unwrap() <= 0.0);
        }
    }

    #[test]
    fn test_idempotence() {
        let input = steel_input(TestMode::Tension);
        let a = simulate(&input).unwrap();
        let b = simulate(&input).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validation_failures() {
        let mut input = steel_input(TestMode::Tension);
        input.max_strain_machine = 0.0;
        assert!(simulate(&input).is_err());

        let mut input = steel_input(TestMode::Tension);
        input.sample_count = 1;
        assert!(simulate(&input).is_err());

        let mut input = steel_input(TestMode::Tension);
        input.material.elastic_modulus_mpa = -5.0;
        assert_eq!(simulate(&input).unwrap_err().error_code(), "INVALID_SPEC");
    }

    #[test]
    fn test_batch_isolates_failures() {
        let good = steel_input(TestMode::Tension);
        let mut bad = steel_input(TestMode::Tension);
        bad.material.name = "Broken".to_string();
        bad.material.yield_strength_mpa = 0.0;

        let results = simulate_many(&[good, bad]);
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "Broken");
        assert!(results[1].1.is_err());
    }

    #[test]
    fn test_every_builtin_material_simulates_in_tension() {
        let catalog = builtin_catalog();
        for record in catalog.all() {
            let input = TestInput::new(record.clone(), TestMode::Tension, 0.10);
            let curve = simulate(&input)
                .unwrap_or_else(|e| panic!("{} failed: {}", record.name, e));
            assert_eq!(curve.points.len(), 300);
        }
    }

    #[test]
    fn test_input_serde_defaults_sample_count() {
        let json = r#"{
            "material": {
                "name": "Steel A36",
                "category": "Metal",
                "elastic_modulus_mpa": 200000.0,
                "yield_strength_mpa": 250.0,
                "ultimate_strength_mpa": 400.0,
                "poisson_ratio": 0.26
            },
            "mode": "Tension",
            "max_strain_machine": 0.1
        }"#;
        let input: TestInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.sample_count, 300);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(TestMode::from_label("torsion"), Some(TestMode::Torsion));
        assert_eq!(TestMode::from_label("bending"), None);
        for mode in TestMode::ALL {
            assert_eq!(TestMode::from_label(mode.display_name()), Some(mode));
        }
    }
}
