//! Rupture Classification
//!
//! Determines a material's intrinsic rupture strain and ductility class from
//! its family. The mapping is an exhaustive match - a new `Category` variant
//! will not compile until it is given a deliberate rupture behavior here.

use serde::{Deserialize, Serialize};

use crate::materials::{Category, MaterialSpec};
use crate::simulation::TestMode;

/// Rupture strain below which a material is treated as brittle
/// (elastic-to-fracture, no plastic plateau)
pub const BRITTLE_STRAIN_THRESHOLD: f64 = 0.05;

/// Shear ductility margin: torsion specimens tolerate more angular strain
/// than axial specimens tolerate elongation
const TORSION_DUCTILITY_MARGIN: f64 = 1.5;

/// Ceramics and glasses rupture just past their elastic limit
const CERAMIC_RUPTURE_FACTOR: f64 = 1.1;

/// Base rupture strain for polymers (cold-drawing families stretch far)
const POLYMER_RUPTURE_STRAIN: f64 = 0.60;

/// Base rupture strain for fiber composites (fiber breakage dominates)
const COMPOSITE_RUPTURE_STRAIN: f64 = 0.025;

/// Base rupture strain for metals
const METAL_RUPTURE_STRAIN: f64 = 0.18;

/// Ductility class derived from the material category and test mode.
///
/// Ephemeral: built per simulation, consumed by the keypoint builder,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuptureProfile {
    /// Strain at which the material is deemed to fracture (mode-scaled)
    pub intrinsic_rupture_strain: f64,
    /// Brittle materials go straight from elastic loading to fracture
    pub is_brittle: bool,
}

/// Classify a resolved material for the requested test mode.
///
/// Pure and deterministic, with no error paths: every category has a
/// defined rupture behavior, and torsion widens whatever base value results
/// by the shear ductility margin.
pub fn classify(spec: &MaterialSpec, mode: TestMode) -> RuptureProfile {
    let base = match spec.category {
        Category::Ceramic | Category::Glass => {
            (spec.ultimate_strength_mpa / spec.elastic_modulus_mpa) * CERAMIC_RUPTURE_FACTOR
        }
        Category::Polymer => POLYMER_RUPTURE_STRAIN,
        Category::Composite => COMPOSITE_RUPTURE_STRAIN,
        Category::Metal => METAL_RUPTURE_STRAIN,
    };

    let intrinsic_rupture_strain = match mode {
        TestMode::Torsion => base * TORSION_DUCTILITY_MARGIN,
        TestMode::Tension | TestMode::Compression => base,
    };

    RuptureProfile {
        intrinsic_rupture_strain,
        is_brittle: intrinsic_rupture_strain < BRITTLE_STRAIN_THRESHOLD,
    }
}
