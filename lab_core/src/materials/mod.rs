//! # Materials
//!
//! Material definitions for the virtual testing lab.
//!
//! Two shapes of material data exist on purpose:
//!
//! - [`MaterialRecord`] is the *raw* row as it arrives from the catalog, a
//!   CSV import, or a JSON payload. Optional fields may be missing.
//! - [`MaterialSpec`] is the *resolved* spec the engine computes with: every
//!   field populated, defaults applied, invariants established. Produced by
//!   [`MaterialRecord::resolve`] and never mutated afterwards.
//!
//! Keeping the defaulting policy in one resolution step means the synthesis
//! algorithm never has to ask "what if ultimate strength is missing?".
//!
//! ## Example
//!
//! ```rust
//! use lab_core::materials::{Category, MaterialRecord};
//!
//! let record = MaterialRecord::new("Steel A36", Category::Metal, 200_000.0, 250.0)
//!     .with_ultimate_strength(400.0)
//!     .with_poisson_ratio(0.26);
//!
//! let spec = record.resolve().unwrap();
//! assert_eq!(spec.ultimate_strength_mpa, 400.0);
//! ```

pub mod catalog;

pub use catalog::{builtin_catalog, MaterialDb};

use serde::{Deserialize, Serialize};

use crate::errors::{SimError, SimResult};

/// Ultimate strength defaults to this multiple of yield when missing or
/// below yield
const DEFAULT_ULTIMATE_RATIO: f64 = 1.1;

/// Poisson ratio assumed when the catalog row does not carry one
const DEFAULT_POISSON_RATIO: f64 = 0.3;

/// Material family, drives the ductility classification
///
/// The classifier matches exhaustively on this enum - adding a family here
/// forces a deliberate choice of rupture behavior instead of a silent fall
/// through to the metal branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    /// Metals (steels, aluminum alloys, copper, ...)
    #[default]
    Metal,
    /// Polymers (thermoplastics, elastomers)
    Polymer,
    /// Technical ceramics (alumina, silicon carbide, ...)
    Ceramic,
    /// Glasses (soda-lime, borosilicate)
    Glass,
    /// Fiber-reinforced composites
    Composite,
}

impl Category {
    /// All categories for iteration
    pub const ALL: [Category; 5] = [
        Category::Metal,
        Category::Polymer,
        Category::Ceramic,
        Category::Glass,
        Category::Composite,
    ];

    /// Parse from a catalog/CSV label (case-insensitive)
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "metal" => Some(Category::Metal),
            "polymer" => Some(Category::Polymer),
            "ceramic" => Some(Category::Ceramic),
            "glass" => Some(Category::Glass),
            "composite" => Some(Category::Composite),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Metal => "Metal",
            Category::Polymer => "Polymer",
            Category::Ceramic => "Ceramic",
            Category::Glass => "Glass",
            Category::Composite => "Composite",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Raw material row as stored in the catalog.
///
/// Optional fields stay optional here; the permissive-input policy lives in
/// [`MaterialRecord::resolve`], which fills them in. Stress-valued fields
/// are megapascals, the engine's canonical unit system.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Aluminum 6061",
///   "category": "Metal",
///   "elastic_modulus_mpa": 68900.0,
///   "yield_strength_mpa": 276.0,
///   "ultimate_strength_mpa": 310.0,
///   "poisson_ratio": 0.33
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Unique material name (catalog key, e.g. "Steel A36")
    pub name: String,

    /// Material family; missing means Metal
    pub category: Option<Category>,

    /// Young's modulus E (MPa)
    pub elastic_modulus_mpa: f64,

    /// Yield strength Sy (MPa)
    pub yield_strength_mpa: f64,

    /// Ultimate strength Su (MPa); missing or sub-yield values resolve to
    /// 1.1 x yield
    pub ultimate_strength_mpa: Option<f64>,

    /// Poisson ratio; missing resolves to 0.3
    pub poisson_ratio: Option<f64>,
}

impl MaterialRecord {
    /// Create a record with the required fields only
    pub fn new(
        name: impl Into<String>,
        category: Category,
        elastic_modulus_mpa: f64,
        yield_strength_mpa: f64,
    ) -> Self {
        MaterialRecord {
            name: name.into(),
            category: Some(category),
            elastic_modulus_mpa,
            yield_strength_mpa,
            ultimate_strength_mpa: None,
            poisson_ratio: None,
        }
    }

    /// Set the ultimate strength (MPa)
    pub fn with_ultimate_strength(mut self, su_mpa: f64) -> Self {
        self.ultimate_strength_mpa = Some(su_mpa);
        self
    }

    /// Set the Poisson ratio
    pub fn with_poisson_ratio(mut self, nu: f64) -> Self {
        self.poisson_ratio = Some(nu);
        self
    }

    /// Resolve this raw row into a fully-defaulted [`MaterialSpec`].
    ///
    /// Rules:
    /// - `elastic_modulus_mpa` and `yield_strength_mpa` must be positive and
    ///   finite, otherwise `InvalidSpec`.
    /// - `ultimate_strength_mpa` defaults/clamps to `1.1 x yield` whenever it
    ///   is missing, non-finite, or below yield.
    /// - `poisson_ratio` defaults to 0.3 when missing or non-finite.
    /// - `category` defaults to Metal.
    ///
    /// Missing optional fields never fail - sparse catalogs stay usable.
    pub fn resolve(&self) -> SimResult<MaterialSpec> {
        let e = self.elastic_modulus_mpa;
        if !e.is_finite() || e <= 0.0 {
            return Err(SimError::invalid_spec(
                "elastic_modulus_mpa",
                e.to_string(),
                "Elastic modulus must be positive and finite",
            ));
        }

        let sy = self.yield_strength_mpa;
        if !sy.is_finite() || sy <= 0.0 {
            return Err(SimError::invalid_spec(
                "yield_strength_mpa",
                sy.to_string(),
                "Yield strength must be positive and finite",
            ));
        }

        let su = match self.ultimate_strength_mpa {
            Some(su) if su.is_finite() && su >= sy => su,
            _ => sy * DEFAULT_ULTIMATE_RATIO,
        };

        let nu = match self.poisson_ratio {
            Some(nu) if nu.is_finite() => nu,
            _ => DEFAULT_POISSON_RATIO,
        };

        Ok(MaterialSpec {
            name: self.name.clone(),
            category: self.category.unwrap_or_default(),
            elastic_modulus_mpa: e,
            yield_strength_mpa: sy,
            ultimate_strength_mpa: su,
            poisson_ratio: nu,
        })
    }
}

impl std::fmt::Display for MaterialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, E={:.0} MPa, Sy={:.0} MPa)",
            self.name,
            self.category.unwrap_or_default(),
            self.elastic_modulus_mpa,
            self.yield_strength_mpa
        )
    }
}

/// Fully-resolved material spec the engine computes with.
///
/// Invariant: `ultimate_strength_mpa >= yield_strength_mpa`, and every field
/// is finite. Built once per simulation by [`MaterialRecord::resolve`] and
/// treated as immutable from there on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Material name (carried through for labeling output)
    pub name: String,
    /// Material family
    pub category: Category,
    /// Young's modulus E (MPa)
    pub elastic_modulus_mpa: f64,
    /// Yield strength Sy (MPa)
    pub yield_strength_mpa: f64,
    /// Ultimate strength Su (MPa), always >= yield
    pub ultimate_strength_mpa: f64,
    /// Poisson ratio
    pub poisson_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn steel() -> MaterialRecord {
        MaterialRecord::new("Steel A36", Category::Metal, 200_000.0, 250.0)
            .with_ultimate_strength(400.0)
            .with_poisson_ratio(0.26)
    }

    #[test]
    fn test_resolve_complete_record() {
        let spec = steel().resolve().unwrap();
        assert_eq!(spec.category, Category::Metal);
        assert_eq!(spec.elastic_modulus_mpa, 200_000.0);
        assert_eq!(spec.ultimate_strength_mpa, 400.0);
        assert_eq!(spec.poisson_ratio, 0.26);
    }

    #[test]
    fn test_resolve_defaults_missing_optionals() {
        let record = MaterialRecord {
            name: "Mystery".to_string(),
            category: None,
            elastic_modulus_mpa: 100_000.0,
            yield_strength_mpa: 200.0,
            ultimate_strength_mpa: None,
            poisson_ratio: None,
        };
        let spec = record.resolve().unwrap();
        assert_eq!(spec.category, Category::Metal);
        assert_relative_eq!(spec.ultimate_strength_mpa, 220.0, max_relative = 1e-12);
        assert_eq!(spec.poisson_ratio, 0.3);
    }

    #[test]
    fn test_resolve_clamps_sub_yield_ultimate() {
        let record = steel().with_ultimate_strength(100.0);
        let spec = record.resolve().unwrap();
        assert_relative_eq!(spec.ultimate_strength_mpa, 275.0, max_relative = 1e-12);
        assert!(spec.ultimate_strength_mpa >= spec.yield_strength_mpa);
    }

    #[test]
    fn test_resolve_keeps_ultimate_equal_to_yield() {
        let record = steel().with_ultimate_strength(250.0);
        let spec = record.resolve().unwrap();
        assert_eq!(spec.ultimate_strength_mpa, 250.0);
    }

    #[test]
    fn test_resolve_rejects_nonpositive_modulus() {
        let mut record = steel();
        record.elastic_modulus_mpa = 0.0;
        let err = record.resolve().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SPEC");
    }

    #[test]
    fn test_resolve_rejects_nonfinite_inputs() {
        let mut record = steel();
        record.yield_strength_mpa = f64::NAN;
        assert!(record.resolve().is_err());

        let mut record = steel();
        record.elastic_modulus_mpa = f64::INFINITY;
        assert!(record.resolve().is_err());
    }

    #[test]
    fn test_resolve_defaults_nonfinite_optionals() {
        let record = steel()
            .with_ultimate_strength(f64::NAN)
            .with_poisson_ratio(f64::NAN);
        let spec = record.resolve().unwrap();
        assert_relative_eq!(spec.ultimate_strength_mpa, 275.0, max_relative = 1e-12);
        assert_eq!(spec.poisson_ratio, 0.3);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::from_label("metal"), Some(Category::Metal));
        assert_eq!(Category::from_label(" Glass "), Some(Category::Glass));
        assert_eq!(Category::from_label("unobtanium"), None);
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.display_name()), Some(cat));
        }
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let record = steel();
        let json = serde_json::to_string(&record).unwrap();
        let roundtrip: MaterialRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, roundtrip);
    }
}
