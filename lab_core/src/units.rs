//! # Unit Types
//!
//! Newtype wrappers for the pressure units the lab reports in. The engine
//! itself always works in megapascals; switching the display to US customary
//! units is a linear post-scale applied by the caller and never changes the
//! shape or ordering of a curve.
//!
//! ## Example
//!
//! ```rust
//! use lab_core::units::{Ksi, Mpa};
//!
//! let yield_strength = Mpa(250.0);
//! let in_ksi: Ksi = yield_strength.into();
//! assert!((in_ksi.0 - 36.26).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

/// Megapascals per ksi (exact definition, 1 ksi = 6.894757 MPa)
pub const MPA_PER_KSI: f64 = 6.894757;

/// Stress in megapascals (canonical engine unit)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mpa(pub f64);

/// Stress in kips per square inch
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ksi(pub f64);

impl From<Mpa> for Ksi {
    fn from(mpa: Mpa) -> Self {
        Ksi(mpa.0 / MPA_PER_KSI)
    }
}

impl From<Ksi> for Mpa {
    fn from(ksi: Ksi) -> Self {
        Mpa(ksi.0 * MPA_PER_KSI)
    }
}
