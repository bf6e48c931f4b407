//! # Error Types
//!
//! Structured error types for lab_core. Every failure a caller can see is a
//! variant here, with enough context to handle it programmatically - a
//! dashboard overlaying several materials needs to know *which* simulation
//! failed and why, not just that something went wrong.
//!
//! ## Example
//!
//! ```rust
//! use lab_core::errors::{SimError, SimResult};
//!
//! fn validate_modulus(elastic_modulus_mpa: f64) -> SimResult<()> {
//!     if elastic_modulus_mpa <= 0.0 {
//!         return Err(SimError::invalid_spec(
//!             "elastic_modulus_mpa",
//!             elastic_modulus_mpa.to_string(),
//!             "Elastic modulus must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for lab_core operations
pub type SimResult<T> = Result<T, SimError>;

/// Structured error type for simulation and catalog operations.
///
/// Simulation errors (`InvalidSpec`, `DegenerateCurve`) abort only the one
/// material they belong to; a batch run collects them per entry and keeps
/// going. File and catalog errors carry the path/name context needed to
/// report the failure without a stack trace.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum SimError {
    /// A material property is invalid (non-positive modulus/strength, or a
    /// Poisson ratio that makes the shear modulus undefined)
    #[error("Invalid material spec for '{field}': {value} - {reason}")]
    InvalidSpec {
        field: String,
        value: String,
        reason: String,
    },

    /// Keypoint monotonicity could not be established for this material/mode
    #[error("Degenerate curve: {reason}")]
    DegenerateCurve { reason: String },

    /// Material not found in the catalog
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Catalog schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl SimError {
    /// Create an InvalidSpec error
    pub fn invalid_spec(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SimError::InvalidSpec {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DegenerateCurve error
    pub fn degenerate_curve(reason: impl Into<String>) -> Self {
        SimError::DegenerateCurve {
            reason: reason.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        SimError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SimError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        SimError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this error aborts a single simulation rather than the session
    ///
    /// Simulation errors are isolable per material: a batch/overlay run drops
    /// the one material and continues with the rest.
    pub fn is_per_material(&self) -> bool {
        matches!(
            self,
            SimError::InvalidSpec { .. }
                | SimError::DegenerateCurve { .. }
                | SimError::MaterialNotFound { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SimError::InvalidSpec { .. } => "INVALID_SPEC",
            SimError::DegenerateCurve { .. } => "DEGENERATE_CURVE",
            SimError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            SimError::FileError { .. } => "FILE_ERROR",
            SimError::FileLocked { .. } => "FILE_LOCKED",
            SimError::SerializationError { .. } => "SERIALIZATION_ERROR",
            SimError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = SimError::invalid_spec("yield_strength_mpa", "-250", "must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: SimError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SimError::degenerate_curve("test").error_code(),
            "DEGENERATE_CURVE"
        );
        assert_eq!(
            SimError::material_not_found("Unobtanium").error_code(),
            "MATERIAL_NOT_FOUND"
        );
    }

    #[test]
    fn test_per_material_isolation() {
        assert!(SimError::invalid_spec("e", "0", "zero").is_per_material());
        assert!(SimError::degenerate_curve("collapsed").is_per_material());
        assert!(!SimError::file_error("open", "/tmp/x", "denied").is_per_material());
    }
}
