//! Material Catalog
//!
//! In-memory catalog of material property rows, keyed by unique material
//! name. This is the record store the simulation engine reads from; the
//! engine itself never touches persistent storage (see `file_io` for the
//! JSON-backed catalog file).
//!
//! ## CSV Import
//!
//! Catalogs can be bulk-loaded from CSV with the columns
//! `name, category, elastic_modulus, yield_strength` (required) and
//! `ultimate_strength, poisson_ratio` (optional). Duplicate names and
//! unparsable rows are skipped and counted, never fatal - a half-good
//! catalog import is more useful than none.
//!
//! ## Example
//!
//! ```rust
//! use lab_core::materials::builtin_catalog;
//!
//! let db = builtin_catalog();
//! let a36 = db.lookup("steel a36").unwrap();
//! assert_eq!(a36.elastic_modulus_mpa, 200_000.0);
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{SimError, SimResult};
use crate::materials::{Category, MaterialRecord};

/// Material catalog with case-insensitive name lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialDb {
    /// Records indexed by uppercase name
    materials: HashMap<String, MaterialRecord>,
}

/// Outcome of a CSV import: how many rows landed, how many were skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvImportSummary {
    /// Rows inserted into the catalog
    pub added: usize,
    /// Rows skipped (duplicate name or unparsable required field)
    pub ignored: usize,
}

impl MaterialDb {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, keyed by its (upper-cased) name.
    ///
    /// Returns `true` if the name was new. An existing record with the same
    /// name is left untouched and `false` is returned - names are unique,
    /// matching the original single-table catalog.
    pub fn insert(&mut self, record: MaterialRecord) -> bool {
        let key = record.name.to_uppercase();
        if self.materials.contains_key(&key) {
            return false;
        }
        self.materials.insert(key, record);
        true
    }

    /// Look up a material by name (case-insensitive)
    pub fn lookup(&self, name: &str) -> SimResult<&MaterialRecord> {
        let key = name.to_uppercase();
        self.materials
            .get(&key)
            .ok_or_else(|| SimError::material_not_found(name))
    }

    /// Search for materials whose name starts with a pattern (case-insensitive)
    pub fn search(&self, pattern: &str) -> Vec<&MaterialRecord> {
        let pattern_upper = pattern.to_uppercase();
        self.materials
            .iter()
            .filter(|(k, _)| k.starts_with(&pattern_upper))
            .map(|(_, v)| v)
            .collect()
    }

    /// All records, sorted by name for stable listings
    pub fn all(&self) -> Vec<&MaterialRecord> {
        let mut records: Vec<&MaterialRecord> = self.materials.values().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Records belonging to one category
    pub fn by_category(&self, category: Category) -> Vec<&MaterialRecord> {
        self.all()
            .into_iter()
            .filter(|r| r.category.unwrap_or_default() == category)
            .collect()
    }

    /// Number of records in the catalog
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Bulk-import records from a CSV file.
    ///
    /// See [`MaterialDb::import_csv_text`] for the format and skip rules.
    pub fn import_csv(&mut self, path: &Path) -> SimResult<CsvImportSummary> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SimError::file_error("read", path.display().to_string(), e.to_string())
        })?;
        self.import_csv_text(&text).map_err(|e| match e {
            // Attach the path to parse errors surfaced from the text importer
            SimError::FileError {
                operation, reason, ..
            } => SimError::file_error(operation, path.display().to_string(), reason),
            other => other,
        })
    }

    /// Bulk-import records from CSV text.
    ///
    /// Required columns: `name, category, elastic_modulus, yield_strength`.
    /// Optional columns: `ultimate_strength, poisson_ratio` (blank or dash
    /// cells are treated as missing). Column order is free; headers are
    /// matched case-insensitively.
    ///
    /// Unknown category labels fall back to Metal - the catalog stays
    /// permissive about provenance, like every other optional input.
    /// Duplicate names and rows with unparsable required numbers are
    /// counted in `ignored` and skipped.
    pub fn import_csv_text(&mut self, text: &str) -> SimResult<CsvImportSummary> {
        let mut lines = text.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| SimError::file_error("parse", "<csv>", "CSV input is empty"))?;

        let headers: Vec<&str> = header_line.split(',').map(|h| h.trim()).collect();
        let col_index =
            |name: &str| -> Option<usize> { headers.iter().position(|h| h.eq_ignore_ascii_case(name)) };

        let name_idx = col_index("name")
            .ok_or_else(|| SimError::file_error("parse", "<csv>", "Missing 'name' column"))?;
        let category_idx = col_index("category")
            .ok_or_else(|| SimError::file_error("parse", "<csv>", "Missing 'category' column"))?;
        let e_idx = col_index("elastic_modulus").ok_or_else(|| {
            SimError::file_error("parse", "<csv>", "Missing 'elastic_modulus' column")
        })?;
        let sy_idx = col_index("yield_strength").ok_or_else(|| {
            SimError::file_error("parse", "<csv>", "Missing 'yield_strength' column")
        })?;

        let su_idx = col_index("ultimate_strength");
        let nu_idx = col_index("poisson_ratio");

        let mut summary = CsvImportSummary {
            added: 0,
            ignored: 0,
        };

        for (line_num, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').collect();

            let name = fields
                .get(name_idx)
                .map(|s| s.trim())
                .unwrap_or("")
                .to_string();
            if name.is_empty() {
                summary.ignored += 1;
                continue;
            }

            let elastic_modulus = fields.get(e_idx).and_then(|v| parse_optional_f64(v));
            let yield_strength = fields.get(sy_idx).and_then(|v| parse_optional_f64(v));
            let (elastic_modulus_mpa, yield_strength_mpa) = match (elastic_modulus, yield_strength)
            {
                (Some(e), Some(sy)) => (e, sy),
                _ => {
                    warn!("catalog csv: skipping row {} ('{}'): unparsable required field", line_num + 2, name);
                    summary.ignored += 1;
                    continue;
                }
            };

            let category_label = fields.get(category_idx).map(|s| s.trim()).unwrap_or("");
            let category = Category::from_label(category_label).unwrap_or_else(|| {
                warn!(
                    "catalog csv: unknown category '{}' for '{}', treating as Metal",
                    category_label, name
                );
                Category::Metal
            });

            let record = MaterialRecord {
                name,
                category: Some(category),
                elastic_modulus_mpa,
                yield_strength_mpa,
                ultimate_strength_mpa: su_idx.and_then(|i| fields.get(i)).and_then(|v| parse_optional_f64(v)),
                poisson_ratio: nu_idx.and_then(|i| fields.get(i)).and_then(|v| parse_optional_f64(v)),
            };

            if self.insert(record) {
                summary.added += 1;
            } else {
                summary.ignored += 1;
            }
        }

        Ok(summary)
    }
}

/// Parse an optional f64 from a CSV field
///
/// Returns None for empty strings, dashes, or invalid numbers.
fn parse_optional_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "—" {
        return None;
    }
    f64::from_str(trimmed).ok()
}

/// Get a catalog with common lab materials pre-loaded.
///
/// Covers every material family so each classifier branch is reachable from
/// the seed data alone, without needing a CSV import.
pub fn builtin_catalog() -> MaterialDb {
    let mut db = MaterialDb::new();

    let seed = [
        ("Steel A36", Category::Metal, 200_000.0, 250.0, Some(400.0), Some(0.26)),
        ("Aluminum 6061", Category::Metal, 68_900.0, 276.0, Some(310.0), Some(0.33)),
        ("Copper C11000", Category::Metal, 110_000.0, 69.0, Some(220.0), Some(0.34)),
        ("Nylon 6/6", Category::Polymer, 2_800.0, 60.0, Some(80.0), Some(0.39)),
        ("Alumina 99.5%", Category::Ceramic, 370_000.0, 300.0, Some(330.0), Some(0.22)),
        ("Soda-Lime Glass", Category::Glass, 69_000.0, 50.0, Some(70.0), Some(0.23)),
        ("CFRP Laminate", Category::Composite, 70_000.0, 500.0, Some(600.0), Some(0.30)),
    ];

    for (name, category, e, sy, su, nu) in seed {
        db.insert(MaterialRecord {
            name: name.to_string(),
            category: Some(category),
            elastic_modulus_mpa: e,
            yield_strength_mpa: sy,
            ultimate_strength_mpa: su,
            poisson_ratio: nu,
        });
    }

    db
}
