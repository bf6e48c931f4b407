//! # File I/O Module
//!
//! Handles catalog file operations with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Prevent concurrent edits on shared drives
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Catalogs are saved as JSON files (by default `~/.materium/materials.json`).
//! Lock files use a `.lock` suffix with metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lab_core::file_io::{save_catalog, load_catalog, FileLock};
//! use lab_core::materials::builtin_catalog;
//! use std::path::Path;
//!
//! let db = builtin_catalog();
//! let path = Path::new("materials.json");
//!
//! // Acquire lock before saving
//! let lock = FileLock::acquire(path, "engineer@lab.example").unwrap();
//!
//! // Save with atomic write
//! save_catalog(&db, path).unwrap();
//!
//! // Lock is released when dropped
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{SimError, SimResult};
use crate::materials::{MaterialDb, MaterialRecord};

/// Current schema version for catalog files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// On-disk shape of a saved catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    /// Schema version the file was written with
    version: String,
    /// When the file was written
    saved: DateTime<Utc>,
    /// Material rows, sorted by name for stable diffs
    materials: Vec<MaterialRecord>,
}

/// Lock file metadata stored in .lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Default location of the user catalog.
///
/// `$MATERIUM_DATA_DIR/materials.json` when the override is set, otherwise
/// `~/.materium/materials.json`.
pub fn default_catalog_path() -> PathBuf {
    if let Ok(dir) = std::env::var("MATERIUM_DATA_DIR") {
        return PathBuf::from(dir).join("materials.json");
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".materium").join("materials.json")
}

/// File lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. .lock file with metadata for user visibility
pub struct FileLock {
    /// Path to the catalog file
    catalog_path: PathBuf,
    /// Path to the lock file
    lock_path: PathBuf,
    /// The underlying file handle (keeps OS lock)
    _lock_file: File,
    /// Lock metadata
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a catalog file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the catalog JSON file
    /// * `user_id` - Identifier for the user acquiring the lock
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired successfully
    /// * `Err(SimError::FileLocked)` - Another process holds the lock
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> SimResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        // Check if lock file exists and contains valid lock info
        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                // Check if the lock is stale (process no longer running)
                if !is_lock_stale(&existing) {
                    return Err(SimError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                warn!(
                    "taking over stale catalog lock on {} (was {} pid {})",
                    path.display(),
                    existing.user_id,
                    existing.pid
                );
            }
        }

        // Create/open the lock file
        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                SimError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        // Try to acquire exclusive OS-level lock (non-blocking)
        lock_file.try_lock_exclusive().map_err(|_| {
            SimError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        // Write lock info to the file using the same handle
        let lock_json =
            serde_json::to_string_pretty(&info).map_err(|e| SimError::SerializationError {
                reason: e.to_string(),
            })?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            SimError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;

        lock_file.sync_all().map_err(|e| {
            SimError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        Ok(FileLock {
            catalog_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a file is locked without acquiring the lock.
    ///
    /// Returns `Some(LockInfo)` if locked, `None` if available.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }

    /// Get the path to the catalog file
    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Remove the lock file
        let _ = fs::remove_file(&self.lock_path);
        // OS lock is released when _lock_file is dropped
    }
}

/// Get the lock file path for a catalog file
fn lock_path_for(catalog_path: &Path) -> PathBuf {
    let mut lock_path = catalog_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Read lock info from a lock file
fn read_lock_info(lock_path: &Path) -> SimResult<LockInfo> {
    let mut file = File::open(lock_path).map_err(|e| {
        SimError::file_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        SimError::file_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    serde_json::from_str(&contents).map_err(|e| SimError::SerializationError {
        reason: e.to_string(),
    })
}

/// Check if a lock is stale (the process that created it is no longer running)
fn is_lock_stale(info: &LockInfo) -> bool {
    // Check if it's our machine
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            // Same machine - check if process is still running
            #[cfg(windows)]
            {
                use std::process::Command;
                let output = Command::new("tasklist")
                    .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                    .output();
                if let Ok(output) = output {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    // If PID not found, lock is stale
                    if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                        return true;
                    }
                }
            }
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    // If lock is more than 24 hours old, consider it stale
    let age = Utc::now() - info.locked_at;
    if age.num_hours() > 24 {
        return true;
    }

    false
}

/// Save a catalog to a file with atomic write semantics.
///
/// The save process:
/// 1. Serialize the catalog to JSON (rows sorted by name)
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename .tmp to the final name (atomic on most filesystems)
///
/// This prevents corruption if the process is interrupted during write.
pub fn save_catalog(db: &MaterialDb, path: &Path) -> SimResult<()> {
    let file = CatalogFile {
        version: SCHEMA_VERSION.to_string(),
        saved: Utc::now(),
        materials: db.all().into_iter().cloned().collect(),
    };

    let json = serde_json::to_string_pretty(&file).map_err(|e| SimError::SerializationError {
        reason: e.to_string(),
    })?;

    // Create the parent directory if needed (first save of a fresh install)
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                SimError::file_error("create dir", parent.display().to_string(), e.to_string())
            })?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        SimError::file_error(
            "create temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        SimError::file_error(
            "write temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    tmp_file.sync_all().map_err(|e| {
        SimError::file_error(
            "sync temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        // Clean up temp file if rename fails
        let _ = fs::remove_file(&tmp_path);
        SimError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a catalog from a file.
///
/// # Returns
///
/// * `Ok(MaterialDb)` - Successfully loaded catalog
/// * `Err(SimError::VersionMismatch)` - File version is incompatible
/// * `Err(SimError::SerializationError)` - Invalid JSON
/// * `Err(SimError::FileError)` - I/O error
pub fn load_catalog(path: &Path) -> SimResult<MaterialDb> {
    let mut file = File::open(path)
        .map_err(|e| SimError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| SimError::file_error("read", path.display().to_string(), e.to_string()))?;

    let catalog: CatalogFile =
        serde_json::from_str(&contents).map_err(|e| SimError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&catalog.version)?;

    let mut db = MaterialDb::new();
    for record in catalog.materials {
        if !db.insert(record) {
            warn!("catalog {}: duplicate material name skipped", path.display());
        }
    }
    Ok(db)
}

/// Load a catalog, returning whether it's read-only due to a lock.
///
/// # Returns
///
/// * `Ok((MaterialDb, None))` - Loaded successfully, no lock
/// * `Ok((MaterialDb, Some(LockInfo)))` - Loaded, but another user has the lock
/// * `Err(_)` - Failed to load
pub fn load_catalog_with_lock_check(path: &Path) -> SimResult<(MaterialDb, Option<LockInfo>)> {
    let db = load_catalog(path)?;
    let lock_info = FileLock::check(path);
    Ok((db, lock_info))
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> SimResult<()> {
    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(SimError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(SimError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // For 0.x versions, a newer minor version than we support must fail
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(SimError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::builtin_catalog;
    use std::env::temp_dir;

    fn temp_catalog_path(name: &str) -> PathBuf {
        temp_dir().join(format!("materium_test_{}.json", name))
    }

    #[test]
    fn test_lock_path_generation() {
        let catalog_path = Path::new("/path/to/materials.json");
        let lock_path = lock_path_for(catalog_path);
        assert_eq!(lock_path, Path::new("/path/to/materials.json.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("test@example.com");
        assert_eq!(info.user_id, "test@example.com");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_catalog_path("roundtrip");

        let db = builtin_catalog();
        save_catalog(&db, &path).unwrap();

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded.len(), db.len());
        let a36 = loaded.lookup("Steel A36").unwrap();
        assert_eq!(a36.yield_strength_mpa, 250.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_catalog_path("atomic");
        let tmp_path = path.with_extension("json.tmp");

        save_catalog(&builtin_catalog(), &path).unwrap();

        // Temp file should not exist after successful save
        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_catalog_path("lock_test");

        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);

        // Lock file should be removed
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());

        // Different major should fail
        assert!(validate_version("1.0.0").is_err());

        // Newer minor (in 0.x) should fail
        assert!(validate_version("0.2.0").is_err());
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = temp_catalog_path("lock_check");

        save_catalog(&builtin_catalog(), &path).unwrap();

        let (loaded, lock_info) = load_catalog_with_lock_check(&path).unwrap();
        assert!(!loaded.is_empty());
        assert!(lock_info.is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_default_catalog_path_override() {
        // With the env override the path lands inside the given directory
        std::env::set_var("MATERIUM_DATA_DIR", "/tmp/materium_test_dir");
        let path = default_catalog_path();
        assert_eq!(
            path,
            PathBuf::from("/tmp/materium_test_dir/materials.json")
        );
        std::env::remove_var("MATERIUM_DATA_DIR");
    }
}
