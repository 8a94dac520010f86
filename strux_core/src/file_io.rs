//! # File I/O Module
//!
//! Reads and writes `.struxml` documents with:
//! - **Atomic saves**: write to `.struxml.tmp`, sync, rename over the target
//! - **File locking**: an OS lock plus a `.struxml.lock` file naming the holder
//! - **Version validation**: documents newer than this reader are rejected
//!
//! ## Example
//!
//! ```rust,no_run
//! use strux_core::config::DocumentSettings;
//! use strux_core::file_io::{load_model, save_model, FileLock};
//! use strux_core::model::Model;
//! use std::path::Path;
//!
//! let model = Model::new();
//! let path = Path::new("frame.struxml");
//!
//! let lock = FileLock::acquire(path, "engineer@company.com")?;
//! save_model(&model, &DocumentSettings::default(), path)?;
//! drop(lock);
//!
//! let loaded = load_model(path)?;
//! assert_eq!(loaded.id, model.id);
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::DocumentSettings;
use crate::errors::{StruxError, StruxResult};
use crate::model::Model;
use crate::struxml::{read_model, write_model};

/// Extension of interchange documents
pub const STRUXML_EXTENSION: &str = "struxml";

/// Lock file metadata stored next to the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

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

/// Exclusive lock on a document, released when dropped.
///
/// Holds an OS-level lock through `fs2` and writes a lock file with
/// [`LockInfo`] so other users can see who is editing.
pub struct FileLock {
    document_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a document.
    ///
    /// A lock left behind by a dead process on this machine, or older than
    /// 24 hours, is taken over.
    ///
    /// # Errors
    ///
    /// * `FileLocked` - another process holds the lock
    /// * `FileError` - the lock file could not be written
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> StruxResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = live_lock(&lock_path) {
            return Err(StruxError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = open_locked(&lock_path, path)?;
        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| StruxError::SerializationError {
            reason: e.to_string(),
        })?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| StruxError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| StruxError::file_error("sync lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), user = %info.user_id, "acquired document lock");
        Ok(FileLock {
            document_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock on `path`, if anyone
    pub fn check(path: &Path) -> Option<LockInfo> {
        live_lock(&lock_path_for(path))
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Open the lock file and take the OS lock. The file is emptied only once
/// the lock is held, so a losing acquirer never clears the holder's info.
fn open_locked(lock_path: &Path, document_path: &Path) -> StruxResult<File> {
    let lock_file = OpenOptions::new()
        .write(true)
        .read(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| StruxError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

    lock_file.try_lock_exclusive().map_err(|_| {
        StruxError::file_locked(document_path.display().to_string(), "another process", "unknown")
    })?;
    lock_file
        .set_len(0)
        .map_err(|e| StruxError::file_error("clear lock", lock_path.display().to_string(), e.to_string()))?;
    Ok(lock_file)
}

fn lock_path_for(document_path: &Path) -> PathBuf {
    let mut lock_path = document_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn live_lock(lock_path: &Path) -> Option<LockInfo> {
    if !lock_path.exists() {
        return None;
    }
    match read_lock_info(lock_path) {
        Ok(info) if !is_lock_stale(&info) => Some(info),
        Ok(info) => {
            warn!(path = %lock_path.display(), holder = %info.user_id, "ignoring stale lock");
            None
        }
        Err(_) => None,
    }
}

fn read_lock_info(lock_path: &Path) -> StruxResult<LockInfo> {
    let mut file = File::open(lock_path)
        .map_err(|e| StruxError::file_error("read lock", lock_path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| StruxError::file_error("read lock", lock_path.display().to_string(), e.to_string()))?;

    serde_json::from_str(&contents).map_err(|e| StruxError::SerializationError {
        reason: e.to_string(),
    })
}

/// A lock is stale when its process is gone from this machine or it is more
/// than a day old
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().as_deref() == Some(info.machine.as_str()) {
        #[cfg(windows)]
        {
            use std::process::Command;
            let output = Command::new("tasklist")
                .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                .output();
            if let Ok(output) = output {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if !stdout.contains(&info.pid.to_string()) {
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

    (Utc::now() - info.locked_at).num_hours() > 24
}

/// Write a model document with atomic-save semantics.
///
/// The document goes to `<path>.tmp` first, is synced, then renamed over
/// `path`, so an interrupted save never leaves a truncated document.
pub fn save_model(model: &Model, settings: &DocumentSettings, path: &Path) -> StruxResult<()> {
    let xml = write_model(model, settings)?;
    let tmp_path = path.with_extension(format!("{}.tmp", STRUXML_EXTENSION));

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| StruxError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(xml.as_bytes())
        .map_err(|e| StruxError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| StruxError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StruxError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(path = %path.display(), bytes = xml.len(), "saved model");
    Ok(())
}

/// Read a model document.
///
/// # Errors
///
/// * `FileError` - the file could not be read
/// * `VersionMismatch` - the document is newer than this reader
/// * any document error from [`read_model`]
pub fn load_model(path: &Path) -> StruxResult<Model> {
    let contents = fs::read_to_string(path)
        .map_err(|e| StruxError::file_error("read", path.display().to_string(), e.to_string()))?;
    let model = read_model(&contents)?;
    info!(path = %path.display(), entities = model.entity_count(), "loaded model");
    Ok(model)
}

/// Load a model and report whether someone else holds its lock.
///
/// A locked document should be opened read-only.
pub fn load_model_with_lock_check(path: &Path) -> StruxResult<(Model, Option<LockInfo>)> {
    let model = load_model(path)?;
    Ok((model, FileLock::check(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::LoadCase;
    use tempfile::tempdir;

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/path/to/frame.struxml"));
        assert_eq!(lock_path, Path::new("/path/to/frame.struxml.lock"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roundtrip.struxml");

        let mut model = Model::new();
        model.add_load_case(LoadCase::dead_load("DL")).unwrap();
        save_model(&model, &DocumentSettings::default(), &path).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.id, model.id);
        assert_eq!(loaded.load_cases(), model.load_cases());
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atomic.struxml");

        save_model(&Model::new(), &DocumentSettings::default(), &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("struxml.tmp").exists());
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.struxml");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");
        assert!(lock_path_for(&path).exists());

        drop(lock);
        assert!(!lock_path_for(&path).exists());
    }

    #[test]
    fn test_losing_acquirer_keeps_holder_info() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contended.struxml");
        let lock = FileLock::acquire(&path, "holder@example.com").unwrap();
        let lock_path = lock_path_for(&path);

        // A second acquirer that got past the lock file check
        let err = open_locked(&lock_path, &path).unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");

        let info = read_lock_info(&lock_path).unwrap();
        assert_eq!(info, lock.info);
    }

    #[test]
    fn test_acquire_replaces_leftover_lock_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leftover.struxml");
        let lock_path = lock_path_for(&path);
        fs::write(&lock_path, "x".repeat(4096)).unwrap();

        let lock = FileLock::acquire(&path, "next@example.com").unwrap();
        assert_eq!(read_lock_info(&lock_path).unwrap(), lock.info);
    }

    #[test]
    fn test_old_lock_is_stale() {
        let info = LockInfo {
            locked_at: Utc::now() - chrono::Duration::hours(30),
            machine: "elsewhere".to_string(),
            ..LockInfo::new("someone")
        };
        assert!(is_lock_stale(&info));
    }

    #[test]
    fn test_load_with_lock_check() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("check.struxml");
        save_model(&Model::new(), &DocumentSettings::default(), &path).unwrap();

        let (_, lock_info) = load_model_with_lock_check(&path).unwrap();
        assert!(lock_info.is_none());
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let dir = tempdir().unwrap();
        let err = load_model(&dir.path().join("absent.struxml")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
