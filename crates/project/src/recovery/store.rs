//! Storage backends for recovery snapshots and session flags.
//!
//! The store is the only state shared across process lifetimes, so the file
//! backend writes every change through to disk immediately.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::snapshot::RecoverySnapshot;
use crate::error::{ProjectError, ProjectResult};
use crate::save::write_atomic;

const SNAPSHOTS_FILE: &str = "snapshots.json";
const SESSION_FILE: &str = "session.json";
const CORRUPT_SUFFIX: &str = ".corrupt";

/// Persisted session lifecycle flags.
///
/// A session that set `active` and never set `closed` ended in a crash.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFlags {
    pub active: bool,
    pub closed: bool,
}

impl SessionFlags {
    pub const ACTIVE: Self = Self {
        active: true,
        closed: false,
    };
    pub const CLOSED: Self = Self {
        active: false,
        closed: true,
    };

    pub fn indicates_crash(self) -> bool {
        self.active && !self.closed
    }
}

/// Where recovery data lives. Snapshots are kept oldest first.
pub trait RecoveryStore {
    fn load_snapshots(&self) -> ProjectResult<Vec<RecoverySnapshot>>;
    fn save_snapshots(&mut self, snapshots: &[RecoverySnapshot]) -> ProjectResult<()>;
    fn load_flags(&self) -> ProjectResult<SessionFlags>;
    fn save_flags(&mut self, flags: SessionFlags) -> ProjectResult<()>;
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// Directory-backed store: `snapshots.json` plus `session.json`.
#[derive(Clone, Debug)]
pub struct FileRecoveryStore {
    dir: PathBuf,
}

impl FileRecoveryStore {
    /// Use `dir` for storage. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> ProjectResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| storage_error("create directory", &self.dir, e))
    }

    fn read_optional(&self, name: &str) -> ProjectResult<Option<String>> {
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &path, e)),
        }
    }

    /// Move an unreadable file to `<name>.corrupt` so the next write cannot
    /// destroy it. A previous `.corrupt` copy is replaced.
    fn set_aside(&self, name: &str) -> ProjectResult<PathBuf> {
        let path = self.dir.join(name);
        let aside = self.dir.join(format!("{name}{CORRUPT_SUFFIX}"));
        std::fs::rename(&path, &aside).map_err(|e| storage_error("set aside", &path, e))?;
        Ok(aside)
    }

    fn write(&self, name: &str, json: &str) -> ProjectResult<()> {
        self.ensure_dir()?;
        let path = self.dir.join(name);
        write_atomic(&path, json.as_bytes()).map_err(|e| ProjectError::Storage {
            reason: format!("write {}: {e}", path.display()),
        })
    }
}

impl RecoveryStore for FileRecoveryStore {
    /// A missing file is an empty list. A corrupt file is renamed to
    /// `snapshots.json.corrupt` and the list starts empty, so a bad write
    /// cannot block startup and the old data survives the next save.
    fn load_snapshots(&self) -> ProjectResult<Vec<RecoverySnapshot>> {
        let Some(json) = self.read_optional(SNAPSHOTS_FILE)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<RecoverySnapshot>>(&json) {
            Ok(snapshots) => {
                debug!(count = snapshots.len(), dir = %self.dir.display(), "Loaded recovery snapshots");
                Ok(snapshots)
            }
            Err(e) => {
                let aside = self.set_aside(SNAPSHOTS_FILE)?;
                warn!(error = %e, moved_to = %aside.display(), "Failed to parse recovery snapshots, starting fresh");
                Ok(Vec::new())
            }
        }
    }

    fn save_snapshots(&mut self, snapshots: &[RecoverySnapshot]) -> ProjectResult<()> {
        let json = serde_json::to_string(snapshots)?;
        self.write(SNAPSHOTS_FILE, &json)
    }

    fn load_flags(&self) -> ProjectResult<SessionFlags> {
        let Some(json) = self.read_optional(SESSION_FILE)? else {
            return Ok(SessionFlags::default());
        };
        serde_json::from_str(&json).or_else(|e| {
            warn!(error = %e, "Failed to parse session flags, assuming clean shutdown");
            Ok(SessionFlags::default())
        })
    }

    fn save_flags(&mut self, flags: SessionFlags) -> ProjectResult<()> {
        let json = serde_json::to_string(&flags)?;
        self.write(SESSION_FILE, &json)
    }
}

fn storage_error(op: &str, path: &Path, e: std::io::Error) -> ProjectError {
    tracing::error!(path = %path.display(), error = %e, "Recovery storage {op} failed");
    ProjectError::Storage {
        reason: format!("{op} {}: {e}", path.display()),
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryInner {
    snapshots: Vec<RecoverySnapshot>,
    flags: SessionFlags,
    fail_writes: bool,
}

/// In-memory store. Clones share the same data, so a clone kept by the
/// caller outlives a manager and can play the part of the next process.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecoveryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryRecoveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    fn check_writable(&self) -> ProjectResult<()> {
        if self.inner.lock().fail_writes {
            return Err(ProjectError::Storage {
                reason: "memory store is read-only".into(),
            });
        }
        Ok(())
    }
}

impl RecoveryStore for MemoryRecoveryStore {
    fn load_snapshots(&self) -> ProjectResult<Vec<RecoverySnapshot>> {
        Ok(self.inner.lock().snapshots.clone())
    }

    fn save_snapshots(&mut self, snapshots: &[RecoverySnapshot]) -> ProjectResult<()> {
        self.check_writable()?;
        self.inner.lock().snapshots = snapshots.to_vec();
        Ok(())
    }

    fn load_flags(&self) -> ProjectResult<SessionFlags> {
        Ok(self.inner.lock().flags)
    }

    fn save_flags(&mut self, flags: SessionFlags) -> ProjectResult<()> {
        self.check_writable()?;
        self.inner.lock().flags = flags;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sq_app_state::{AppSnapshot, AppState};

    fn snapshot() -> RecoverySnapshot {
        RecoverySnapshot::capture(AppSnapshot::capture(&AppState::new()))
    }

    #[test]
    fn crash_flag_logic() {
        assert!(!SessionFlags::default().indicates_crash());
        assert!(SessionFlags::ACTIVE.indicates_crash());
        assert!(!SessionFlags::CLOSED.indicates_crash());
    }

    #[test]
    fn file_store_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecoveryStore::new(dir.path().join("recovery"));
        assert!(store.load_snapshots().unwrap().is_empty());
        assert_eq!(store.load_flags().unwrap(), SessionFlags::default());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("recovery");
        let mut store = FileRecoveryStore::new(&root);
        let snaps = vec![snapshot(), snapshot()];
        store.save_snapshots(&snaps).unwrap();
        store.save_flags(SessionFlags::ACTIVE).unwrap();

        let reopened = FileRecoveryStore::new(&root);
        assert_eq!(reopened.load_snapshots().unwrap(), snaps);
        assert!(reopened.load_flags().unwrap().indicates_crash());
    }

    #[test]
    fn corrupt_snapshot_file_is_set_aside() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SNAPSHOTS_FILE), "not json").unwrap();
        let mut store = FileRecoveryStore::new(dir.path());
        assert!(store.load_snapshots().unwrap().is_empty());

        let aside = dir.path().join("snapshots.json.corrupt");
        assert_eq!(std::fs::read_to_string(&aside).unwrap(), "not json");
        assert!(!dir.path().join(SNAPSHOTS_FILE).exists());

        store.save_snapshots(&[snapshot()]).unwrap();
        assert_eq!(std::fs::read_to_string(&aside).unwrap(), "not json");
        assert_eq!(store.load_snapshots().unwrap().len(), 1);
    }

    #[test]
    fn unwritable_location_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let mut store = FileRecoveryStore::new(blocker.join("recovery"));
        let err = store.save_flags(SessionFlags::ACTIVE).unwrap_err();
        assert!(matches!(err, ProjectError::Storage { .. }));
    }

    #[test]
    fn memory_store_clones_share_data() {
        let store = MemoryRecoveryStore::new();
        let mut writer = store.clone();
        writer.save_flags(SessionFlags::ACTIVE).unwrap();
        writer.save_snapshots(&[snapshot()]).unwrap();
        assert!(store.load_flags().unwrap().indicates_crash());
        assert_eq!(store.load_snapshots().unwrap().len(), 1);
    }

    #[test]
    fn memory_store_write_failure() {
        let mut store = MemoryRecoveryStore::new();
        store.set_fail_writes(true);
        assert!(store.save_flags(SessionFlags::ACTIVE).is_err());
        store.set_fail_writes(false);
        assert!(store.save_flags(SessionFlags::ACTIVE).is_ok());
    }
}
