//! JSON file persistence for memory snapshots
//!
//! Saves go through a temp file plus rename so a crash mid-write never
//! leaves a half-written snapshot behind. Loads tolerate corruption: a
//! file that fails to parse is moved aside to a timestamped backup and
//! the caller starts from an empty snapshot.

use crate::conversation::MemorySnapshot;
use chrono::Utc;
use libris_core::MemoryError;
use std::path::{Path, PathBuf};

/// Persists per-session memory snapshots as JSON files.
pub struct FileMemoryStore {
    path: PathBuf,
}

impl FileMemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically write a snapshot: serialize to `<path>.tmp`, then rename
    /// over the target.
    pub fn save(&self, snapshot: &MemorySnapshot) -> Result<(), MemoryError> {
        let json =
            serde_json::to_string_pretty(snapshot).map_err(|e| MemoryError::Serialization {
                details: e.to_string(),
            })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| MemoryError::Io {
                    details: format!("creating {}: {e}", parent.display()),
                })?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| MemoryError::Io {
            details: format!("writing {}: {e}", tmp.display()),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| MemoryError::Io {
            details: format!("renaming {}: {e}", tmp.display()),
        })?;
        Ok(())
    }

    /// Load the snapshot. A missing file yields an empty snapshot; a
    /// corrupt file is moved aside and an empty snapshot is returned so
    /// startup never fails on bad state on disk.
    pub fn load(&self) -> Result<MemorySnapshot, MemoryError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(MemorySnapshot::default());
            }
            Err(e) => {
                return Err(MemoryError::Io {
                    details: format!("reading {}: {e}", self.path.display()),
                });
            }
        };

        match serde_json::from_str(&contents) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                let backup = self.quarantine_corrupt()?;
                tracing::warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "Corrupt memory file moved aside; starting empty"
                );
                Ok(MemorySnapshot::default())
            }
        }
    }

    fn quarantine_corrupt(&self) -> Result<PathBuf, MemoryError> {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let mut backup = self.path.as_os_str().to_owned();
        backup.push(format!(".corrupted.{stamp}"));
        let backup = PathBuf::from(backup);
        std::fs::rename(&self.path, &backup).map_err(|e| MemoryError::Io {
            details: format!("backing up {}: {e}", self.path.display()),
        })?;
        Ok(backup)
    }
}
