//! Whole-state snapshot document and its atomic file replacement.
//!
//! # Responsibility
//! - Define the persisted JSON layout of the store.
//! - Replace the snapshot file all-or-nothing: temp file in the same
//!   directory, `fsync`, then `rename` over the canonical path.
//!
//! # Invariants
//! - The canonical file is always either the previous complete snapshot or
//!   the new complete snapshot.
//! - Documents newer than `SNAPSHOT_FORMAT_VERSION` are rejected, never
//!   partially read.
//! - This module knows nothing about domain rules; it only moves bytes.

use crate::model::assessment::{Answer, Question, ResultRecord, Test};
use crate::model::organization::{Class, Grade, School, Student, Teacher};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Latest snapshot layout this build reads and writes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Complete serialized copy of all entity state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u32,
    #[serde(default)]
    pub schools: Vec<School>,
    #[serde(default)]
    pub grades: Vec<Grade>,
    #[serde(default)]
    pub classes: Vec<Class>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub tests: Vec<Test>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    UnsupportedVersion { found: u32, latest_supported: u32 },
    InvalidPath(PathBuf),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "snapshot I/O failed at `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "snapshot encoding failed: {err}"),
            Self::UnsupportedVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "snapshot format version {found} is newer than supported {latest_supported}"
            ),
            Self::InvalidPath(path) => {
                write!(f, "snapshot path `{}` has no file name", path.display())
            }
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::UnsupportedVersion { .. } | Self::InvalidPath(_) => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Handle to the canonical snapshot path.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    temp_path: PathBuf,
}

impl SnapshotFile {
    /// Creates a handle; fails when `path` has no file name component.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let path = path.into();
        let file_name = path
            .file_name()
            .ok_or_else(|| SnapshotError::InvalidPath(path.clone()))?;
        let temp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));
        Ok(Self { path, temp_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp file used while a write is in flight.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Reads and decodes the snapshot; `Ok(None)` when no file exists yet.
    pub fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(&self.path, err)),
        };

        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.format_version,
                latest_supported: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok(Some(snapshot))
    }

    /// Atomically replaces the canonical file with `snapshot`.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|err| self.io_error(parent, err))?;
            }
        }

        let mut encoded = serde_json::to_vec_pretty(snapshot)?;
        encoded.push(b'\n');

        let mut temp = File::create(&self.temp_path)
            .map_err(|err| self.io_error(&self.temp_path, err))?;
        temp.write_all(&encoded)
            .and_then(|()| temp.sync_all())
            .map_err(|err| self.io_error(&self.temp_path, err))?;
        drop(temp);

        if let Err(err) = fs::rename(&self.temp_path, &self.path) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(self.io_error(&self.path, err));
        }
        Ok(())
    }

    /// Removes a temp file left behind by an interrupted write.
    ///
    /// Returns whether a stale file was found.
    pub fn discard_stale_temp(&self) -> Result<bool, SnapshotError> {
        match fs::remove_file(&self.temp_path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.io_error(&self.temp_path, err)),
        }
    }

    fn io_error(&self, path: &Path, source: io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Snapshot, SnapshotError, SnapshotFile, SNAPSHOT_FORMAT_VERSION};
    use crate::model::ids::SchoolId;
    use crate::model::organization::School;
    use tempfile::TempDir;

    fn one_school_snapshot() -> Snapshot {
        Snapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            schools: vec![School {
                id: SchoolId::new("s1"),
                name: "North".to_string(),
                created_at: 1,
            }],
            ..Snapshot::default()
        }
    }

    #[test]
    fn save_then_load_returns_same_document_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested").join("state.json")).unwrap();

        file.save(&one_school_snapshot()).unwrap();

        assert_eq!(file.load().unwrap(), Some(one_school_snapshot()));
        assert!(!file.temp_path().exists());
        assert_eq!(
            file.temp_path().file_name().unwrap().to_string_lossy(),
            ".state.json.tmp"
        );
    }

    #[test]
    fn load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(dir.path().join("absent.json")).unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn newer_format_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"format_version": 99}"#).unwrap();

        let err = SnapshotFile::new(&path).unwrap().load().unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedVersion {
                found: 99,
                latest_supported: SNAPSHOT_FORMAT_VERSION
            }
        ));
    }

    #[test]
    fn truncated_document_is_a_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"format_version": 1, "schools": ["#).unwrap();

        let err = SnapshotFile::new(&path).unwrap().load().unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
    }

    #[test]
    fn failed_rename_removes_temp_file_and_keeps_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupant"), b"x").unwrap();
        let file = SnapshotFile::new(&path).unwrap();

        let err = file.save(&one_school_snapshot()).unwrap_err();

        assert!(matches!(err, SnapshotError::Io { .. }));
        assert!(!file.temp_path().exists());
        assert!(path.join("occupant").exists());
    }

    #[test]
    fn stale_temp_file_is_discarded_once() {
        let dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(dir.path().join("state.json")).unwrap();
        std::fs::write(file.temp_path(), b"partial").unwrap();

        assert!(file.discard_stale_temp().unwrap());
        assert!(!file.discard_stale_temp().unwrap());
    }
}
