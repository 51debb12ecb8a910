//! TOML Lockfile Repository
//!
//! Implements the LockfileRepository port using TOML format.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Lockfile, LOCKFILE_FORMAT_VERSION};
use crate::domain::ports::file_system::{FileSystem, FsError};
use crate::domain::ports::lockfile_repository::{LockfileError, LockfileRepository};
use crate::domain::value_objects::{ContentHash, RelativePath};
use crate::infrastructure::fs::LocalFs;

/// Default lockfile name at the project root
pub const LOCKFILE_NAME: &str = "ruleforge.lock";

/// TOML-based lockfile repository
pub struct TomlLockfileRepository {
    fs: LocalFs,
}

impl TomlLockfileRepository {
    /// Create a new repository with the default file system
    pub fn new() -> Self {
        Self { fs: LocalFs::new() }
    }
}

impl Default for TomlLockfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// TOML representation of the lockfile
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlLockfile {
    format_version: String,
    created_at: DateTime<Utc>,
    last_synced_at: DateTime<Utc>,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    directories: Vec<String>,
    #[serde(default)]
    hashes: BTreeMap<String, String>,
}

impl TomlLockfile {
    fn from_domain(lockfile: &Lockfile) -> Self {
        let mut files = Vec::new();
        let mut hashes = BTreeMap::new();
        for (path, hash) in lockfile.entries() {
            files.push(path.to_string());
            if let Some(hash) = hash {
                hashes.insert(path.to_string(), hash.to_string());
            }
        }

        Self {
            format_version: lockfile.format_version().to_string(),
            created_at: lockfile.created_at(),
            last_synced_at: lockfile.last_synced_at(),
            files,
            directories: lockfile.directories().map(|d| d.to_string()).collect(),
            hashes,
        }
    }

    fn into_domain(self, path: &Path) -> Result<Lockfile, LockfileError> {
        let corrupt = |message: String| LockfileError::Corrupt {
            path: path.to_path_buf(),
            message,
        };

        let mut files = BTreeMap::new();
        for file in &self.files {
            let rel = RelativePath::new(file).map_err(|e| corrupt(e.to_string()))?;
            let hash = self.hashes.get(file).map(|h| ContentHash::new(h));
            files.insert(rel, hash);
        }

        let directories = self
            .directories
            .iter()
            .map(|d| RelativePath::new(d).map_err(|e| corrupt(e.to_string())))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Lockfile::from_parts(
            self.format_version,
            self.created_at,
            self.last_synced_at,
            files,
            directories,
        ))
    }
}

fn io_error(path: &Path, err: FsError) -> LockfileError {
    LockfileError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl LockfileRepository for TomlLockfileRepository {
    fn load(&self, path: &Path) -> Result<Option<Lockfile>, LockfileError> {
        let bytes = match self.fs.read(path) {
            Ok(bytes) => bytes,
            Err(FsError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };

        let content = String::from_utf8(bytes).map_err(|e| LockfileError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let toml_lockfile: TomlLockfile =
            toml::from_str(&content).map_err(|e| LockfileError::Corrupt {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            })?;

        if toml_lockfile.format_version != LOCKFILE_FORMAT_VERSION {
            return Err(LockfileError::VersionMismatch {
                path: path.to_path_buf(),
                found: toml_lockfile.format_version,
                expected: LOCKFILE_FORMAT_VERSION.to_string(),
            });
        }

        toml_lockfile.into_domain(path).map(Some)
    }

    fn save(&self, lockfile: &Lockfile, path: &Path) -> Result<(), LockfileError> {
        let content = toml::to_string_pretty(&TomlLockfile::from_domain(lockfile)).map_err(|e| {
            LockfileError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        self.fs
            .write(path, content.as_bytes())
            .map_err(|e| io_error(path, e))
    }

    fn delete(&self, path: &Path) -> Result<(), LockfileError> {
        match self.fs.remove_file(path) {
            Ok(()) | Err(FsError::NotFound(_)) => Ok(()),
            Err(e) => Err(io_error(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rel(s: &str) -> RelativePath {
        RelativePath::new(s).unwrap()
    }

    #[test]
    fn load_nonexistent_returns_none() {
        let dir = tempdir().unwrap();
        let repo = TomlLockfileRepository::new();
        assert!(repo.load(&dir.path().join(LOCKFILE_NAME)).unwrap().is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCKFILE_NAME);
        let repo = TomlLockfileRepository::new();

        let mut lockfile = Lockfile::new(Utc::now());
        lockfile.track(rel(".claude/rules/style.md"), ContentHash::from_bytes(b"style"));
        lockfile.track(rel("CLAUDE.md"), ContentHash::from_bytes(b"memory"));
        lockfile.record_directory(rel(".claude/rules"));

        repo.save(&lockfile, &path).unwrap();
        let loaded = repo.load(&path).unwrap().unwrap();

        assert_eq!(loaded, lockfile);
    }

    #[test]
    fn saved_lockfile_lists_files_and_hashes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCKFILE_NAME);

        let mut lockfile = Lockfile::new(Utc::now());
        lockfile.track(rel("rules/a.md"), ContentHash::from_bytes(b"a"));
        TomlLockfileRepository::new().save(&lockfile, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("format_version = \"1\""));
        assert!(content.contains("files = [\"rules/a.md\"]"));
        assert!(content.contains("[hashes]"));
    }

    #[test]
    fn file_without_hash_loads_as_legacy_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCKFILE_NAME);
        std::fs::write(
            &path,
            r#"
format_version = "1"
created_at = "2026-01-01T00:00:00Z"
last_synced_at = "2026-01-02T00:00:00Z"
files = ["rules/a.md"]
"#,
        )
        .unwrap();

        let loaded = TomlLockfileRepository::new().load(&path).unwrap().unwrap();
        assert!(loaded.contains(&rel("rules/a.md")));
        assert_eq!(loaded.hash(&rel("rules/a.md")), None);
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCKFILE_NAME);
        std::fs::write(&path, "this is { not toml").unwrap();

        let err = TomlLockfileRepository::new().load(&path).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn unknown_version_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCKFILE_NAME);
        std::fs::write(
            &path,
            r#"
format_version = "99"
created_at = "2026-01-01T00:00:00Z"
last_synced_at = "2026-01-01T00:00:00Z"
"#,
        )
        .unwrap();

        let err = TomlLockfileRepository::new().load(&path).unwrap_err();
        assert!(matches!(err, LockfileError::VersionMismatch { ref found, .. } if found == "99"));
        assert!(err.is_corrupt());
    }

    #[test]
    fn traversal_path_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCKFILE_NAME);
        std::fs::write(
            &path,
            r#"
format_version = "1"
created_at = "2026-01-01T00:00:00Z"
last_synced_at = "2026-01-01T00:00:00Z"
files = ["../outside.md"]
"#,
        )
        .unwrap();

        assert!(TomlLockfileRepository::new().load(&path).unwrap_err().is_corrupt());
    }

    #[test]
    fn delete_missing_is_ok() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCKFILE_NAME);
        let repo = TomlLockfileRepository::new();

        repo.delete(&path).unwrap();
        repo.save(&Lockfile::new(Utc::now()), &path).unwrap();
        repo.delete(&path).unwrap();
        assert!(!path.exists());
    }
}
