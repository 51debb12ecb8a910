//! Snapshot Cache
//!
//! Remote sources are cloned into `<cache dir>/<key digest>/`. The pinned
//! snapshot of each key and the time it was fetched are recorded in
//! `<cache dir>/index.toml`. The index is read once per run and written
//! once after every source resolved, so parallel fetches never race on it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ports::file_system::FileSystem;
use crate::domain::value_objects::ContentHash;
use crate::infrastructure::fs::LocalFs;

const INDEX_FILE: &str = "index.toml";
const INDEX_VERSION: u32 = 1;

/// Environment variable overriding the cache location
pub const CACHE_DIR_VAR: &str = "RULEFORGE_CACHE_DIR";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl CacheError {
    fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// A pinned snapshot recorded in the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSnapshot {
    pub path: PathBuf,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlCacheEntry {
    key: String,
    dir: String,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlIndex {
    version: u32,
    #[serde(default)]
    snapshots: Vec<TomlCacheEntry>,
}

/// Cache key for a remote locator at an optional ref
pub fn cache_key(locator: &str, git_ref: Option<&str>) -> String {
    match git_ref {
        Some(r) => format!("{}#{}", locator, r),
        None => locator.to_string(),
    }
}

/// Default cache directory: `$RULEFORGE_CACHE_DIR`, else the platform cache dir
pub fn default_cache_dir(env_override: Option<&Path>) -> PathBuf {
    if let Some(dir) = env_override {
        return dir.to_path_buf();
    }
    dirs::cache_dir()
        .map(|d| d.join("ruleforge").join("sources"))
        .unwrap_or_else(|| PathBuf::from(".ruleforge-cache"))
}

pub struct SnapshotCache {
    dir: PathBuf,
    entries: BTreeMap<String, CachedSnapshot>,
}

impl SnapshotCache {
    /// Open the cache at `dir`; an unreadable index starts empty
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let entries = match load_index(&dir) {
            Ok(entries) => entries,
            Err(message) => {
                log::warn!("ignoring unreadable snapshot index in {}: {}", dir.display(), message);
                BTreeMap::new()
            }
        };
        Self { dir, entries }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory the snapshot of `key` lives in
    pub fn snapshot_dir(&self, key: &str) -> PathBuf {
        self.dir.join(dir_name(key))
    }

    /// Pinned snapshot for `key`, if recorded and still on disk
    pub fn lookup(&self, key: &str) -> Option<&CachedSnapshot> {
        self.entries.get(key).filter(|s| s.path.is_dir())
    }

    /// Fresh scratch directory next to the snapshots, for a clone in progress
    pub fn scratch_dir(&self) -> Result<tempfile::TempDir, CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;
        tempfile::Builder::new()
            .prefix(".fetch-")
            .tempdir_in(&self.dir)
            .map_err(|e| CacheError::io(&self.dir, e))
    }

    /// Move a completed clone into place as the snapshot of `key`.
    ///
    /// The previous snapshot is moved aside before the rename, so the
    /// snapshot directory only ever holds a complete clone.
    pub fn install(&self, key: &str, clone: &Path) -> Result<PathBuf, CacheError> {
        let target = self.snapshot_dir(key);
        if target.exists() {
            let retired = tempfile::Builder::new()
                .prefix(".retired-")
                .tempdir_in(&self.dir)
                .map_err(|e| CacheError::io(&self.dir, e))?;
            let aside = retired.path().join("snapshot");
            fs::rename(&target, &aside).map_err(|e| CacheError::io(&target, e))?;
            // `retired` drops here and removes the old snapshot
        }
        fs::rename(clone, &target).map_err(|e| CacheError::io(&target, e))?;
        Ok(target)
    }

    /// Record `key` as pinned at `fetched_at`
    pub fn record(&mut self, key: &str, fetched_at: DateTime<Utc>) {
        self.entries.insert(
            key.to_string(),
            CachedSnapshot {
                path: self.snapshot_dir(key),
                fetched_at,
            },
        );
    }

    /// Persist the index
    pub fn save(&self) -> Result<(), CacheError> {
        let index = TomlIndex {
            version: INDEX_VERSION,
            snapshots: self
                .entries
                .iter()
                .map(|(key, snap)| TomlCacheEntry {
                    key: key.clone(),
                    dir: dir_name(key),
                    fetched_at: snap.fetched_at,
                })
                .collect(),
        };
        let path = self.dir.join(INDEX_FILE);
        let content = toml::to_string_pretty(&index).map_err(|e| CacheError::io(&path, e))?;
        LocalFs::new()
            .write(&path, content.as_bytes())
            .map_err(|e| CacheError::io(&path, e))
    }
}

fn dir_name(key: &str) -> String {
    let hash = ContentHash::from_bytes(key.as_bytes());
    hash.hex()[..16].to_string()
}

fn load_index(dir: &Path) -> Result<BTreeMap<String, CachedSnapshot>, String> {
    let path = dir.join(INDEX_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.to_string()),
    };
    let index: TomlIndex = toml::from_str(&content).map_err(|e| e.message().to_string())?;
    if index.version != INDEX_VERSION {
        return Err(format!("unsupported index version {}", index.version));
    }

    Ok(index
        .snapshots
        .into_iter()
        .map(|entry| {
            let snap = CachedSnapshot {
                path: dir.join(&entry.dir),
                fetched_at: entry.fetched_at,
            };
            (entry.key, snap)
        })
        .collect())
}
