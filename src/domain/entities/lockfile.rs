//! Lock record entity - the set of paths the tool owns in a project
//!
//! Pure data; persistence lives in `LockfileRepository`. Alongside each
//! tracked path the record keeps the hash of the bytes last written there,
//! which is how the reconciler tells a stale tracked file from one the user
//! edited since.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{ContentHash, RelativePath};

/// Current on-disk format version
pub const LOCKFILE_FORMAT_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq)]
pub struct Lockfile {
    format_version: String,
    created_at: DateTime<Utc>,
    last_synced_at: DateTime<Utc>,
    /// Tracked paths and the hash recorded at the last write (None for legacy entries)
    files: BTreeMap<RelativePath, Option<ContentHash>>,
    /// Directories this tool created, eligible for pruning once empty
    directories: BTreeSet<RelativePath>,
}

impl Lockfile {
    /// Create a new empty lockfile stamped with `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            format_version: LOCKFILE_FORMAT_VERSION.to_string(),
            created_at: now,
            last_synced_at: now,
            files: BTreeMap::new(),
            directories: BTreeSet::new(),
        }
    }

    /// Rebuild a record from persisted parts
    pub fn from_parts(
        format_version: impl Into<String>,
        created_at: DateTime<Utc>,
        last_synced_at: DateTime<Utc>,
        files: BTreeMap<RelativePath, Option<ContentHash>>,
        directories: BTreeSet<RelativePath>,
    ) -> Self {
        Self {
            format_version: format_version.into(),
            created_at,
            last_synced_at,
            files,
            directories,
        }
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_synced_at(&self) -> DateTime<Utc> {
        self.last_synced_at
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_synced_at = now;
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.files.contains_key(path)
    }

    /// Hash recorded for a tracked path
    pub fn hash(&self, path: &RelativePath) -> Option<&ContentHash> {
        self.files.get(path).and_then(|h| h.as_ref())
    }

    /// Track a path with the hash of the bytes now on disk
    pub fn track(&mut self, path: RelativePath, hash: ContentHash) {
        self.files.insert(path, Some(hash));
    }

    pub fn untrack(&mut self, path: &RelativePath) -> bool {
        self.files.remove(path).is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.files.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&RelativePath, Option<&ContentHash>)> {
        self.files.iter().map(|(p, h)| (p, h.as_ref()))
    }

    pub fn record_directory(&mut self, dir: RelativePath) {
        self.directories.insert(dir);
    }

    pub fn forget_directory(&mut self, dir: &RelativePath) {
        self.directories.remove(dir);
    }

    pub fn owns_directory(&self, dir: &RelativePath) -> bool {
        self.directories.contains(dir)
    }

    pub fn directories(&self) -> impl Iterator<Item = &RelativePath> {
        self.directories.iter()
    }
}
