//! Repository Implementations
//!
//! Concrete implementations of domain repository ports, plus the manifest
//! loader and the remote snapshot cache.

mod lockfile;
mod manifest;
mod snapshot_cache;

pub use lockfile::{TomlLockfileRepository, LOCKFILE_NAME};
pub use manifest::{load_manifest, parse_manifest, ManifestError, MANIFEST_NAME};
pub use snapshot_cache::{
    cache_key, default_cache_dir, CacheError, CachedSnapshot, SnapshotCache, CACHE_DIR_VAR,
};
