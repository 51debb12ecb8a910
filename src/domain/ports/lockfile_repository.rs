//! LockfileRepository port - abstraction for lockfile persistence
//!
//! This trait allows the domain layer to load/save lockfiles
//! without knowing about TOML serialization details.

use std::path::{Path, PathBuf};

use crate::domain::entities::Lockfile;

/// Lockfile operation errors
#[derive(Debug, thiserror::Error)]
pub enum LockfileError {
    /// Content exists but cannot be parsed
    #[error("lockfile {} is corrupt: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },

    /// Written by an incompatible version of the tool
    #[error("lockfile {} has format version {found}, expected {expected}", .path.display())]
    VersionMismatch {
        path: PathBuf,
        found: String,
        expected: String,
    },

    #[error("lockfile I/O error at {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl LockfileError {
    /// Unreadable content is recoverable: the caller starts from an empty record
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            LockfileError::Corrupt { .. } | LockfileError::VersionMismatch { .. }
        )
    }
}

/// Abstract repository for lockfile persistence
pub trait LockfileRepository {
    /// Load the lockfile at `path`; `Ok(None)` when there is none
    fn load(&self, path: &Path) -> Result<Option<Lockfile>, LockfileError>;

    /// Persist atomically: readers see the old or the new record, never a mix
    fn save(&self, lockfile: &Lockfile, path: &Path) -> Result<(), LockfileError>;

    /// Remove the lockfile (missing file is not an error)
    fn delete(&self, path: &Path) -> Result<(), LockfileError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lockfile_error_display() {
        let err = LockfileError::Corrupt {
            path: PathBuf::from("ruleforge.lock"),
            message: "bad toml".to_string(),
        };
        assert!(err.to_string().contains("bad toml"));
        assert!(err.is_corrupt());
    }

    #[test]
    fn io_error_is_not_corrupt() {
        let err = LockfileError::Io {
            path: PathBuf::from("ruleforge.lock"),
            message: "denied".to_string(),
        };
        assert!(!err.is_corrupt());
    }
}
