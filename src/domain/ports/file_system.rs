//! FileSystem port - abstraction over file I/O operations
//!
//! The deployer and reconciler only see the target project through this
//! trait, so the same logic runs against the local disk or a test double.

use std::path::{Path, PathBuf};

use crate::domain::value_objects::ContentHash;

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Attach the offending path to an `io::Error`
    pub fn at(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            _ => FsError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// What occupies a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// Abstract file system interface
pub trait FileSystem {
    /// Read file content
    fn read(&self, path: &Path) -> FsResult<Vec<u8>>;

    /// Write content atomically, creating parent directories
    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()>;

    /// What is at `path`, `None` when nothing is (symlinks are not followed)
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;

    /// Create a single directory; the parent must exist
    fn create_dir(&self, path: &Path) -> FsResult<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> FsResult<()>;

    /// Remove a directory, failing unless it is empty
    fn remove_empty_dir(&self, path: &Path) -> FsResult<()>;

    /// Whether a directory has no entries
    fn is_empty_dir(&self, path: &Path) -> bool;

    /// Compute content hash (SHA256)
    fn hash(&self, path: &Path) -> FsResult<ContentHash> {
        self.read(path).map(|bytes| ContentHash::from_bytes(&bytes))
    }

    fn exists(&self, path: &Path) -> bool {
        self.entry_kind(path).is_some()
    }
}
