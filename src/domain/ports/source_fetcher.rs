//! SourceFetcher port - how remote sources become local directories
//!
//! The resolver owns caching and freshness; a fetcher only knows how to
//! produce a fresh copy of a remote source in an empty directory.

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to run fetch command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("fetch of {locator} failed: {message}")]
    Failed { locator: String, message: String },
}

pub trait SourceFetcher: Sync {
    /// Place a copy of `locator` (at `git_ref` when given) into `dest`
    fn fetch(&self, locator: &str, git_ref: Option<&str>, dest: &Path) -> Result<(), FetchError>;
}

impl<T: SourceFetcher + ?Sized> SourceFetcher for &T {
    fn fetch(&self, locator: &str, git_ref: Option<&str>, dest: &Path) -> Result<(), FetchError> {
        (**self).fetch(locator, git_ref, dest)
    }
}
