//! Error types for Ruleforge
//!
//! Fatal errors abort a run before the project is touched. Recoverable
//! problems are not errors at all: they become [`Warning`]s collected in the
//! run report.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Ruleforge operations
pub type RuleforgeResult<T> = Result<T, RuleforgeError>;

/// Fatal error kinds
#[derive(Error, Debug)]
pub enum RuleforgeError {
    /// Project config missing, malformed, or incomplete
    #[error("invalid config {}: {message}", .file.display())]
    ConfigInvalid { file: PathBuf, message: String },

    /// A declared source could not be turned into a snapshot
    #[error("cannot resolve source '{source_name}': {message}")]
    SourceUnresolvable { source_name: String, message: String },

    /// No resolved source declares the selected profile
    #[error("profile '{selector}' is not declared by any source")]
    ProfileNotFound { selector: String },

    /// The generation engine failed; there is nothing to reconcile against
    #[error("generation failed: {message}")]
    GenerationFailure { message: String },

    /// The lock record could not be persisted
    #[error("failed to write lockfile {}: {message}", .path.display())]
    LockWrite { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The user interrupted the run before deployment started
    #[error("interrupted before any file was changed")]
    Interrupted,
}

impl RuleforgeError {
    pub fn config(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn source(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SourceUnresolvable {
            source_name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Kind of a recoverable problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Front-matter of a content file could not be parsed
    MalformedEntity,
    /// The previous lock record was unreadable; treated as empty
    LockCorrupt,
    /// Unknown key in a config or manifest file
    UnknownKey,
    /// A single file could not be written or removed
    Deployment,
    /// A remote source could not be refreshed; the cached snapshot was used
    StaleSource,
    /// A symbolic link inside a source tree; not followed
    SkippedLink,
}

/// A recoverable problem surfaced in the end-of-run report
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub path: PathBuf,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}
