//! Relative Path Value Object
//!
//! Every path the tool composes, generates, deploys or records in the lockfile
//! is a `RelativePath`:
//! - relative (no leading `/`, no drive prefix)
//! - no traversal (`..`) and no `.` segments
//! - non-empty
//! - stored with `/` separators so lockfiles are portable

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Error when path validation fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path contains traversal components (..): {0}")]
    ContainsTraversal(String),
    #[error("absolute paths are not allowed: {0}")]
    AbsoluteNotAllowed(String),
    #[error("path is empty")]
    Empty,
}

/// A validated, normalized relative path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(String);

impl RelativePath {
    /// Validate and normalize a path
    pub fn new(path: impl AsRef<str>) -> Result<Self, PathError> {
        let raw = path.as_ref();
        let normalized = raw.replace('\\', "/");

        if normalized.starts_with('/') || has_drive_prefix(&normalized) {
            return Err(PathError::AbsoluteNotAllowed(raw.to_string()));
        }

        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(PathError::ContainsTraversal(raw.to_string())),
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self(segments.join("/")))
    }

    /// Build from a filesystem path relative to some root
    pub fn from_path(path: &Path) -> Result<Self, PathError> {
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(PathError::ContainsTraversal(path.display().to_string()))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathError::AbsoluteNotAllowed(path.display().to_string()))
                }
            }
        }
        Self::new(parts.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a relative suffix onto this path
    pub fn join(&self, suffix: &str) -> Result<Self, PathError> {
        Self::new(format!("{}/{}", self.0, suffix))
    }

    /// Parent path, `None` for a top-level entry
    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once('/').map(|(parent, _)| Self(parent.to_string()))
    }

    /// All proper ancestors, nearest first
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(p) = current {
            current = p.parent();
            out.push(p);
        }
        out
    }

    /// True when `self` lies strictly below `other`
    pub fn is_descendant_of(&self, other: &RelativePath) -> bool {
        self.0.len() > other.0.len()
            && self.0.starts_with(&other.0)
            && self.0.as_bytes()[other.0.len()] == b'/'
    }

    /// Resolve against a root directory
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.0.split('/') {
            path.push(segment);
        }
        path
    }
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl serde::Serialize for RelativePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
