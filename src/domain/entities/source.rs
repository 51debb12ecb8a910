//! Source entity
//!
//! A declared origin of composable content and its resolved snapshot.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::domain::entities::RepoManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// A git repository fetched into the snapshot cache
    Remote,
    /// A directory on the local filesystem
    Local,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Remote => f.write_str("remote"),
            SourceKind::Local => f.write_str("local"),
        }
    }
}

/// A declared source. List position in the config is its precedence rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub kind: SourceKind,
    pub locator: String,
    pub alias: Option<String>,
    /// Branch or tag to fetch (remote only)
    pub git_ref: Option<String>,
}

impl Source {
    pub fn local(locator: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Local,
            locator: locator.into(),
            alias: None,
            git_ref: None,
        }
    }

    pub fn remote(locator: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Remote,
            locator: locator.into(),
            alias: None,
            git_ref: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    pub fn identity(&self) -> (SourceKind, &str) {
        (self.kind, self.locator.as_str())
    }

    /// Name used in messages: alias when set, otherwise the locator
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.locator)
    }
}

/// A source resolved to a read-only local directory
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSnapshot {
    source: Source,
    root: PathBuf,
    manifest: RepoManifest,
    fetched_at: Option<DateTime<Utc>>,
}

impl SourceSnapshot {
    pub fn new(source: Source, root: impl Into<PathBuf>, manifest: RepoManifest) -> Self {
        Self {
            source,
            root: root.into(),
            manifest,
            fetched_at: None,
        }
    }

    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &RepoManifest {
        &self.manifest
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Name used for provenance: the alias when configured, else the manifest name
    pub fn name(&self) -> &str {
        self.source
            .alias
            .as_deref()
            .unwrap_or(self.manifest.name.as_str())
    }
}
