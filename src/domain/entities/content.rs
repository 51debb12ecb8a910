//! Content entity - one unit of composable content
//!
//! Either a single file (rule, command document) or a bundle directory (a
//! skill: any directory holding a `SKILL.md`). Bundles are staged and
//! replaced as a whole.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::value_objects::RelativePath;

/// Marker file that turns a directory into a bundle entity
pub const BUNDLE_MARKER: &str = "SKILL.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    File,
    Directory,
}

/// Inclusion filter read from an entity's front-matter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTags {
    /// Include only when the active profile set intersects these; an
    /// empty set admits nothing
    pub include: Option<BTreeSet<String>>,
    /// Exclude when the active profile set intersects these
    pub exclude: Option<BTreeSet<String>>,
}

impl EntityTags {
    /// Tags of an entity with no filter at all
    pub fn unconditional() -> Self {
        Self::default()
    }

    pub fn is_unconditional(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    /// Whether the entity belongs in a composition for this active profile set
    pub fn admits(&self, active: &BTreeSet<String>) -> bool {
        if let Some(include) = &self.include {
            if include.is_disjoint(active) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if !exclude.is_disjoint(active) {
                return false;
            }
        }
        true
    }
}

/// Outcome of reading an entity's front-matter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontMatter {
    Tags(EntityTags),
    /// The block was present but could not be parsed
    Malformed(String),
}

impl Default for FrontMatter {
    fn default() -> Self {
        FrontMatter::Tags(EntityTags::unconditional())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityBody {
    File(Vec<u8>),
    /// Bundle files keyed by path relative to the bundle root
    Directory(BTreeMap<RelativePath, Vec<u8>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntity {
    path: RelativePath,
    front_matter: FrontMatter,
    body: EntityBody,
}

impl ContentEntity {
    pub fn file(path: RelativePath, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            front_matter: FrontMatter::default(),
            body: EntityBody::File(content.into()),
        }
    }

    pub fn directory(path: RelativePath, files: BTreeMap<RelativePath, Vec<u8>>) -> Self {
        Self {
            path,
            front_matter: FrontMatter::default(),
            body: EntityBody::Directory(files),
        }
    }

    pub fn with_front_matter(mut self, front_matter: FrontMatter) -> Self {
        self.front_matter = front_matter;
        self
    }

    pub fn with_tags(self, tags: EntityTags) -> Self {
        self.with_front_matter(FrontMatter::Tags(tags))
    }

    pub fn path(&self) -> &RelativePath {
        &self.path
    }

    pub fn kind(&self) -> EntityKind {
        match self.body {
            EntityBody::File(_) => EntityKind::File,
            EntityBody::Directory(_) => EntityKind::Directory,
        }
    }

    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    pub fn body(&self) -> &EntityBody {
        &self.body
    }

    /// Every file this entity contributes, as (output path, bytes)
    pub fn files(&self) -> Vec<(RelativePath, &[u8])> {
        match &self.body {
            EntityBody::File(bytes) => vec![(self.path.clone(), bytes.as_slice())],
            EntityBody::Directory(files) => files
                .iter()
                .filter_map(|(rel, bytes)| {
                    self.path
                        .join(rel.as_str())
                        .ok()
                        .map(|full| (full, bytes.as_slice()))
                })
                .collect(),
        }
    }
}
