//! Staging tree - the result of composition
//!
//! Exactly one entity occupies a relative path. Placing an entity replaces
//! whatever was there and evicts any staged entity it overlaps (a file
//! inside a bundle, or a bundle around a file).

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::entities::ContentEntity;
use crate::domain::value_objects::RelativePath;

/// Which layer of which source staged an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub source: String,
    /// `shared` or `profile:<id>` / `profile:<id>:<sub>`
    pub layer: String,
}

impl Origin {
    pub fn shared(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            layer: "shared".to_string(),
        }
    }

    pub fn profile(source: impl Into<String>, profile: impl fmt::Display) -> Self {
        Self {
            source: source.into(),
            layer: format!("profile:{}", profile),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.layer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub entity: ContentEntity,
    pub origin: Origin,
    /// Origin of the entry this one replaced, if any
    pub replaced: Option<Origin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingTree {
    entries: BTreeMap<RelativePath, StagedEntry>,
}

impl StagingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an entity at its path, replacing and evicting overlaps
    pub fn place(&mut self, entity: ContentEntity, origin: Origin) {
        let path = entity.path().clone();

        let mut replaced = self.entries.remove(&path).map(|e| e.origin);

        let overlapping: Vec<RelativePath> = self
            .entries
            .keys()
            .filter(|existing| existing.is_descendant_of(&path) || path.is_descendant_of(existing))
            .cloned()
            .collect();
        for key in overlapping {
            if let Some(evicted) = self.entries.remove(&key) {
                replaced.get_or_insert(evicted.origin);
            }
        }

        self.entries.insert(
            path,
            StagedEntry {
                entity,
                origin,
                replaced,
            },
        );
    }

    pub fn get(&self, path: &RelativePath) -> Option<&StagedEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&RelativePath, &StagedEntry)> {
        self.entries.iter()
    }

    /// All staged files with bundles expanded, sorted by path
    pub fn files(&self) -> BTreeMap<RelativePath, Vec<u8>> {
        self.entries
            .values()
            .flat_map(|entry| entry.entity.files())
            .map(|(path, bytes)| (path, bytes.to_vec()))
            .collect()
    }
}
