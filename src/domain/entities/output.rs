//! Output tree - what the generation engine produced
//!
//! Keyed by final project-relative path. This is the desired state the
//! reconciler compares the project against.

use std::collections::BTreeMap;

use crate::domain::value_objects::{ContentHash, RelativePath};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTree {
    files: BTreeMap<RelativePath, Vec<u8>>,
}

impl OutputTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: RelativePath, content: impl Into<Vec<u8>>) {
        self.files.insert(path, content.into());
    }

    pub fn get(&self, path: &RelativePath) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    pub fn hash(&self, path: &RelativePath) -> Option<ContentHash> {
        self.get(path).map(ContentHash::from_bytes)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.files.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.files.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelativePath, &[u8])> {
        self.files.iter().map(|(p, c)| (p, c.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<(RelativePath, Vec<u8>)> for OutputTree {
    fn from_iter<I: IntoIterator<Item = (RelativePath, Vec<u8>)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
