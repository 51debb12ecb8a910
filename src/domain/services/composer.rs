//! Composer
//!
//! Merges loaded source content into a staging tree with a strict two-level
//! override:
//!
//! 1. shared content of every source, in source order, tag-filtered
//! 2. profile content of every source, in source order, then in profile
//!    sequence order, unfiltered
//!
//! Same path: the later write replaces the earlier one entirely.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::domain::entities::{
    ContentEntity, EntityKind, FrontMatter, Origin, StagingTree, BUNDLE_MARKER,
};
use crate::domain::services::ResolvedProfile;
use crate::domain::value_objects::{MalformedPolicy, RelativePath};
use crate::error::{Warning, WarningKind};

/// Content of one profile of a loaded source
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProfile {
    pub profile: ResolvedProfile,
    pub entities: Vec<ContentEntity>,
}

/// Everything composition needs from one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSource {
    pub name: String,
    /// Directory the shared entities were read from (for messages)
    pub shared_root: PathBuf,
    pub shared: Vec<ContentEntity>,
    /// Profiles of this snapshot, in profile sequence order
    pub profiles: Vec<LoadedProfile>,
}

impl LoadedSource {
    pub fn new(name: impl Into<String>, shared_root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            shared_root: shared_root.into(),
            shared: Vec::new(),
            profiles: Vec::new(),
        }
    }

    pub fn with_shared(mut self, shared: Vec<ContentEntity>) -> Self {
        self.shared = shared;
        self
    }

    pub fn with_profile(mut self, profile: ResolvedProfile, entities: Vec<ContentEntity>) -> Self {
        self.profiles.push(LoadedProfile { profile, entities });
        self
    }
}

/// A shared entity left out by its tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredEntity {
    pub source: String,
    pub path: RelativePath,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    pub tree: StagingTree,
    pub filtered: Vec<FilteredEntity>,
    pub warnings: Vec<Warning>,
}

pub fn compose(
    sources: &[LoadedSource],
    active: &BTreeSet<String>,
    on_malformed: MalformedPolicy,
) -> Composition {
    let mut composition = Composition::default();

    for source in sources {
        for entity in &source.shared {
            let admitted = match entity.front_matter() {
                FrontMatter::Tags(tags) => tags.admits(active),
                FrontMatter::Malformed(message) => {
                    composition.warnings.push(malformed_warning(source, entity, message));
                    on_malformed == MalformedPolicy::Include
                }
            };

            if admitted {
                composition
                    .tree
                    .place(entity.clone(), Origin::shared(&source.name));
            } else {
                composition.filtered.push(FilteredEntity {
                    source: source.name.clone(),
                    path: entity.path().clone(),
                });
            }
        }
    }

    for source in sources {
        for loaded in &source.profiles {
            for entity in &loaded.entities {
                composition.tree.place(
                    entity.clone(),
                    Origin::profile(&source.name, &loaded.profile),
                );
            }
        }
    }

    composition
}

fn malformed_warning(source: &LoadedSource, entity: &ContentEntity, message: &str) -> Warning {
    let mut file = entity.path().to_path(&source.shared_root);
    if entity.kind() == EntityKind::Directory {
        file.push(BUNDLE_MARKER);
    }
    Warning::new(WarningKind::MalformedEntity, file, message)
}
