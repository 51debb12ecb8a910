//! Profile resolver
//!
//! Expands the configured selectors against every resolved source's
//! manifest into the ordered profile sequence composition overlays.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::entities::RepoManifest;
use crate::domain::value_objects::{ProfileSelector, SubSelector};
use crate::error::{RuleforgeError, RuleforgeResult};

/// One profile (or sub-profile) of one snapshot, in overlay order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedProfile {
    /// Index of the snapshot in source order
    pub snapshot: usize,
    pub profile: String,
    pub sub: Option<String>,
}

impl ResolvedProfile {
    pub fn top(snapshot: usize, profile: impl Into<String>) -> Self {
        Self {
            snapshot,
            profile: profile.into(),
            sub: None,
        }
    }

    pub fn sub(snapshot: usize, profile: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            snapshot,
            profile: profile.into(),
            sub: Some(sub.into()),
        }
    }

    /// `profile` or `profile:sub`
    pub fn qualified_name(&self) -> String {
        match &self.sub {
            Some(sub) => format!("{}:{}", self.profile, sub),
            None => self.profile.clone(),
        }
    }
}

impl fmt::Display for ResolvedProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileResolution {
    pub sequence: Vec<ResolvedProfile>,
}

impl ProfileResolution {
    /// Names tag filters match against: every profile id plus `id:sub` names
    pub fn active_set(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        for resolved in &self.sequence {
            set.insert(resolved.profile.clone());
            if resolved.sub.is_some() {
                set.insert(resolved.qualified_name());
            }
        }
        set
    }

    /// The profiles of one snapshot, in sequence order
    pub fn for_snapshot(&self, snapshot: usize) -> impl Iterator<Item = &ResolvedProfile> {
        self.sequence.iter().filter(move |p| p.snapshot == snapshot)
    }

    /// Append an explicitly selected profile; an earlier occurrence moves here
    fn select(&mut self, resolved: ResolvedProfile) {
        self.sequence.retain(|p| p != &resolved);
        self.sequence.push(resolved);
    }

    /// Append a parent pulled in by a sub-profile selector, unless already present
    fn pull_in(&mut self, resolved: ResolvedProfile) {
        if !self.sequence.contains(&resolved) {
            self.sequence.push(resolved);
        }
    }
}

/// Resolve selectors against manifests given in source order.
///
/// The sequence is the concatenation of every selector's expansion, and a
/// profile selected again moves to its last position so later selectors
/// win. A qualified selector pulls its parent profile in right before its
/// sub-profiles when the parent is not already in the sequence.
pub fn resolve_profiles(
    selectors: &[ProfileSelector],
    manifests: &[&RepoManifest],
) -> RuleforgeResult<ProfileResolution> {
    let mut resolution = ProfileResolution::default();

    for selector in selectors {
        let mut found = false;

        for (idx, manifest) in manifests.iter().enumerate() {
            let Some(decl) = manifest.profile(selector.profile()) else {
                continue;
            };

            match selector.sub() {
                SubSelector::None => {
                    resolution.select(ResolvedProfile::top(idx, &decl.id));
                    found = true;
                }
                SubSelector::Named(sub) => {
                    if decl.sub_profile(sub).is_some() {
                        resolution.pull_in(ResolvedProfile::top(idx, &decl.id));
                        resolution.select(ResolvedProfile::sub(idx, &decl.id, sub));
                        found = true;
                    }
                }
                SubSelector::All => {
                    resolution.pull_in(ResolvedProfile::top(idx, &decl.id));
                    for sub in &decl.sub_profiles {
                        resolution.select(ResolvedProfile::sub(idx, &decl.id, &sub.id));
                    }
                    found = true;
                }
            }
        }

        if !found {
            return Err(RuleforgeError::ProfileNotFound {
                selector: selector.to_string(),
            });
        }
    }

    Ok(resolution)
}
