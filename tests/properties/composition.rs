//! Property tests for composition override order.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use ruleforge::domain::entities::{ContentEntity, EntityTags};
use ruleforge::domain::services::{compose, LoadedSource, ResolvedProfile};
use ruleforge::domain::value_objects::{MalformedPolicy, RelativePath};

/// Paths that never nest inside one another
const PATHS: &[&str] = &["rules/a.md", "rules/b.md", "docs/c.md", "AGENTS.md"];

/// path index -> content
fn layer() -> impl Strategy<Value = BTreeMap<usize, String>> {
    proptest::collection::btree_map(0..PATHS.len(), "[a-z]{1,8}", 0..=PATHS.len())
}

/// (shared layer, `dev` profile layer) per source
fn sources() -> impl Strategy<Value = Vec<(BTreeMap<usize, String>, BTreeMap<usize, String>)>> {
    proptest::collection::vec((layer(), layer()), 1..4)
}

fn entities(layer: &BTreeMap<usize, String>) -> Vec<ContentEntity> {
    layer
        .iter()
        .map(|(idx, content)| {
            ContentEntity::file(RelativePath::new(PATHS[*idx]).unwrap(), content.as_bytes())
        })
        .collect()
}

fn loaded(specs: &[(BTreeMap<usize, String>, BTreeMap<usize, String>)]) -> Vec<LoadedSource> {
    specs
        .iter()
        .enumerate()
        .map(|(idx, (shared, profile))| {
            LoadedSource::new(format!("source-{}", idx), format!("/src/{}/shared", idx))
                .with_shared(entities(shared))
                .with_profile(ResolvedProfile::top(idx, "dev"), entities(profile))
        })
        .collect()
}

fn active() -> BTreeSet<String> {
    BTreeSet::from(["dev".to_string()])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every shared layer lands before any profile layer, each in
    /// source order, and the last write to a path wins.
    #[test]
    fn property_last_writer_wins(specs in sources()) {
        let mut expected: BTreeMap<RelativePath, Vec<u8>> = BTreeMap::new();
        for (shared, _) in &specs {
            for (idx, content) in shared {
                expected.insert(RelativePath::new(PATHS[*idx]).unwrap(), content.clone().into_bytes());
            }
        }
        for (_, profile) in &specs {
            for (idx, content) in profile {
                expected.insert(RelativePath::new(PATHS[*idx]).unwrap(), content.clone().into_bytes());
            }
        }

        let composition = compose(&loaded(&specs), &active(), MalformedPolicy::Skip);

        prop_assert_eq!(composition.tree.files(), expected);
        prop_assert!(composition.filtered.is_empty());
    }

    /// PROPERTY: a shared entity excluded from the active profile never
    /// reaches the tree unless a profile layer provides the path itself.
    #[test]
    fn property_excluded_shared_content_is_filtered(specs in sources()) {
        let excluded = EntityTags {
            include: None,
            exclude: Some(BTreeSet::from(["dev".to_string()])),
        };
        let sources: Vec<LoadedSource> = loaded(&specs)
            .into_iter()
            .map(|mut source| {
                source.shared = source
                    .shared
                    .into_iter()
                    .map(|e| e.with_tags(excluded.clone()))
                    .collect();
                source
            })
            .collect();

        let composition = compose(&sources, &active(), MalformedPolicy::Skip);

        let from_profiles: BTreeSet<&str> = specs
            .iter()
            .flat_map(|(_, profile)| profile.keys().map(|idx| PATHS[*idx]))
            .collect();
        let staged: BTreeSet<&str> = composition
            .tree
            .entries()
            .map(|(path, _)| path.as_str())
            .collect();
        prop_assert_eq!(staged, from_profiles);

        let shared_count: usize = specs.iter().map(|(shared, _)| shared.len()).sum();
        prop_assert_eq!(composition.filtered.len(), shared_count);
    }
}
