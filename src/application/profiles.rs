//! Profile listing
//!
//! Resolves the configured sources and reports the profiles each declares,
//! marking the ones the current selectors activate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::context::RunContext;
use crate::application::pipeline::Pipeline;
use crate::domain::ports::SourceFetcher;
use crate::domain::services::resolve_profiles;
use crate::error::{RuleforgeResult, Warning};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedProfile {
    /// `profile` or `profile:sub`
    pub name: String,
    pub description: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceProfiles {
    pub source: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub profiles: Vec<ListedProfile>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileListing {
    pub selectors: Vec<String>,
    pub sources: Vec<SourceProfiles>,
    /// Set when the selectors do not resolve; listing still succeeds
    pub selection_error: Option<String>,
    pub warnings: Vec<Warning>,
}

pub fn list_profiles<F: SourceFetcher>(
    pipeline: &Pipeline<F>,
    ctx: &RunContext,
    now: DateTime<Utc>,
) -> RuleforgeResult<ProfileListing> {
    let project = pipeline.resolve(ctx, now)?;

    let manifests: Vec<_> = project.snapshots.iter().map(|s| s.manifest()).collect();
    let (resolution, selection_error) = match resolve_profiles(&project.config.selectors, &manifests) {
        Ok(resolution) => (Some(resolution), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let is_active = |snapshot: usize, name: &str| {
        resolution.as_ref().is_some_and(|r| {
            r.for_snapshot(snapshot)
                .any(|p| p.qualified_name() == name)
        })
    };

    let sources = project
        .snapshots
        .iter()
        .enumerate()
        .map(|(idx, snapshot)| {
            let manifest = snapshot.manifest();
            let mut profiles = Vec::new();
            for decl in &manifest.profiles {
                profiles.push(ListedProfile {
                    name: decl.id.clone(),
                    description: decl.description.clone(),
                    active: is_active(idx, &decl.id),
                });
                for sub in &decl.sub_profiles {
                    let name = format!("{}:{}", decl.id, sub.id);
                    profiles.push(ListedProfile {
                        active: is_active(idx, &name),
                        name,
                        description: sub.description.clone(),
                    });
                }
            }
            SourceProfiles {
                source: snapshot.name().to_string(),
                description: manifest.description.clone(),
                version: manifest.version.clone(),
                profiles,
            }
        })
        .collect();

    Ok(ProfileListing {
        selectors: project
            .config
            .selectors
            .iter()
            .map(|s| s.to_string())
            .collect(),
        sources,
        selection_error,
        warnings: project.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FetchError;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    struct NoFetch;

    impl SourceFetcher for NoFetch {
        fn fetch(&self, locator: &str, _git_ref: Option<&str>, _dest: &Path) -> Result<(), FetchError> {
            Err(FetchError::Failed {
                locator: locator.to_string(),
                message: "offline".to_string(),
            })
        }
    }

    #[test]
    fn lists_declared_profiles_and_marks_active() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("rules");
        fs::create_dir_all(&source).unwrap();
        fs::write(
            source.join("ruleforge.repo.toml"),
            r#"
name = "acme"
version = "1.2.0"

[profiles.development]
description = "Everyday work"

[profiles.development.sub-profiles]
frontend = "Frontend"
backend = "Backend"

[profiles.research]
description = "Exploration"
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("ruleforge.toml"),
            "profiles = [\"development:frontend\"]\ntargets = [\"claude\"]\nfeatures = [\"rules\"]\nsources = [\"rules\"]\n",
        )
        .unwrap();

        let listing = list_profiles(&Pipeline::new(NoFetch), &RunContext::new(dir.path()), Utc::now())
            .unwrap();

        assert_eq!(listing.sources.len(), 1);
        let names: Vec<(&str, bool)> = listing.sources[0]
            .profiles
            .iter()
            .map(|p| (p.name.as_str(), p.active))
            .collect();
        assert_eq!(
            names,
            vec![
                ("development", true),
                ("development:frontend", true),
                ("development:backend", false),
                ("research", false),
            ]
        );
        assert!(listing.selection_error.is_none());
    }
}
