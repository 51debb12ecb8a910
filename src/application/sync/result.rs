//! Sync Result

use crate::application::deployer::Deployment;
use crate::domain::services::{DeploymentPlan, FilteredEntity};
use crate::domain::value_objects::RelativePath;
use crate::error::Warning;

/// Before/after text of one path, for `--diff`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: RelativePath,
    /// Current project content; `None` when absent or not valid UTF-8
    pub before: Option<String>,
    /// Desired content; `None` for deletions
    pub after: Option<String>,
}

/// A staged path whose content came from a later layer than the first one
/// that provided it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub path: RelativePath,
    pub winner: String,
    pub replaced: String,
}

/// Result of a sync (or plan) run
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    pub plan: DeploymentPlan,
    pub dry_run: bool,
    /// `None` for dry runs
    pub deployment: Option<Deployment>,
    /// Source names in override order
    pub sources: Vec<String>,
    /// `source/profile[:sub]` in overlay order
    pub profiles: Vec<String>,
    pub filtered: Vec<FilteredEntity>,
    pub overrides: Vec<Override>,
    pub warnings: Vec<Warning>,
    pub diffs: Vec<FileDiff>,
}

impl SyncResult {
    pub fn has_conflicts(&self) -> bool {
        self.plan.has_conflicts()
    }

    /// Whether the project was (or would be) changed
    pub fn has_changes(&self) -> bool {
        match &self.deployment {
            Some(deployment) => deployment.has_changes(),
            None => !self.plan.is_noop(),
        }
    }

    /// All warnings: pipeline ones first, then per-path deployment failures
    pub fn all_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().chain(
            self.deployment
                .iter()
                .flat_map(|deployment| deployment.warnings.iter()),
        )
    }

    pub fn is_success(&self) -> bool {
        self.deployment
            .as_ref()
            .map(Deployment::is_success)
            .unwrap_or(true)
    }
}
