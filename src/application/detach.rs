//! Detach Use Case
//!
//! Removes the tool from a project: reconciles against an empty output tree
//! (deleting every tracked file still in its last written state), then
//! removes the lock record itself. Tracked files the user edited stay on
//! disk as conflicts and simply become native files.

use chrono::{DateTime, Utc};

use crate::application::context::RunContext;
use crate::application::deployer::{Deployer, Deployment};
use crate::application::sync::load_previous;
use crate::domain::entities::OutputTree;
use crate::domain::ports::{FileSystem, LockfileRepository};
use crate::domain::services::DeploymentPlan;
use crate::error::{RuleforgeError, RuleforgeResult, Warning};

#[derive(Debug, Clone, Default)]
pub struct DetachOptions {
    pub dry_run: bool,
}

impl DetachOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetachResult {
    pub plan: DeploymentPlan,
    pub dry_run: bool,
    pub deployment: Option<Deployment>,
    /// Whether a lock record existed (and was, or would be, removed)
    pub had_lockfile: bool,
    pub warnings: Vec<Warning>,
}

impl DetachResult {
    pub fn has_conflicts(&self) -> bool {
        self.plan.has_conflicts()
    }

    pub fn all_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().chain(
            self.deployment
                .iter()
                .flat_map(|deployment| deployment.warnings.iter()),
        )
    }
}

pub struct DetachUseCase<LR, FS>
where
    LR: LockfileRepository,
    FS: FileSystem,
{
    lockfile_repo: LR,
    file_system: FS,
}

impl<LR, FS> DetachUseCase<LR, FS>
where
    LR: LockfileRepository,
    FS: FileSystem,
{
    pub fn new(lockfile_repo: LR, file_system: FS) -> Self {
        Self {
            lockfile_repo,
            file_system,
        }
    }

    pub fn execute(
        &self,
        ctx: &RunContext,
        options: &DetachOptions,
        now: DateTime<Utc>,
    ) -> RuleforgeResult<DetachResult> {
        let lock_path = ctx.lockfile_path();
        let had_lockfile = self.file_system.exists(&lock_path);

        let mut warnings = Vec::new();
        let previous = load_previous(&self.lockfile_repo, &lock_path, now, &mut warnings)?;

        let deployer = Deployer::new(&self.file_system, ctx.project_root());
        let plan = deployer.plan(&previous, &OutputTree::new());

        let mut result = DetachResult {
            dry_run: options.dry_run,
            had_lockfile,
            warnings,
            ..Default::default()
        };

        if options.dry_run {
            result.plan = plan;
            return Ok(result);
        }
        ctx.interrupt.check()?;

        let deployment = deployer.execute(&plan, &previous, now);
        self.lockfile_repo
            .delete(&lock_path)
            .map_err(|e| RuleforgeError::LockWrite {
                path: lock_path.clone(),
                message: e.to_string(),
            })?;
        log::info!(
            "detached: {} deleted, {} left in place",
            deployment.deleted.len(),
            plan.conflicts().len()
        );

        result.plan = plan;
        result.deployment = Some(deployment);
        Ok(result)
    }
}
