//! Sync Use Case
//!
//! 1. Run the composition pipeline (all fatal errors surface here)
//! 2. Load the previous lock record
//! 3. Plan against the project
//! 4. Execute the plan unless this is a dry run
//! 5. Write the new lock record back atomically
//!
//! An interrupt is honoured up to step 3. From step 4 on the run completes
//! so the project never ends up with files written and a stale lock.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::application::context::RunContext;
use crate::application::deployer::Deployer;
use crate::application::pipeline::Pipeline;
use crate::domain::entities::{Lockfile, OutputTree};
use crate::domain::ports::{FileSystem, LockfileRepository, SourceFetcher};
use crate::domain::services::{DeploymentPlan, PlanAction};
use crate::error::{RuleforgeError, RuleforgeResult, Warning, WarningKind};

use super::options::SyncOptions;
use super::result::{FileDiff, Override, SyncResult};

pub struct SyncUseCase<F, LR, FS>
where
    F: SourceFetcher,
    LR: LockfileRepository,
    FS: FileSystem,
{
    pipeline: Pipeline<F>,
    lockfile_repo: LR,
    file_system: FS,
}

impl<F, LR, FS> SyncUseCase<F, LR, FS>
where
    F: SourceFetcher,
    LR: LockfileRepository,
    FS: FileSystem,
{
    pub fn new(pipeline: Pipeline<F>, lockfile_repo: LR, file_system: FS) -> Self {
        Self {
            pipeline,
            lockfile_repo,
            file_system,
        }
    }

    pub fn execute(
        &self,
        ctx: &RunContext,
        options: &SyncOptions,
        now: DateTime<Utc>,
    ) -> RuleforgeResult<SyncResult> {
        let pipeline = self.pipeline.run(ctx, now)?;

        let lock_path = ctx.lockfile_path();
        let mut warnings = pipeline.warnings;
        let previous = load_previous(&self.lockfile_repo, &lock_path, now, &mut warnings)?;

        let deployer = Deployer::new(&self.file_system, ctx.project_root());
        let plan = deployer.plan(&previous, &pipeline.output);
        log::info!(
            "plan: {} to write, {} to delete, {} conflicts",
            plan.to_write().len(),
            plan.to_delete().len(),
            plan.conflicts().len()
        );

        let mut result = SyncResult {
            dry_run: options.dry_run,
            sources: pipeline
                .snapshots
                .iter()
                .map(|s| s.name().to_string())
                .collect(),
            profiles: pipeline
                .resolution
                .sequence
                .iter()
                .map(|p| format!("{}/{}", pipeline.snapshots[p.snapshot].name(), p))
                .collect(),
            overrides: pipeline
                .composition
                .tree
                .entries()
                .filter_map(|(path, entry)| {
                    entry.replaced.as_ref().map(|replaced| Override {
                        path: path.clone(),
                        winner: entry.origin.to_string(),
                        replaced: replaced.to_string(),
                    })
                })
                .collect(),
            filtered: pipeline.composition.filtered,
            warnings,
            ..Default::default()
        };

        if options.diff {
            result.diffs = collect_diffs(&deployer, &plan, &pipeline.output);
        }

        if options.dry_run {
            result.plan = plan;
            return Ok(result);
        }

        // Last point where stopping leaves the project untouched
        ctx.interrupt.check()?;

        let deployment = deployer.execute(&plan, &previous, now);
        self.lockfile_repo
            .save(&deployment.lockfile, &lock_path)
            .map_err(|e| RuleforgeError::LockWrite {
                path: lock_path.clone(),
                message: e.to_string(),
            })?;

        result.plan = plan;
        result.deployment = Some(deployment);
        Ok(result)
    }
}

/// The previous lock record, empty when there is none or it is unreadable
pub fn load_previous<LR: LockfileRepository>(
    repo: &LR,
    path: &Path,
    now: DateTime<Utc>,
    warnings: &mut Vec<Warning>,
) -> RuleforgeResult<Lockfile> {
    match repo.load(path) {
        Ok(Some(lockfile)) => Ok(lockfile),
        Ok(None) => Ok(Lockfile::new(now)),
        Err(e) if e.is_corrupt() => {
            log::warn!("{}; treating it as empty", e);
            warnings.push(Warning::new(
                WarningKind::LockCorrupt,
                path,
                format!("{}; previous state ignored, nothing will be deleted", e),
            ));
            Ok(Lockfile::new(now))
        }
        Err(e) => Err(RuleforgeError::Io(std::io::Error::other(e.to_string()))),
    }
}

fn collect_diffs<FS: FileSystem>(
    deployer: &Deployer<'_, FS>,
    plan: &DeploymentPlan,
    output: &OutputTree,
) -> Vec<FileDiff> {
    let text = |bytes: Vec<u8>| String::from_utf8(bytes).ok();

    plan.entries()
        .filter(|p| {
            matches!(
                p.action,
                PlanAction::Create | PlanAction::Update | PlanAction::Delete | PlanAction::Conflict(..)
            )
        })
        .map(|p| FileDiff {
            path: p.path.clone(),
            before: deployer.current_content(&p.path).and_then(text),
            after: output.get(&p.path).and_then(|b| text(b.to_vec())),
        })
        .collect()
}
