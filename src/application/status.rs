//! Status Use Case
//!
//! Read-only summary of the lock record: what the tool owns in the project
//! and whether each owned file still holds what was last written.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::context::RunContext;
use crate::application::deployer::Deployer;
use crate::application::sync::load_previous;
use crate::domain::ports::{FileSystem, LockfileRepository};
use crate::domain::services::TargetFileState;
use crate::domain::value_objects::RelativePath;
use crate::error::{RuleforgeResult, Warning};

/// State of one tracked path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedState {
    /// Bytes match the last write
    Clean,
    /// Edited since the last write; a later removal will keep it
    Modified,
    /// Gone from disk
    Missing,
    /// Recorded without a hash, so ownership cannot be proven
    Unverified,
    /// Unreadable, or not a regular file
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedFile {
    pub path: RelativePath,
    pub state: TrackedState,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    pub has_lockfile: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub files: Vec<TrackedFile>,
    pub directories: Vec<RelativePath>,
    pub warnings: Vec<Warning>,
}

impl StatusReport {
    pub fn count(&self, state: TrackedState) -> usize {
        self.files.iter().filter(|f| f.state == state).count()
    }
}

pub struct StatusUseCase<LR, FS>
where
    LR: LockfileRepository,
    FS: FileSystem,
{
    lockfile_repo: LR,
    file_system: FS,
}

impl<LR, FS> StatusUseCase<LR, FS>
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

    pub fn execute(&self, ctx: &RunContext) -> RuleforgeResult<StatusReport> {
        let lock_path = ctx.lockfile_path();
        let mut report = StatusReport {
            has_lockfile: self.file_system.exists(&lock_path),
            ..Default::default()
        };
        if !report.has_lockfile {
            return Ok(report);
        }

        let now = Utc::now();
        let lockfile = load_previous(&self.lockfile_repo, &lock_path, now, &mut report.warnings)?;
        if report.warnings.is_empty() {
            report.created_at = Some(lockfile.created_at());
            report.last_synced_at = Some(lockfile.last_synced_at());
        }

        let deployer = Deployer::new(&self.file_system, ctx.project_root());
        report.files = lockfile
            .entries()
            .map(|(path, recorded)| {
                let state = match (deployer.inspect(path), recorded) {
                    (TargetFileState::Missing, _) => TrackedState::Missing,
                    (TargetFileState::File(_), None) => TrackedState::Unverified,
                    (TargetFileState::File(current), Some(recorded)) if &current == recorded => {
                        TrackedState::Clean
                    }
                    (TargetFileState::File(_), Some(_)) => TrackedState::Modified,
                    (TargetFileState::Unreadable | TargetFileState::NotAFile, _) => {
                        TrackedState::Blocked
                    }
                };
                TrackedFile {
                    path: path.clone(),
                    state,
                }
            })
            .collect();
        report.directories = lockfile.directories().cloned().collect();

        Ok(report)
    }
}
