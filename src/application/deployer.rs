//! Deployer
//!
//! Inspects the target project for the planner, then executes a plan:
//! writes first, deletes second, pruning of emptied tool-created directories
//! last. A failure on one path is reported and leaves that path's lock state
//! as it was; the rest of the plan still runs.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::CONFIG_FILE;
use crate::domain::entities::{Lockfile, OutputTree};
use crate::domain::ports::{EntryKind, FileSystem};
use crate::domain::services::{
    ConflictReason, DeploymentPlan, PlanAction, Planner, TargetFileState,
};
use crate::domain::value_objects::{ContentHash, RelativePath};
use crate::error::{Warning, WarningKind};
use crate::infrastructure::repositories::LOCKFILE_NAME;

/// Project paths holding the tool's own state; output never lands there
pub fn reserved_paths() -> Vec<RelativePath> {
    [LOCKFILE_NAME, CONFIG_FILE]
        .iter()
        .filter_map(|name| RelativePath::new(name).ok())
        .collect()
}

/// What execution did, plus the lock record to persist
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub written: Vec<RelativePath>,
    pub adopted: Vec<RelativePath>,
    pub deleted: Vec<RelativePath>,
    pub forgotten: Vec<RelativePath>,
    pub pruned: Vec<RelativePath>,
    pub warnings: Vec<Warning>,
    pub lockfile: Lockfile,
}

impl Deployment {
    fn start(previous: &Lockfile, now: DateTime<Utc>) -> Self {
        let mut lockfile = previous.clone();
        lockfile.touch(now);
        Self {
            written: Vec::new(),
            adopted: Vec::new(),
            deleted: Vec::new(),
            forgotten: Vec::new(),
            pruned: Vec::new(),
            warnings: Vec::new(),
            lockfile,
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.written.is_empty() || !self.deleted.is_empty() || !self.pruned.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub struct Deployer<'a, FS: FileSystem> {
    fs: &'a FS,
    root: &'a Path,
    reserved: Vec<RelativePath>,
}

impl<'a, FS: FileSystem> Deployer<'a, FS> {
    pub fn new(fs: &'a FS, root: &'a Path) -> Self {
        Self {
            fs,
            root,
            reserved: reserved_paths(),
        }
    }

    /// Observed state of one project path
    pub fn inspect(&self, path: &RelativePath) -> TargetFileState {
        let abs = path.to_path(self.root);
        match self.fs.entry_kind(&abs) {
            None => TargetFileState::Missing,
            Some(EntryKind::File) => match self.fs.hash(&abs) {
                Ok(hash) => TargetFileState::File(hash),
                Err(e) => {
                    log::debug!("cannot read {}: {}", abs.display(), e);
                    TargetFileState::Unreadable
                }
            },
            Some(EntryKind::Directory) | Some(EntryKind::Other) => TargetFileState::NotAFile,
        }
    }

    pub fn plan(&self, previous: &Lockfile, output: &OutputTree) -> DeploymentPlan {
        Planner::plan(previous, output, &self.reserved, |path| self.inspect(path))
    }

    /// Current bytes of a project path, for diffs
    pub fn current_content(&self, path: &RelativePath) -> Option<Vec<u8>> {
        self.fs.read(&path.to_path(self.root)).ok()
    }

    pub fn execute(
        &self,
        plan: &DeploymentPlan,
        previous: &Lockfile,
        now: DateTime<Utc>,
    ) -> Deployment {
        let mut deployment = Deployment::start(previous, now);

        for planned in plan.entries() {
            match planned.action {
                PlanAction::Create | PlanAction::Update => {
                    let Some(content) = planned.content.as_deref() else {
                        continue;
                    };
                    self.write(&planned.path, content, &mut deployment);
                }
                PlanAction::Adopt | PlanAction::Unchanged => {
                    if let Some(content) = planned.content.as_deref() {
                        deployment
                            .lockfile
                            .track(planned.path.clone(), ContentHash::from_bytes(content));
                    }
                    if planned.action == PlanAction::Adopt {
                        deployment.adopted.push(planned.path.clone());
                    }
                }
                _ => {}
            }
        }

        for planned in plan.entries() {
            match planned.action {
                PlanAction::Delete => self.delete(&planned.path, &mut deployment),
                PlanAction::Forget => {
                    deployment.lockfile.untrack(&planned.path);
                    deployment.forgotten.push(planned.path.clone());
                }
                PlanAction::Conflict(ConflictReason::Reserved, _) => {
                    if deployment.lockfile.untrack(&planned.path) {
                        deployment.forgotten.push(planned.path.clone());
                    }
                }
                _ => {}
            }
        }

        self.prune(&mut deployment);
        deployment
    }

    fn write(&self, path: &RelativePath, content: &[u8], deployment: &mut Deployment) {
        let abs = path.to_path(self.root);

        if let Err(message) = self.ensure_parents(path, deployment) {
            deployment
                .warnings
                .push(Warning::new(WarningKind::Deployment, abs, message));
            return;
        }

        match self.fs.write(&abs, content) {
            Ok(()) => {
                log::debug!("wrote {}", path);
                deployment
                    .lockfile
                    .track(path.clone(), ContentHash::from_bytes(content));
                deployment.written.push(path.clone());
            }
            Err(e) => {
                deployment.warnings.push(Warning::new(
                    WarningKind::Deployment,
                    abs,
                    format!("write failed: {}", e),
                ));
            }
        }
    }

    /// Create missing ancestors one level at a time, recording each as owned
    fn ensure_parents(&self, path: &RelativePath, deployment: &mut Deployment) -> Result<(), String> {
        for dir in path.ancestors().into_iter().rev() {
            let abs = dir.to_path(self.root);
            match self.fs.entry_kind(&abs) {
                Some(EntryKind::Directory) => {}
                Some(_) => return Err(format!("{} is not a directory", dir)),
                None => {
                    self.fs
                        .create_dir(&abs)
                        .map_err(|e| format!("cannot create {}: {}", dir, e))?;
                    deployment.lockfile.record_directory(dir);
                }
            }
        }
        Ok(())
    }

    fn delete(&self, path: &RelativePath, deployment: &mut Deployment) {
        let abs = path.to_path(self.root);
        match self.fs.remove_file(&abs) {
            Ok(()) => {
                log::debug!("deleted {}", path);
                deployment.lockfile.untrack(path);
                deployment.deleted.push(path.clone());
            }
            Err(e) => deployment.warnings.push(Warning::new(
                WarningKind::Deployment,
                abs,
                format!("delete failed: {}", e),
            )),
        }
    }

    /// Remove owned directories that are now empty, deepest first
    fn prune(&self, deployment: &mut Deployment) {
        let mut owned: Vec<RelativePath> = deployment.lockfile.directories().cloned().collect();
        owned.sort_by_key(|dir| std::cmp::Reverse(dir.as_str().matches('/').count()));

        for dir in owned {
            let abs = dir.to_path(self.root);
            match self.fs.entry_kind(&abs) {
                None => deployment.lockfile.forget_directory(&dir),
                Some(EntryKind::Directory) if self.fs.is_empty_dir(&abs) => {
                    match self.fs.remove_empty_dir(&abs) {
                        Ok(()) => {
                            deployment.lockfile.forget_directory(&dir);
                            deployment.pruned.push(dir);
                        }
                        Err(e) => log::warn!("cannot remove {}: {}", abs.display(), e),
                    }
                }
                _ => {}
            }
        }
    }
}
