//! Reconciliation planning service
//!
//! Pure domain logic: compares the previous lockfile, the desired output tree
//! and the observed state of each target file, and decides per path what the
//! deployer may do. Nothing here touches the filesystem; the caller supplies
//! an `inspect` callback that reports the on-disk state of a path.
//!
//! The rule that drives every branch: a file is only overwritten or removed
//! when the tool provably owns its current bytes.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::entities::{Lockfile, OutputTree};
use crate::domain::value_objects::{ContentHash, RelativePath};

/// Observed state of a path in the target project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetFileState {
    Missing,
    File(ContentHash),
    /// Exists but could not be read
    Unreadable,
    /// Something other than a regular file (e.g. a directory) sits there
    NotAFile,
}

/// Why a path was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// A native file with different content occupies the path
    Untracked,
    /// A tracked file was edited since the last sync
    Modified,
    /// The file exists but cannot be read
    Unreadable,
    /// A directory or other non-file occupies the path
    NotAFile,
    /// The path holds the tool's own lock or config file
    Reserved,
}

/// Which operation a conflict suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictOp {
    Write,
    Delete,
}

/// The action to take for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// Write a file that does not exist yet
    Create,
    /// Overwrite a tracked file
    Update,
    /// Claim an untracked file whose bytes already match (no write)
    Adopt,
    /// Tracked and already up to date
    Unchanged,
    /// Remove a tracked file no longer produced
    Delete,
    /// Tracked file already gone; drop it from the lockfile
    Forget,
    Conflict(ConflictReason, ConflictOp),
}

impl PlanAction {
    pub fn is_write(self) -> bool {
        matches!(self, PlanAction::Create | PlanAction::Update | PlanAction::Adopt)
    }

    pub fn is_conflict(self) -> bool {
        matches!(self, PlanAction::Conflict(..))
    }
}

/// A planned action for a single path
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPath {
    pub path: RelativePath,
    pub action: PlanAction,
    /// Bytes to write (for paths present in the output tree)
    pub content: Option<Vec<u8>>,
}

/// Result of reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentPlan {
    entries: BTreeMap<RelativePath, PlannedPath>,
}

impl DeploymentPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, planned: PlannedPath) {
        self.entries.insert(planned.path.clone(), planned);
    }

    pub fn get(&self, path: &RelativePath) -> Option<&PlannedPath> {
        self.entries.get(path)
    }

    pub fn action(&self, path: &RelativePath) -> Option<PlanAction> {
        self.entries.get(path).map(|p| p.action)
    }

    pub fn entries(&self) -> impl Iterator<Item = &PlannedPath> {
        self.entries.values()
    }

    fn paths_where(&self, pred: impl Fn(PlanAction) -> bool) -> BTreeSet<RelativePath> {
        self.entries
            .values()
            .filter(|p| pred(p.action))
            .map(|p| p.path.clone())
            .collect()
    }

    /// Paths the tool will own with the desired content after deployment
    pub fn to_write(&self) -> BTreeSet<RelativePath> {
        self.paths_where(PlanAction::is_write)
    }

    pub fn to_delete(&self) -> BTreeSet<RelativePath> {
        self.paths_where(|a| a == PlanAction::Delete)
    }

    pub fn conflicts(&self) -> BTreeSet<RelativePath> {
        self.paths_where(PlanAction::is_conflict)
    }

    pub fn has_conflicts(&self) -> bool {
        self.entries.values().any(|p| p.action.is_conflict())
    }

    /// Nothing to write, delete or forget
    pub fn is_noop(&self) -> bool {
        self.entries.values().all(|p| {
            matches!(p.action, PlanAction::Unchanged | PlanAction::Conflict(..))
        })
    }
}

/// Pure planning service
pub struct Planner;

impl Planner {
    /// Decide the action for one path.
    ///
    /// * `desired` - hash of the output bytes, `None` when the output tree
    ///   no longer contains the path
    /// * `tracked` - `None` when the lockfile does not list the path;
    ///   `Some(None)` for a tracked entry with no recorded hash
    pub fn plan_path(
        desired: Option<&ContentHash>,
        tracked: Option<Option<&ContentHash>>,
        state: &TargetFileState,
    ) -> PlanAction {
        match (desired, tracked) {
            (Some(desired), Some(_)) => match state {
                TargetFileState::Missing => PlanAction::Update,
                TargetFileState::File(current) if current == desired => PlanAction::Unchanged,
                TargetFileState::File(_) => PlanAction::Update,
                TargetFileState::Unreadable => {
                    PlanAction::Conflict(ConflictReason::Unreadable, ConflictOp::Write)
                }
                TargetFileState::NotAFile => {
                    PlanAction::Conflict(ConflictReason::NotAFile, ConflictOp::Write)
                }
            },
            (Some(desired), None) => match state {
                TargetFileState::Missing => PlanAction::Create,
                TargetFileState::File(current) if current == desired => PlanAction::Adopt,
                TargetFileState::File(_) => {
                    PlanAction::Conflict(ConflictReason::Untracked, ConflictOp::Write)
                }
                TargetFileState::Unreadable => {
                    PlanAction::Conflict(ConflictReason::Unreadable, ConflictOp::Write)
                }
                TargetFileState::NotAFile => {
                    PlanAction::Conflict(ConflictReason::NotAFile, ConflictOp::Write)
                }
            },
            (None, Some(recorded)) => match state {
                TargetFileState::Missing | TargetFileState::NotAFile => PlanAction::Forget,
                TargetFileState::File(current) if recorded == Some(current) => PlanAction::Delete,
                TargetFileState::File(_) => {
                    PlanAction::Conflict(ConflictReason::Modified, ConflictOp::Delete)
                }
                TargetFileState::Unreadable => {
                    PlanAction::Conflict(ConflictReason::Unreadable, ConflictOp::Delete)
                }
            },
            (None, None) => PlanAction::Unchanged,
        }
    }

    /// Plan every path in `lockfile ∪ output`.
    ///
    /// `reserved` paths are never written, deleted or tracked: output for
    /// them is a conflict and a lock entry for them is forgotten.
    pub fn plan<F>(
        lockfile: &Lockfile,
        output: &OutputTree,
        reserved: &[RelativePath],
        mut inspect: F,
    ) -> DeploymentPlan
    where
        F: FnMut(&RelativePath) -> TargetFileState,
    {
        let mut plan = DeploymentPlan::new();

        let paths: BTreeSet<&RelativePath> = lockfile.paths().chain(output.paths()).collect();

        for path in paths {
            let desired = output.hash(path);

            let action = if reserved.contains(path) {
                match desired {
                    Some(_) => PlanAction::Conflict(ConflictReason::Reserved, ConflictOp::Write),
                    None => PlanAction::Forget,
                }
            } else {
                let tracked = lockfile.contains(path).then(|| lockfile.hash(path));
                Self::plan_path(desired.as_ref(), tracked, &inspect(path))
            };
            plan.add(PlannedPath {
                path: path.clone(),
                action,
                content: output.get(path).map(|c| c.to_vec()),
            });
        }

        plan
    }
}
