//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod composer;
mod planner;
mod profile_resolver;

pub use composer::{compose, Composition, FilteredEntity, LoadedProfile, LoadedSource};
pub use planner::{
    ConflictOp, ConflictReason, DeploymentPlan, PlanAction, PlannedPath, Planner, TargetFileState,
};
pub use profile_resolver::{resolve_profiles, ProfileResolution, ResolvedProfile};
