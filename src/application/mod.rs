//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `SyncUseCase` - compose, plan, deploy, write the lock back
//! - `DetachUseCase` - remove everything the tool owns, then the lock
//! - `StatusUseCase` - lock summary with per-file state
//! - `list_profiles` - profiles the configured sources declare
//!
//! ## Services
//!
//! - `Pipeline` - config, sources, profiles, composition, generation
//! - `Deployer` - inspect the project and execute a plan

pub mod context;
pub mod deployer;
pub mod detach;
pub mod pipeline;
pub mod profiles;
pub mod status;
pub mod sync;

pub use context::{Interrupt, RunContext};
pub use deployer::{Deployer, Deployment};
pub use detach::{DetachOptions, DetachResult, DetachUseCase};
pub use pipeline::{Pipeline, PipelineOutput, ResolvedProject};
pub use profiles::{list_profiles, ListedProfile, ProfileListing, SourceProfiles};
pub use status::{StatusReport, StatusUseCase, TrackedFile, TrackedState};
pub use sync::{FileDiff, Override, SyncOptions, SyncResult, SyncUseCase};
