//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use crate::application::{DetachUseCase, Pipeline, StatusUseCase, SyncUseCase};
use crate::infrastructure::{GitFetcher, LocalFs, TomlLockfileRepository};

/// Type alias for the concrete SyncUseCase with all dependencies
pub type ConcreteSyncUseCase = SyncUseCase<GitFetcher, TomlLockfileRepository, LocalFs>;

/// Type alias for the concrete DetachUseCase with all dependencies
pub type ConcreteDetachUseCase = DetachUseCase<TomlLockfileRepository, LocalFs>;

/// Type alias for the concrete StatusUseCase with all dependencies
pub type ConcreteStatusUseCase = StatusUseCase<TomlLockfileRepository, LocalFs>;

/// Composition pipeline fetching remote sources with git
pub fn create_pipeline() -> Pipeline<GitFetcher> {
    Pipeline::new(GitFetcher::new())
}

/// Create a sync use case with all dependencies wired up
pub fn create_sync_use_case() -> ConcreteSyncUseCase {
    SyncUseCase::new(create_pipeline(), TomlLockfileRepository::new(), LocalFs::new())
}

pub fn create_detach_use_case() -> ConcreteDetachUseCase {
    DetachUseCase::new(TomlLockfileRepository::new(), LocalFs::new())
}

pub fn create_status_use_case() -> ConcreteStatusUseCase {
    StatusUseCase::new(TomlLockfileRepository::new(), LocalFs::new())
}
