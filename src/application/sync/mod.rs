//! Sync Module
//!
//! Runs the composition pipeline and reconciles the project against it.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`SyncOptions`)
//! - `result` - Result types (`SyncResult`, `FileDiff`, `Override`)
//! - `use_case` - Core use case logic (`SyncUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use ruleforge::application::sync::{SyncOptions, SyncUseCase};
//!
//! let use_case = SyncUseCase::new(Pipeline::new(GitFetcher::new()), lockfile_repo, fs);
//! let result = use_case.execute(&ctx, &SyncOptions::new().with_dry_run(true), Utc::now())?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::SyncOptions;
pub use result::{FileDiff, Override, SyncResult};
pub use use_case::{load_previous, SyncUseCase};
