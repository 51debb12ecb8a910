//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file system
//! - `repositories/` - Lockfile, repo manifest and snapshot cache persistence
//! - `sources/` - Source resolution (git fetch, local paths) and content loading
//! - `generator/` - Subprocess and built-in passthrough generators

pub mod fs;
pub mod generator;
pub mod repositories;
pub mod sources;

pub use fs::LocalFs;
pub use generator::{generator_for, PassthroughGenerator, SubprocessGenerator};
pub use repositories::{SnapshotCache, TomlLockfileRepository};
pub use sources::{GitFetcher, SourceResolver};
