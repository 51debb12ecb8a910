//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod file_system;
pub mod generator;
pub mod lockfile_repository;
pub mod source_fetcher;

pub use file_system::{EntryKind, FileSystem, FsError, FsResult};
pub use generator::{GenerateError, GenerateRequest, Generator};
pub use lockfile_repository::{LockfileError, LockfileRepository};
pub use source_fetcher::{FetchError, SourceFetcher};
