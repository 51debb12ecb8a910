//! Source resolution and content loading

mod content;
mod git;
mod ignore_file;
mod resolver;

pub use content::{load_source, profile_dir, PROFILES_DIR, SHARED_DIR, SUBPROFILES_DIR};
pub use git::{looks_remote, GitFetcher};
pub use ignore_file::{IgnoreError, IgnorePatterns, IGNORE_FILE};
pub use resolver::{ResolvedSources, SourceResolver};
