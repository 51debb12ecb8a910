//! Ruleforge - layered composer and deployer for AI assistant configuration
//!
//! Ruleforge pulls configuration from several sources (local directories or
//! git repositories), overlays the profiles a project selects, hands the
//! composed tree to a generator, and deploys the result into the project.
//! A lock file records every file it owns so later runs can update or remove
//! them without touching anything a human wrote.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod parser;
pub mod presentation;

// Re-exports for convenience
pub use application::{SyncOptions, SyncResult, SyncUseCase};
pub use config::{EnvOverrides, ProjectConfig};
pub use error::{RuleforgeError, RuleforgeResult, Warning, WarningKind};
pub use parser::{extract_frontmatter, parse_tags};
