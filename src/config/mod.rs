//! Configuration module
//!
//! Precedence, highest first:
//! 1. CLI flags (`--refresh`)
//! 2. Environment variables (`RULEFORGE_*`)
//! 3. Project config (`ruleforge.toml`)
//! 4. Built-in defaults

mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use loader::{
    load_project, load_with_warnings, parse_with_warnings, validate, with_env_overrides,
    EnvOverrides, ValidatedConfig,
};
pub use types::{
    ComposeConfig, FetchConfig, GeneratorConfig, ProjectConfig, SourceConfig, SourceKindConfig,
    CONFIG_FILE,
};
