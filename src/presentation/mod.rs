//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Command line definition
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//! - `output` - Human and JSON renderers
//! - `diff` - Unified diffs for `--diff`
//! - `terminal` - Color detection

pub mod cli;
pub mod diff;
pub mod factory;
pub mod output;
pub mod terminal;

pub use cli::{Cli, ColorWhen, Commands};
pub use factory::{create_detach_use_case, create_pipeline, create_status_use_case, create_sync_use_case};
pub use output::{OutputFormat, TextRenderer};
