//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--project, --json, --color, --verbose, --refresh) are inherited by all subcommands
//! - `plan` is `sync --dry-run` under a name that reads better in CI scripts

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// Ruleforge - layered AI assistant configuration, composed and deployed
#[derive(Parser, Debug)]
#[command(name = "ruleforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project root (where ruleforge.toml and ruleforge.lock live)
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Re-fetch remote sources even when the cached copy is fresh
    #[arg(long, global = true)]
    pub refresh: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose sources and deploy the result into the project
    Sync {
        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,

        /// Show a unified diff for every changed or conflicting file
        #[arg(long)]
        diff: bool,

        /// Exit with status 2 when any path is in conflict
        #[arg(long)]
        fail_on_conflict: bool,
    },

    /// Show what sync would do without touching the project
    Plan {
        /// Show a unified diff for every changed or conflicting file
        #[arg(long)]
        diff: bool,
    },

    /// Remove every file ruleforge owns, then the lock file
    Detach {
        /// Dry run - show what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// List the profiles the configured sources declare
    Profiles,

    /// Summarize the lock file and the state of tracked files
    Status,
}
