//! Common test utilities for Ruleforge CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated workspace with local sources and a project
//! - Assertion macros: `assert_deployed!`, `assert_output_contains!`, etc.
//! - Fixtures: Reusable manifests and content

#![allow(dead_code)]

pub mod assertions;
pub mod env;
pub mod fixtures;

pub use assertions::*;
pub use env::*;
pub use fixtures::*;
