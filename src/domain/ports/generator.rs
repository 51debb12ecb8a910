//! Generator port - the external generation engine
//!
//! Turns a staging tree plus a target/feature selection into the files that
//! land in the project. Implementations must be pure functions of their
//! inputs and must fail as a whole rather than return a partial tree.

use crate::domain::entities::{OutputTree, StagingTree};

/// Inputs handed to a generator
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub staging: &'a StagingTree,
    pub targets: &'a [String],
    pub features: &'a [String],
    /// Opaque options from the project config
    pub options: &'a serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generator could not be started: {0}")]
    Spawn(String),

    #[error("generator exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("generator produced an invalid output path '{path}'")]
    InvalidOutput { path: String },

    #[error("generator I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Generator {
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<OutputTree, GenerateError>;
}
