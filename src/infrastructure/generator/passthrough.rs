//! Built-in generator used when no external command is configured.
//!
//! Every staged file lands at its staging path unchanged, bundles expanded
//! into their files. Targets, features and options are not consulted.

use crate::domain::entities::OutputTree;
use crate::domain::ports::generator::{GenerateError, GenerateRequest, Generator};

#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughGenerator;

impl Generator for PassthroughGenerator {
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<OutputTree, GenerateError> {
        Ok(request.staging.files().into_iter().collect())
    }
}
