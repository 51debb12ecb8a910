//! Generator implementations

mod passthrough;
mod subprocess;

pub use passthrough::PassthroughGenerator;
pub use subprocess::{materialize, SubprocessGenerator};

use crate::domain::ports::generator::Generator;

/// The configured external command, or the built-in passthrough
pub fn generator_for(command: Option<&[String]>) -> Box<dyn Generator> {
    match command {
        Some(cmd) if !cmd.is_empty() => Box::new(SubprocessGenerator::new(cmd.to_vec())),
        _ => Box::new(PassthroughGenerator),
    }
}
