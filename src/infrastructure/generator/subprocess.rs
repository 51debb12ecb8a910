//! External generation engine run as a subprocess
//!
//! The staging tree is materialized into a scratch directory together with
//! a `request.json`:
//!
//! ```json
//! {
//!   "staging_dir": "/tmp/.../staging",
//!   "output_dir": "/tmp/.../output",
//!   "targets": ["claude"],
//!   "features": ["rules"],
//!   "options": {}
//! }
//! ```
//!
//! The command is invoked as `<command...> --request <path>` and must leave
//! its files under `output_dir`. The scratch directory is a `TempDir`, so it
//! is removed however this function returns.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::domain::entities::{OutputTree, StagingTree};
use crate::domain::ports::generator::{GenerateError, GenerateRequest, Generator};
use crate::domain::value_objects::RelativePath;

/// Lines of stderr kept in a failure message
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Serialize)]
struct RequestFile<'a> {
    staging_dir: &'a Path,
    output_dir: &'a Path,
    targets: &'a [String],
    features: &'a [String],
    options: &'a serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct SubprocessGenerator {
    command: Vec<String>,
}

impl SubprocessGenerator {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl Generator for SubprocessGenerator {
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<OutputTree, GenerateError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(GenerateError::Spawn("empty generator command".to_string()));
        };

        let scratch = tempfile::Builder::new().prefix("ruleforge-gen-").tempdir()?;
        let staging_dir = scratch.path().join("staging");
        let output_dir = scratch.path().join("output");
        fs::create_dir_all(&output_dir)?;
        materialize(request.staging, &staging_dir)?;

        let request_path = scratch.path().join("request.json");
        let body = serde_json::to_vec_pretty(&RequestFile {
            staging_dir: &staging_dir,
            output_dir: &output_dir,
            targets: request.targets,
            features: request.features,
            options: request.options,
        })
        .map_err(|e| GenerateError::Io(e.into()))?;
        fs::write(&request_path, body)?;

        log::info!("running generator {}", self.command.join(" "));
        let output = Command::new(program)
            .args(args)
            .arg("--request")
            .arg(&request_path)
            .output()
            .map_err(|e| GenerateError::Spawn(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            return Err(GenerateError::Exit {
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        read_output(&output_dir)
    }
}

/// Write every staged file below `dir`
pub fn materialize(staging: &StagingTree, dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    for (rel, bytes) in staging.files() {
        let path = rel.to_path(dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
    }
    Ok(())
}

fn read_output(output_dir: &Path) -> Result<OutputTree, GenerateError> {
    let mut tree = OutputTree::new();
    let mut pending: Vec<PathBuf> = vec![output_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let shown = path.strip_prefix(output_dir).unwrap_or(&path).display().to_string();
            let file_type = fs::symlink_metadata(&path)?.file_type();

            if file_type.is_symlink() {
                return Err(GenerateError::InvalidOutput { path: shown });
            } else if file_type.is_dir() {
                pending.push(path);
            } else {
                let rel = path
                    .strip_prefix(output_dir)
                    .ok()
                    .and_then(|p| RelativePath::from_path(p).ok())
                    .ok_or(GenerateError::InvalidOutput { path: shown })?;
                tree.insert(rel, fs::read(&path)?);
            }
        }
    }

    Ok(tree)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
