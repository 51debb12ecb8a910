//! Git fetcher
//!
//! Shallow-clones remote sources with the system `git`, which brings along
//! whatever authentication the user configured (SSH agent, credential
//! helpers, tokens in `~/.gitconfig`).

use std::path::Path;
use std::process::Command;

use crate::domain::ports::source_fetcher::{FetchError, SourceFetcher};

#[derive(Debug, Clone, Default)]
pub struct GitFetcher;

impl GitFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl SourceFetcher for GitFetcher {
    fn fetch(&self, locator: &str, git_ref: Option<&str>, dest: &Path) -> Result<(), FetchError> {
        let mut cmd = Command::new("git");
        cmd.args(["clone", "--depth=1", "--quiet"]);
        if let Some(r) = git_ref {
            cmd.args(["--branch", r]);
        }
        cmd.arg(locator).arg(dest);
        // Never block on a credential prompt
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        log::debug!("running {:?}", cmd);
        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.contains("Authentication failed")
                || stderr.contains("Permission denied")
                || stderr.contains("could not read Username")
                || stderr.contains("Could not read from remote repository")
            {
                format!(
                    "authentication failed; check SSH keys or git credentials ({})",
                    stderr.trim()
                )
            } else {
                stderr.trim().to_string()
            };
            return Err(FetchError::Failed {
                locator: locator.to_string(),
                message,
            });
        }
        Ok(())
    }
}

/// Whether a bare source string looks like a remote locator
pub fn looks_remote(locator: &str) -> bool {
    locator.contains("://") || locator.starts_with("git@") || locator.ends_with(".git")
}
