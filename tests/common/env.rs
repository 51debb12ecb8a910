//! Test environment builder for isolated Ruleforge testing.
//!
//! Provides `TestEnv` - a temp workspace holding any number of local sources
//! next to a project directory, plus helpers to run the CLI against it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::fixtures::DEFAULT_PROJECT_CONFIG;

/// Variables a developer shell may carry that would leak into the run
const RULEFORGE_VARS: &[&str] = &[
    "RULEFORGE_PROFILES",
    "RULEFORGE_TARGETS",
    "RULEFORGE_FEATURES",
    "RULEFORGE_REFRESH",
    "RULEFORGE_CACHE_DIR",
    "RUST_LOG",
];

/// Result of running a Ruleforge CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Check if command succeeded
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as a single JSON document
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({}):\n{}", e, self.stdout))
    }
}

/// Isolated workspace: `<tmp>/app` is the project, sources sit beside it
pub struct TestEnv {
    pub workspace: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// Create a new TestEnvBuilder
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    pub fn project_root(&self) -> PathBuf {
        self.workspace.path().join("app")
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root().join(relative)
    }

    /// Get path relative to the workspace (where sources live)
    pub fn workspace_path(&self, relative: &str) -> PathBuf {
        self.workspace.path().join(relative)
    }

    /// Run the CLI from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run the CLI from the project root with extra env vars
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        self.run_from_with_env(&self.project_root(), args, env_vars)
    }

    /// Run the CLI from a specific directory with extra env vars
    pub fn run_from_with_env(
        &self,
        cwd: &Path,
        args: &[&str],
        env_vars: &[(&str, &str)],
    ) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        for var in RULEFORGE_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(cwd)
            .args(args)
            .env("HOME", self.workspace_path("home"))
            .env("RULEFORGE_CACHE_DIR", self.workspace_path("cache"))
            .env("NO_COLOR", "1");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute ruleforge");
        output_to_result(output)
    }

    /// Read the lock file content from the project
    pub fn read_lockfile(&self) -> String {
        std::fs::read_to_string(self.project_path("ruleforge.lock")).unwrap_or_default()
    }

    /// Read a deployed file's content
    pub fn read_deployed_file(&self, relative_path: &str) -> String {
        std::fs::read_to_string(self.project_path(relative_path))
            .unwrap_or_else(|e| panic!("Failed to read deployed file {}: {}", relative_path, e))
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        write_file(&self.project_path(relative_path), content);
    }

    /// Write a file into the workspace (usually a source)
    pub fn write_workspace_file(&self, relative_path: &str, content: &str) {
        write_file(&self.workspace_path(relative_path), content);
    }

    /// Remove a file from the workspace (usually from a source)
    pub fn remove_workspace_file(&self, relative_path: &str) {
        let path = self.workspace_path(relative_path);
        if path.exists() {
            std::fs::remove_file(&path).expect("Failed to remove file");
        }
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// One local source: its manifest plus files relative to its root
struct SourceSpec {
    dir: String,
    manifest: String,
    files: Vec<(String, String)>,
}

/// Builder for TestEnv with fluent API
pub struct TestEnvBuilder {
    sources: Vec<SourceSpec>,
    project_config: Option<String>,
    write_project_config: bool,
    project_files: Vec<(String, String)>,
}

impl TestEnvBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            project_config: None,
            write_project_config: true,
            project_files: Vec::new(),
        }
    }

    /// Add a local source directory `<dir>` with the given manifest
    pub fn with_source(mut self, dir: &str, manifest: &str) -> Self {
        self.sources.push(SourceSpec {
            dir: dir.to_string(),
            manifest: manifest.to_string(),
            files: Vec::new(),
        });
        self
    }

    /// Add a file to the most recently added source
    pub fn with_source_file(mut self, path: &str, content: &str) -> Self {
        let source = self
            .sources
            .last_mut()
            .expect("with_source_file needs a source added first");
        source.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Set `ruleforge.toml` content
    pub fn with_project_config(mut self, toml: &str) -> Self {
        self.project_config = Some(toml.to_string());
        self
    }

    /// Do not write `ruleforge.toml` for this project
    pub fn without_project_config_file(mut self) -> Self {
        self.write_project_config = false;
        self
    }

    /// Pre-existing file in the project (a native file)
    pub fn with_project_file(mut self, path: &str, content: &str) -> Self {
        self.project_files
            .push((path.to_string(), content.to_string()));
        self
    }

    /// Build the TestEnv
    pub fn build(self) -> TestEnv {
        let workspace = TempDir::new().expect("Failed to create workspace temp dir");
        let root = workspace.path();
        std::fs::create_dir_all(root.join("app")).expect("Failed to create project dir");
        std::fs::create_dir_all(root.join("home")).expect("Failed to create home dir");

        for source in &self.sources {
            let dir = root.join(&source.dir);
            write_file(&dir.join("ruleforge.repo.toml"), &source.manifest);
            for (path, content) in &source.files {
                write_file(&dir.join(path), content);
            }
        }

        if self.write_project_config {
            let config = self
                .project_config
                .as_deref()
                .unwrap_or(DEFAULT_PROJECT_CONFIG);
            write_file(&root.join("app/ruleforge.toml"), config);
        }

        for (path, content) in &self.project_files {
            write_file(&root.join("app").join(path), content);
        }

        TestEnv {
            workspace,
            bin: PathBuf::from(env!("CARGO_BIN_EXE_ruleforge")),
        }
    }
}

impl Default for TestEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
