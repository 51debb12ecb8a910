//! Run context
//!
//! Everything a run needs from its surroundings, passed explicitly instead
//! of read from process-wide state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::EnvOverrides;
use crate::domain::value_objects::RefreshPolicy;
use crate::error::{RuleforgeError, RuleforgeResult};
use crate::infrastructure::repositories::{default_cache_dir, LOCKFILE_NAME};

/// Cancellation flag shared with the signal handler
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Abort between phases once the user asked to stop
    pub fn check(&self) -> RuleforgeResult<()> {
        if self.is_raised() {
            Err(RuleforgeError::Interrupted)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub project_root: PathBuf,
    pub verbosity: u8,
    pub interrupt: Interrupt,
    pub cache_dir: PathBuf,
    /// `--refresh` forces a re-fetch; otherwise env and config decide
    pub refresh: Option<RefreshPolicy>,
    pub overrides: EnvOverrides,
}

impl RunContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            verbosity: 0,
            interrupt: Interrupt::new(),
            cache_dir: default_cache_dir(None),
            refresh: None,
            overrides: EnvOverrides::default(),
        }
    }

    /// Apply environment overrides; `RULEFORGE_CACHE_DIR` relocates the cache
    pub fn with_overrides(mut self, overrides: EnvOverrides) -> Self {
        self.cache_dir = default_cache_dir(overrides.cache_dir.as_deref());
        self.overrides = overrides;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.project_root.join(LOCKFILE_NAME)
    }
}
