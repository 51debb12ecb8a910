//! Sync Options

/// Options for the sync use case
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Plan only; never touch the project
    pub dry_run: bool,
    /// Collect before/after content for every changed or conflicting path
    pub diff: bool,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }
}
