//! When a remote source is fetched again instead of served from the cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// Fetch on every run
    Always,
    /// Fetch when the pinned snapshot is older than the configured age
    #[default]
    Stale,
    /// Only use pinned snapshots; a missing one is an error
    Never,
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(RefreshPolicy::Always),
            "stale" => Ok(RefreshPolicy::Stale),
            "never" => Ok(RefreshPolicy::Never),
            other => Err(format!(
                "unknown refresh policy '{}' (expected always, stale or never)",
                other
            )),
        }
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefreshPolicy::Always => "always",
            RefreshPolicy::Stale => "stale",
            RefreshPolicy::Never => "never",
        };
        f.write_str(s)
    }
}
