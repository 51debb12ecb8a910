//! What composition does with a shared entity whose front-matter is broken.

use serde::{Deserialize, Serialize};

/// Policy for entities with unparsable front-matter
///
/// - `Include`: stage the entity unconditionally and warn (default)
/// - `Skip`: leave the entity out and warn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Default: a broken header never silently drops content, at the cost
    /// of ignoring its tags; `on_malformed = "skip"` trades the other way
    #[default]
    Include,
    Skip,
}
