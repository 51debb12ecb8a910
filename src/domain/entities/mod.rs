//! Domain Entities
//!
//! - `Source` / `SourceSnapshot` - declared and resolved content origins
//! - `RepoManifest` - profiles a source declares
//! - `ContentEntity` - a file or bundle of composable content
//! - `StagingTree` - composition result
//! - `OutputTree` - generated files keyed by project path
//! - `Lockfile` - paths the tool owns in a project

mod content;
mod lockfile;
mod manifest;
mod output;
mod source;
mod staging;

pub use content::{ContentEntity, EntityBody, EntityKind, EntityTags, FrontMatter, BUNDLE_MARKER};
pub use lockfile::{Lockfile, LOCKFILE_FORMAT_VERSION};
pub use manifest::{ProfileDecl, RepoManifest, SubProfileDecl};
pub use output::OutputTree;
pub use source::{Source, SourceKind, SourceSnapshot};
pub use staging::{Origin, StagedEntry, StagingTree};
