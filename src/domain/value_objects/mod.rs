//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod hash;
mod malformed_policy;
mod path;
mod profile_selector;
mod refresh_policy;

pub use hash::ContentHash;
pub use malformed_policy::MalformedPolicy;
pub use path::{PathError, RelativePath};
pub use profile_selector::{is_valid_identifier, ProfileSelector, SelectorError, SubSelector};
pub use refresh_policy::RefreshPolicy;
