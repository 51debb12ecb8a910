//! Profile selector value object
//!
//! `development`, `development:frontend` or `development:*`.

use std::fmt;
use std::str::FromStr;

/// Which sub-profiles of a profile a selector refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubSelector {
    /// Only the top-level profile
    None,
    /// A single named sub-profile
    Named(String),
    /// Every declared sub-profile (`:*`)
    All,
}

/// A parsed profile selector from the project config
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileSelector {
    profile: String,
    sub: SubSelector,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid profile selector '{selector}': {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: &'static str,
}

impl ProfileSelector {
    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn sub(&self) -> &SubSelector {
        &self.sub
    }
}

/// Characters that can never appear in a profile or sub-profile identifier
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty() && !id.contains([':', '/', '\\', '*']) && id.trim() == id
}

impl FromStr for ProfileSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| SelectorError {
            selector: s.to_string(),
            reason,
        };

        let (profile, sub) = match s.split_once(':') {
            None => (s, SubSelector::None),
            Some((_, rest)) if rest.contains(':') => {
                return Err(err("at most one ':' is allowed"))
            }
            Some((profile, "*")) => (profile, SubSelector::All),
            Some((profile, sub)) => {
                if !is_valid_identifier(sub) {
                    return Err(err("sub-profile name is empty or contains reserved characters"));
                }
                (profile, SubSelector::Named(sub.to_string()))
            }
        };

        if !is_valid_identifier(profile) {
            return Err(err("profile name is empty or contains reserved characters"));
        }

        Ok(Self {
            profile: profile.to_string(),
            sub,
        })
    }
}

impl fmt::Display for ProfileSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            SubSelector::None => write!(f, "{}", self.profile),
            SubSelector::Named(sub) => write!(f, "{}:{}", self.profile, sub),
            SubSelector::All => write!(f, "{}:*", self.profile),
        }
    }
}
