//! TOML Repo Manifest Loader
//!
//! Reads `ruleforge.repo.toml` from a source root. Table order is kept
//! (`toml` is built with `preserve_order`), so profiles and sub-profiles
//! come out in declaration order.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::entities::{ProfileDecl, RepoManifest};
use crate::domain::value_objects::is_valid_identifier;
use crate::error::{Warning, WarningKind};

/// Manifest file name at a source root
pub const MANIFEST_NAME: &str = "ruleforge.repo.toml";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("no ruleforge.repo.toml at {}", .0.display())]
    Missing(PathBuf),

    #[error("cannot read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("invalid manifest {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid identifier '{id}' in {}", .path.display())]
    InvalidIdentifier { path: PathBuf, id: String },
}

#[derive(Debug, Deserialize)]
struct TomlManifest {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    author: Option<String>,
    /// `use-cases` is the legacy spelling
    #[serde(default, alias = "use-cases", alias = "use_cases")]
    profiles: toml::Table,
}

#[derive(Debug, Deserialize)]
struct TomlProfile {
    #[serde(default)]
    description: String,
    #[serde(default, rename = "sub-profiles", alias = "sub_profiles", alias = "subprofiles")]
    sub_profiles: toml::Table,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TomlSubProfile {
    Description(String),
    Table {
        #[serde(default)]
        description: String,
    },
}

impl TomlSubProfile {
    fn into_description(self) -> String {
        match self {
            TomlSubProfile::Description(d) | TomlSubProfile::Table { description: d } => d,
        }
    }
}

/// Load the manifest of the source rooted at `root`, with unknown-key warnings
pub fn load_manifest(root: &Path) -> Result<(RepoManifest, Vec<Warning>), ManifestError> {
    let path = root.join(MANIFEST_NAME);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::Missing(root.to_path_buf()))
        }
        Err(e) => {
            return Err(ManifestError::Io {
                path,
                message: e.to_string(),
            })
        }
    };
    parse_manifest(&content, &path)
}

/// Parse manifest text; `path` is only used in messages
pub fn parse_manifest(
    content: &str,
    path: &Path,
) -> Result<(RepoManifest, Vec<Warning>), ManifestError> {
    let parse_err = |message: String| ManifestError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut unknown: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);
    let raw: TomlManifest = serde_ignored::deserialize(deserializer, |p| {
        unknown.push(p.to_string());
    })
    .map_err(|e| parse_err(e.message().to_string()))?;

    let mut manifest = RepoManifest::new(raw.name);
    manifest.description = raw.description;
    manifest.version = raw.version;
    manifest.author = raw.author;

    for (id, value) in raw.profiles {
        check_identifier(&id, path)?;
        let profile: TomlProfile = value
            .try_into()
            .map_err(|e: toml::de::Error| parse_err(format!("profile '{}': {}", id, e.message())))?;

        let mut decl = ProfileDecl::new(&id, profile.description);
        for (sub_id, sub_value) in profile.sub_profiles {
            check_identifier(&sub_id, path)?;
            let sub: TomlSubProfile = sub_value.try_into().map_err(|e: toml::de::Error| {
                parse_err(format!("sub-profile '{}:{}': {}", id, sub_id, e.message()))
            })?;
            decl = decl.with_sub_profile(sub_id, sub.into_description());
        }
        manifest = manifest.with_profile(decl);
    }

    let warnings = unknown
        .into_iter()
        .map(|key| {
            Warning::new(
                WarningKind::UnknownKey,
                path,
                format!("unknown key '{}' ignored", key),
            )
        })
        .collect();

    Ok((manifest, warnings))
}

fn check_identifier(id: &str, path: &Path) -> Result<(), ManifestError> {
    if is_valid_identifier(id) {
        Ok(())
    } else {
        Err(ManifestError::InvalidIdentifier {
            path: path.to_path_buf(),
            id: id.to_string(),
        })
    }
}
