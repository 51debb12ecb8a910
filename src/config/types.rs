//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Source, SourceKind};
use crate::domain::value_objects::{MalformedPolicy, RefreshPolicy};
use crate::infrastructure::sources::looks_remote;

/// Project config file name at the project root
pub const CONFIG_FILE: &str = "ruleforge.toml";

/// A declared source.
///
/// Accepts a bare string (kind inferred from the locator):
///   sources = ["../team-rules", "https://github.com/acme/rules.git"]
///
/// Or a table:
///   [[sources]]
///   kind = "remote"
///   locator = "https://github.com/acme/rules.git"
///   alias = "acme"
///   ref = "main"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceConfig {
    pub kind: SourceKindConfig,
    pub locator: String,
    pub alias: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKindConfig {
    Remote,
    Local,
}

impl SourceKindConfig {
    fn infer(locator: &str) -> Self {
        if looks_remote(locator) {
            SourceKindConfig::Remote
        } else {
            SourceKindConfig::Local
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SourceConfigDe {
    Locator(String),
    Table {
        #[serde(default)]
        kind: Option<SourceKindConfig>,
        #[serde(alias = "url", alias = "path")]
        locator: String,
        #[serde(default)]
        alias: Option<String>,
        #[serde(default, rename = "ref", alias = "branch")]
        git_ref: Option<String>,
    },
}

impl<'de> Deserialize<'de> for SourceConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match SourceConfigDe::deserialize(deserializer)? {
            SourceConfigDe::Locator(locator) => Ok(Self {
                kind: SourceKindConfig::infer(&locator),
                locator,
                alias: None,
                git_ref: None,
            }),
            SourceConfigDe::Table {
                kind,
                locator,
                alias,
                git_ref,
            } => Ok(Self {
                kind: kind.unwrap_or_else(|| SourceKindConfig::infer(&locator)),
                locator,
                alias,
                git_ref,
            }),
        }
    }
}

impl SourceConfig {
    pub fn to_source(&self) -> Source {
        Source {
            kind: match self.kind {
                SourceKindConfig::Remote => SourceKind::Remote,
                SourceKindConfig::Local => SourceKind::Local,
            },
            locator: self.locator.clone(),
            alias: self.alias.clone(),
            git_ref: self.git_ref.clone(),
        }
    }
}

/// External generator command, as a list or a whitespace-separated string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct GeneratorConfig {
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CommandDe {
    Line(String),
    Argv(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratorConfigDe {
    #[serde(default)]
    command: Option<CommandDe>,
}

impl<'de> Deserialize<'de> for GeneratorConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = GeneratorConfigDe::deserialize(deserializer)?;
        Ok(Self {
            command: raw.command.map(|c| match c {
                CommandDe::Line(line) => line.split_whitespace().map(str::to_string).collect(),
                CommandDe::Argv(argv) => argv,
            }),
        })
    }
}

/// Remote fetch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub refresh: RefreshPolicy,

    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshPolicy::default(),
            stale_after_hours: default_stale_after_hours(),
        }
    }
}

fn default_stale_after_hours() -> u64 {
    24
}

/// Composition configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ComposeConfig {
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

/// Project configuration (`ruleforge.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    /// Profile selectors, later wins; `use-cases` is the legacy key
    #[serde(default, alias = "use-cases", alias = "use_cases")]
    pub profiles: Vec<String>,

    #[serde(default)]
    pub targets: Vec<String>,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Opaque, handed to the generator untouched
    #[serde(default)]
    pub options: toml::Table,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub compose: ComposeConfig,
}
