//! Configuration loading, environment overrides and validation

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::Source;
use crate::domain::value_objects::{MalformedPolicy, ProfileSelector, RefreshPolicy};
use crate::error::{RuleforgeError, RuleforgeResult, Warning, WarningKind};

use super::types::{FetchConfig, ProjectConfig};

/// `RULEFORGE_*` environment overrides, read once by the binary and passed
/// down as values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub profiles: Option<Vec<String>>,
    pub targets: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub refresh: Option<RefreshPolicy>,
    pub cache_dir: Option<PathBuf>,
}

impl EnvOverrides {
    pub fn from_env() -> RuleforgeResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RuleforgeResult<Self> {
        let list = |name: &str| {
            lookup(name).map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
        };

        let refresh = match lookup("RULEFORGE_REFRESH") {
            Some(v) => Some(
                v.parse::<RefreshPolicy>()
                    .map_err(|e| RuleforgeError::config("RULEFORGE_REFRESH", e))?,
            ),
            None => None,
        };

        Ok(Self {
            profiles: list("RULEFORGE_PROFILES"),
            targets: list("RULEFORGE_TARGETS"),
            features: list("RULEFORGE_FEATURES"),
            refresh,
            cache_dir: lookup("RULEFORGE_CACHE_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

/// A config that passed validation, in domain types
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub sources: Vec<Source>,
    pub selectors: Vec<ProfileSelector>,
    pub targets: Vec<String>,
    pub features: Vec<String>,
    pub options: serde_json::Value,
    pub generator_command: Option<Vec<String>>,
    pub fetch: FetchConfig,
    pub on_malformed: MalformedPolicy,
}

/// Load configuration and collect non-fatal warnings (unknown keys).
pub fn load_with_warnings(path: &Path) -> RuleforgeResult<(ProjectConfig, Vec<Warning>)> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RuleforgeError::config(path, "file not found")
        } else {
            RuleforgeError::config(path, e.to_string())
        }
    })?;
    parse_with_warnings(&content, path)
}

/// Parse config text; `path` is only used in messages
pub fn parse_with_warnings(content: &str, path: &Path) -> RuleforgeResult<(ProjectConfig, Vec<Warning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: ProjectConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| RuleforgeError::config(path, e.message()))?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            let mut message = format!("unknown key '{}'", path_str);
            if let Some(line) = find_line_number(content, &key) {
                message.push_str(&format!(" (line {})", line));
            }
            if let Some(suggestion) = suggest_key(&key) {
                message.push_str(&format!("; did you mean '{}'?", suggestion));
            }
            Warning::new(WarningKind::UnknownKey, path, message)
        })
        .collect();

    Ok((config, warnings))
}

/// Apply environment overrides; lists replace the configured ones
pub fn with_env_overrides(mut config: ProjectConfig, env: &EnvOverrides) -> ProjectConfig {
    if let Some(profiles) = &env.profiles {
        config.profiles = profiles.clone();
    }
    if let Some(targets) = &env.targets {
        config.targets = targets.clone();
    }
    if let Some(features) = &env.features {
        config.features = features.clone();
    }
    if let Some(refresh) = env.refresh {
        config.fetch.refresh = refresh;
    }
    config
}

/// Check everything that can be checked before touching a source
pub fn validate(config: &ProjectConfig, file: &Path) -> RuleforgeResult<ValidatedConfig> {
    let invalid = |message: String| RuleforgeError::config(file, message);

    if config.sources.is_empty() {
        return Err(invalid("at least one source is required".to_string()));
    }
    if config.profiles.is_empty() {
        return Err(invalid("at least one profile selector is required".to_string()));
    }
    if config.targets.is_empty() {
        return Err(invalid("at least one target is required".to_string()));
    }
    if config.features.is_empty() {
        return Err(invalid("at least one feature is required".to_string()));
    }

    let mut seen = HashSet::new();
    let mut sources = Vec::with_capacity(config.sources.len());
    for source_config in &config.sources {
        if source_config.locator.trim().is_empty() {
            return Err(invalid("source locator must not be empty".to_string()));
        }
        let source = source_config.to_source();
        if !seen.insert((source.kind, source.locator.clone())) {
            return Err(invalid(format!(
                "source '{}' ({}) is declared more than once",
                source.locator, source.kind
            )));
        }
        sources.push(source);
    }

    let selectors = config
        .profiles
        .iter()
        .map(|s| s.parse::<ProfileSelector>().map_err(|e| invalid(e.to_string())))
        .collect::<RuleforgeResult<Vec<_>>>()?;

    if matches!(&config.generator.command, Some(cmd) if cmd.is_empty()) {
        return Err(invalid("generator command must not be empty".to_string()));
    }

    let options = serde_json::to_value(&config.options)
        .map_err(|e| invalid(format!("options: {}", e)))?;

    Ok(ValidatedConfig {
        sources,
        selectors,
        targets: config.targets.clone(),
        features: config.features.clone(),
        options,
        generator_command: config.generator.command.clone(),
        fetch: config.fetch.clone(),
        on_malformed: config.compose.on_malformed,
    })
}

/// Load, override and validate the config of the project at `project_root`
pub fn load_project(
    project_root: &Path,
    env: &EnvOverrides,
) -> RuleforgeResult<(ValidatedConfig, Vec<Warning>)> {
    let path = project_root.join(super::CONFIG_FILE);
    let (config, warnings) = load_with_warnings(&path)?;
    let config = with_env_overrides(config, env);
    let validated = validate(&config, &path)?;
    Ok((validated, warnings))
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "profiles",
        "targets",
        "features",
        "sources",
        "kind",
        "locator",
        "alias",
        "ref",
        "options",
        "generator",
        "command",
        "fetch",
        "refresh",
        "stale_after_hours",
        "compose",
        "on_malformed",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
