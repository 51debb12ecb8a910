//! Tests for the config module

use std::path::Path;

use super::*;
use crate::domain::entities::SourceKind;
use crate::domain::value_objects::{MalformedPolicy, RefreshPolicy};
use crate::error::{RuleforgeError, WarningKind};
use tempfile::tempdir;

const FULL: &str = r#"
profiles = ["development", "development:*"]
targets = ["claude", "cursor"]
features = ["rules", "commands"]

[[sources]]
kind = "remote"
locator = "https://github.com/acme/ai-rules.git"
alias = "acme"
ref = "main"

[[sources]]
kind = "local"
locator = "../team-rules"

[options]
claude = { memory = true }

[generator]
command = ["ai-rules-gen", "--quiet"]

[fetch]
refresh = "never"
stale_after_hours = 6

[compose]
on_malformed = "skip"
"#;

fn parse(content: &str) -> (ProjectConfig, Vec<crate::error::Warning>) {
    parse_with_warnings(content, Path::new(CONFIG_FILE)).unwrap()
}

fn minimal() -> ProjectConfig {
    parse(
        r#"
profiles = ["development"]
targets = ["claude"]
features = ["rules"]
sources = ["../rules"]
"#,
    )
    .0
}

#[test]
fn test_config_default() {
    let config = ProjectConfig::default();
    assert!(config.sources.is_empty());
    assert_eq!(config.fetch.refresh, RefreshPolicy::Stale);
    assert_eq!(config.fetch.stale_after_hours, 24);
    assert_eq!(config.compose.on_malformed, MalformedPolicy::Include);
    assert_eq!(config.generator.command, None);
}

#[test]
fn test_config_parse_full() {
    let (config, warnings) = parse(FULL);
    assert!(warnings.is_empty(), "{warnings:?}");

    assert_eq!(config.profiles, vec!["development", "development:*"]);
    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.sources[0].kind, SourceKindConfig::Remote);
    assert_eq!(config.sources[0].alias.as_deref(), Some("acme"));
    assert_eq!(config.sources[0].git_ref.as_deref(), Some("main"));
    assert_eq!(config.sources[1].kind, SourceKindConfig::Local);
    assert_eq!(
        config.generator.command,
        Some(vec!["ai-rules-gen".to_string(), "--quiet".to_string()])
    );
    assert_eq!(config.fetch.refresh, RefreshPolicy::Never);
    assert_eq!(config.fetch.stale_after_hours, 6);
    assert_eq!(config.compose.on_malformed, MalformedPolicy::Skip);
}

#[test]
fn test_bare_string_sources_infer_kind() {
    let (config, _) = parse(
        r#"sources = ["../team-rules", "https://github.com/acme/rules.git", "git@github.com:acme/x.git"]"#,
    );
    let kinds: Vec<SourceKindConfig> = config.sources.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SourceKindConfig::Local,
            SourceKindConfig::Remote,
            SourceKindConfig::Remote
        ]
    );
}

#[test]
fn test_generator_command_string_is_split() {
    let (config, _) = parse("[generator]\ncommand = \"node gen.js --fast\"\n");
    assert_eq!(
        config.generator.command,
        Some(vec!["node".to_string(), "gen.js".to_string(), "--fast".to_string()])
    );
}

#[test]
fn test_use_cases_alias() {
    let (config, _) = parse("use-cases = [\"research\"]\n");
    assert_eq!(config.profiles, vec!["research"]);
}

#[test]
fn test_unknown_keys_warn_with_suggestion() {
    let (_, warnings) = parse("profiles = [\"dev\"]\ntarget = [\"claude\"]\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::UnknownKey);
    assert!(warnings[0].message.contains("'target'"));
    assert!(warnings[0].message.contains("line 2"));
    assert!(warnings[0].message.contains("did you mean 'targets'"));
}

#[test]
fn test_invalid_toml_is_config_invalid() {
    let err = parse_with_warnings("profiles = [", Path::new(CONFIG_FILE)).unwrap_err();
    assert!(matches!(err, RuleforgeError::ConfigInvalid { .. }));
}

#[test]
fn test_missing_config_file() {
    let dir = tempdir().unwrap();
    let err = load_with_warnings(&dir.path().join(CONFIG_FILE)).unwrap_err();
    assert!(err.to_string().contains("file not found"));
}

#[test]
fn test_validate_minimal() {
    let validated = validate(&minimal(), Path::new(CONFIG_FILE)).unwrap();
    assert_eq!(validated.sources.len(), 1);
    assert_eq!(validated.sources[0].kind, SourceKind::Local);
    assert_eq!(validated.selectors[0].to_string(), "development");
    assert_eq!(validated.options, serde_json::json!({}));
}

#[test]
fn test_validate_requires_each_list() {
    for field in ["sources", "profiles", "targets", "features"] {
        let mut config = minimal();
        match field {
            "sources" => config.sources.clear(),
            "profiles" => config.profiles.clear(),
            "targets" => config.targets.clear(),
            _ => config.features.clear(),
        }
        let err = validate(&config, Path::new(CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, RuleforgeError::ConfigInvalid { .. }), "{field}");
    }
}

#[test]
fn test_validate_rejects_duplicate_sources() {
    let mut config = minimal();
    let mut dup = config.sources[0].clone();
    dup.alias = Some("other-name".to_string());
    config.sources.push(dup);

    let err = validate(&config, Path::new(CONFIG_FILE)).unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_validate_rejects_malformed_selector() {
    let mut config = minimal();
    config.profiles.push("a:b:c".to_string());
    let err = validate(&config, Path::new(CONFIG_FILE)).unwrap_err();
    assert!(err.to_string().contains("a:b:c"));
}

#[test]
fn test_options_are_passed_as_json() {
    let (config, _) = parse(FULL);
    let validated = validate(&config, Path::new(CONFIG_FILE)).unwrap();
    assert_eq!(validated.options["claude"]["memory"], serde_json::json!(true));
}

#[test]
fn test_env_overrides() {
    let env = EnvOverrides::from_lookup(|name| match name {
        "RULEFORGE_PROFILES" => Some("research, ops".to_string()),
        "RULEFORGE_TARGETS" => Some("cursor".to_string()),
        "RULEFORGE_REFRESH" => Some("always".to_string()),
        "RULEFORGE_CACHE_DIR" => Some("/tmp/rf-cache".to_string()),
        _ => None,
    })
    .unwrap();

    let config = with_env_overrides(minimal(), &env);
    assert_eq!(config.profiles, vec!["research", "ops"]);
    assert_eq!(config.targets, vec!["cursor"]);
    assert_eq!(config.features, vec!["rules"]);
    assert_eq!(config.fetch.refresh, RefreshPolicy::Always);
    assert_eq!(env.cache_dir.as_deref(), Some(Path::new("/tmp/rf-cache")));
}

#[test]
fn test_env_refresh_must_be_known() {
    let err = EnvOverrides::from_lookup(|name| {
        (name == "RULEFORGE_REFRESH").then(|| "sometimes".to_string())
    })
    .unwrap_err();
    assert!(err.to_string().contains("RULEFORGE_REFRESH"));
}

#[test]
fn test_load_project_reads_root_config() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), FULL).unwrap();
    let (validated, warnings) = load_project(dir.path(), &EnvOverrides::default()).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(validated.sources.len(), 2);
    assert_eq!(validated.on_malformed, MalformedPolicy::Skip);
}
