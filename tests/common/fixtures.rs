//! Test fixtures - reusable content constants for tests.

/// Project using two sibling sources, `rules-a` then `rules-b`
pub const DEFAULT_PROJECT_CONFIG: &str = r#"profiles = ["dev"]
targets = ["claude"]
features = ["rules"]
sources = ["../rules-a", "../rules-b"]
"#;

/// Manifest for the first source
pub const ACME_MANIFEST: &str = r#"name = "acme"
version = "1.0.0"

[profiles.dev]
description = "Everyday development"

[profiles.research]
description = "Exploratory work"
"#;

/// Manifest for the second source
pub const TEAM_MANIFEST: &str = r#"name = "team"

[profiles.dev]
description = "Team conventions"
"#;

/// Shared rule excluded from the `dev` profile
pub const RESEARCH_ONLY_RULE: &str = r#"---
exclude-from: dev
---
# Research

Only for research sessions.
"#;

/// Two-source environment every CLI test starts from
pub fn two_source_env() -> super::TestEnvBuilder {
    super::TestEnv::builder()
        .with_source("rules-a", ACME_MANIFEST)
        .with_source_file("shared/rules/style.md", "# Style (acme)\n")
        .with_source_file("shared/rules/research.md", RESEARCH_ONLY_RULE)
        .with_source_file("profiles/research/rules/notes.md", "# Notes\n")
        .with_source("rules-b", TEAM_MANIFEST)
        .with_source_file("shared/rules/style.md", "# Style (team)\n")
        .with_source_file("profiles/dev/rules/review.md", "# Review\n")
}
