//! CLI tests for `ruleforge sync` and `ruleforge plan`

mod common;

use common::*;

#[test]
fn sync_composes_both_sources_and_writes_lock() {
    let env = two_source_env().build();

    let result = env.run(&["sync"]);

    assert!(result.is_success(), "sync failed:\n{}", result.combined_output());
    assert_output_contains!(result, "Sync complete");
    assert_deployed_contains!(env, "rules/style.md", "team");
    assert_deployed_contains!(env, "rules/review.md", "# Review");
    assert_not_deployed!(env, "rules/research.md");
    assert_not_deployed!(env, "rules/notes.md");

    let lock = env.read_lockfile();
    assert!(lock.contains("rules/style.md"), "lock:\n{}", lock);
    assert!(lock.contains("rules/review.md"), "lock:\n{}", lock);
    assert!(!lock.contains("research.md"), "lock:\n{}", lock);
}

#[test]
fn second_sync_is_up_to_date() {
    let env = two_source_env().build();
    assert!(env.run(&["sync"]).is_success());

    let result = env.run(&["sync"]);

    assert!(result.is_success());
    assert_output_contains!(result, "Already up to date");
}

#[test]
fn plan_does_not_touch_the_project() {
    let env = two_source_env().build();

    let result = env.run(&["plan"]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert_output_contains!(result, "Plan");
    assert_output_contains!(result, "rules/style.md");
    assert_not_deployed!(env, "rules/style.md");
    assert_not_deployed!(env, "ruleforge.lock");
}

#[test]
fn sync_removes_files_a_source_dropped() {
    let env = two_source_env().build();
    assert!(env.run(&["sync"]).is_success());

    env.remove_workspace_file("rules-b/profiles/dev/rules/review.md");
    let result = env.run(&["sync"]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert_not_deployed!(env, "rules/review.md");
    assert!(!env.read_lockfile().contains("rules/review.md"));
}

#[test]
fn native_file_is_never_overwritten() {
    let env = two_source_env()
        .with_project_file("rules/style.md", "hand written\n")
        .build();

    let result = env.run(&["sync"]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert_output_contains!(result, "native file differs");
    assert_eq!(env.read_deployed_file("rules/style.md"), "hand written\n");
    assert!(!env.read_lockfile().contains("rules/style.md"));
}

#[test]
fn tracked_file_still_produced_is_overwritten() {
    let env = two_source_env().build();
    assert!(env.run(&["sync"]).is_success());

    env.write_project_file("rules/review.md", "my edits\n");
    env.write_workspace_file("rules-b/profiles/dev/rules/review.md", "# Review v2\n");
    let result = env.run(&["sync"]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert_output_not_contains!(result, "Conflicts");
    assert_eq!(env.read_deployed_file("rules/review.md"), "# Review v2\n");
}

#[test]
fn edited_tracked_file_is_kept_when_source_drops_it() {
    let env = two_source_env().build();
    assert!(env.run(&["sync"]).is_success());

    env.write_project_file("rules/review.md", "my edits\n");
    env.remove_workspace_file("rules-b/profiles/dev/rules/review.md");
    let result = env.run(&["sync"]);

    assert!(result.is_success());
    assert_output_contains!(result, "edited since last sync, not removed");
    assert_eq!(env.read_deployed_file("rules/review.md"), "my edits\n");
}

#[test]
fn source_shipping_a_lock_file_never_replaces_the_real_one() {
    let env = two_source_env()
        .with_source("rules-c", "name = \"rogue\"\n[profiles.dev]\n")
        .with_source_file("shared/ruleforge.lock", "files = []\n")
        .with_source_file("shared/ruleforge.toml", "profiles = []\n")
        .with_project_config(
            "profiles = [\"dev\"]\ntargets = [\"claude\"]\nfeatures = [\"rules\"]\nsources = [\"../rules-a\", \"../rules-b\", \"../rules-c\"]\n",
        )
        .build();

    let first = env.run(&["sync"]);
    assert!(first.is_success(), "{}", first.combined_output());
    assert_output_contains!(first, "reserved for ruleforge's own state");

    let lock = env.read_lockfile();
    assert!(lock.contains("rules/style.md"), "lock:\n{}", lock);
    assert!(!lock.contains("\"ruleforge.lock\""), "lock:\n{}", lock);
    assert!(!lock.contains("\"ruleforge.toml\""), "lock:\n{}", lock);
    assert!(env.read_deployed_file("ruleforge.toml").contains("../rules-c"));

    let second = env.run(&["sync"]);
    assert!(second.is_success());
    assert_output_contains!(second, "Already up to date");
}

#[test]
fn fail_on_conflict_exits_with_two() {
    let env = two_source_env()
        .with_project_file("rules/style.md", "hand written\n")
        .build();

    let result = env.run(&["sync", "--fail-on-conflict"]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    // Non-conflicting paths are still deployed
    assert_deployed!(env, "rules/review.md");
}

#[test]
fn sync_json_reports_written_paths() {
    let env = two_source_env().build();

    let result = env.run(&["sync", "--json"]);

    assert!(result.is_success(), "{}", result.combined_output());
    let json = result.json();
    assert_eq!(json["command"], "sync");
    assert_eq!(json["success"], true);
    assert_eq!(json["sources"], serde_json::json!(["acme", "team"]));
    let written: Vec<&str> = json["deployment"]["written"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(written, vec!["rules/review.md", "rules/style.md"]);
}

#[test]
fn profile_override_from_environment() {
    let env = two_source_env().build();

    let result = env.run_with_env(&["sync"], &[("RULEFORGE_PROFILES", "research")]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert_deployed!(env, "rules/notes.md");
    assert_deployed!(env, "rules/research.md");
    assert_not_deployed!(env, "rules/review.md");
}

#[test]
fn unknown_profile_is_fatal() {
    let env = two_source_env()
        .with_project_config(
            "profiles = [\"ops\"]\ntargets = [\"claude\"]\nfeatures = [\"rules\"]\nsources = [\"../rules-a\"]\n",
        )
        .build();

    let result = env.run(&["sync"]);

    assert_eq!(result.exit_code, 1);
    assert_output_contains!(result, "profile 'ops' is not declared by any source");
    assert_not_deployed!(env, "ruleforge.lock");
}

#[test]
fn missing_config_is_fatal_in_json() {
    let env = two_source_env().without_project_config_file().build();

    let result = env.run(&["sync", "--json"]);

    assert_eq!(result.exit_code, 1);
    let json = result.json();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["kind"], "config_invalid");
}

#[test]
fn project_flag_selects_the_root() {
    let env = two_source_env().build();

    let project = env.project_root();
    let result = env.run_from_with_env(
        env.workspace.path(),
        &["sync", "--project", project.to_str().unwrap()],
        &[],
    );

    assert!(result.is_success(), "{}", result.combined_output());
    assert_deployed!(env, "rules/style.md");
}

#[cfg(unix)]
#[test]
fn symlink_loop_in_a_source_is_not_followed() {
    let env = two_source_env().build();
    std::os::unix::fs::symlink("..", env.workspace_path("rules-a/shared/rules/loop")).unwrap();

    let result = env.run(&["sync", "--json"]);

    assert!(result.is_success(), "{}", result.combined_output());
    let json = result.json();
    assert!(json["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w["kind"] == "skipped_link"));
    assert_not_deployed!(env, "rules/loop");
    assert_deployed_contains!(env, "rules/style.md", "team");
}
