//! Output Rendering
//!
//! Every command result renders either as human text or as one JSON
//! document. Renderers return strings; printing is left to `main`.

use crossterm::style::Stylize;
use serde_json::{json, Value};

use crate::application::{
    Deployment, DetachResult, FileDiff, ProfileListing, StatusReport, SyncResult, TrackedState,
};
use crate::domain::services::{ConflictOp, ConflictReason, DeploymentPlan, PlanAction};
use crate::domain::value_objects::RelativePath;
use crate::error::{RuleforgeError, Warning};

use super::diff::render_unified_diff;

/// Semantic colors
pub mod colors {
    use crossterm::style::Color;

    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGrey;
}

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

/// Text renderer settings
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer {
    pub color: bool,
    pub verbose: u8,
}

impl TextRenderer {
    pub fn new(color: bool, verbose: u8) -> Self {
        Self { color, verbose }
    }

    fn paint(&self, s: &str, color: crossterm::style::Color) -> String {
        if self.color {
            format!("{}", s.with(color))
        } else {
            s.to_string()
        }
    }

    fn heading(&self, out: &mut String, ok: bool, title: &str) {
        let icon = if ok {
            self.paint("✓", colors::SUCCESS)
        } else {
            self.paint("!", colors::WARNING)
        };
        out.push_str(&format!("{} {}\n", icon, title));
    }

    fn section(&self, out: &mut String, title: &str, sign: &str, color: crossterm::style::Color, items: &[String]) {
        if items.is_empty() {
            return;
        }
        out.push_str(&format!("\n  {} ({}):\n", title, items.len()));
        for item in items {
            out.push_str(&format!("    {} {}\n", self.paint(sign, color), item));
        }
    }

    fn warnings<'a>(&self, out: &mut String, warnings: impl Iterator<Item = &'a Warning>) {
        let lines: Vec<String> = warnings.map(|w| w.to_string()).collect();
        self.section(out, "Warnings", "[!]", colors::WARNING, &lines);
    }

    fn conflicts(&self, out: &mut String, plan: &DeploymentPlan) {
        let lines: Vec<String> = plan
            .entries()
            .filter_map(|p| match p.action {
                PlanAction::Conflict(reason, op) => {
                    Some(format!("{}  {}", p.path, conflict_message(reason, op)))
                }
                _ => None,
            })
            .collect();
        self.section(out, "Conflicts", "!", colors::ERROR, &lines);
    }

    fn planned(&self, out: &mut String, plan: &DeploymentPlan) {
        let pick = |want: fn(PlanAction) -> bool| -> Vec<String> {
            plan.entries()
                .filter(|p| want(p.action))
                .map(|p| p.path.to_string())
                .collect()
        };
        self.section(out, "Create", "+", colors::SUCCESS, &pick(|a| a == PlanAction::Create));
        self.section(out, "Update", "~", colors::INFO, &pick(|a| a == PlanAction::Update));
        self.section(out, "Adopt", "=", colors::DIM, &pick(|a| a == PlanAction::Adopt));
        self.section(out, "Delete", "-", colors::ERROR, &pick(|a| a == PlanAction::Delete));
        self.section(out, "Forget", "?", colors::DIM, &pick(|a| a == PlanAction::Forget));
    }

    fn deployed(&self, out: &mut String, deployment: &Deployment) {
        self.section(out, "Written", "+", colors::SUCCESS, &names(&deployment.written));
        self.section(out, "Adopted", "=", colors::DIM, &names(&deployment.adopted));
        self.section(out, "Deleted", "-", colors::ERROR, &names(&deployment.deleted));
        if self.verbose > 0 {
            self.section(out, "Forgotten", "?", colors::DIM, &names(&deployment.forgotten));
            self.section(out, "Pruned", "-", colors::DIM, &names(&deployment.pruned));
        }
    }

    fn diffs(&self, out: &mut String, diffs: &[FileDiff]) {
        for diff in diffs {
            out.push('\n');
            match (&diff.before, &diff.after) {
                (None, None) => out.push_str(&format!("  {} (binary)\n", diff.path)),
                (before, after) => out.push_str(&render_unified_diff(
                    diff.path.as_str(),
                    before.as_deref().unwrap_or(""),
                    after.as_deref().unwrap_or(""),
                    self.color,
                )),
            }
        }
    }

    pub fn render_sync(&self, result: &SyncResult) -> String {
        let mut out = String::new();

        let title = match (&result.deployment, result.has_changes()) {
            (None, true) => "Plan",
            (None, false) | (Some(_), false) => "Already up to date",
            (Some(_), true) => "Sync complete",
        };
        let ok = !result.has_conflicts() && result.is_success();
        self.heading(&mut out, ok, title);

        out.push_str(&format!("  sources:  {}\n", result.sources.join(", ")));
        out.push_str(&format!("  profiles: {}\n", result.profiles.join(", ")));

        match &result.deployment {
            Some(deployment) => self.deployed(&mut out, deployment),
            None => self.planned(&mut out, &result.plan),
        }
        self.conflicts(&mut out, &result.plan);

        if self.verbose > 0 {
            let filtered: Vec<String> = result
                .filtered
                .iter()
                .map(|f| format!("{}/shared/{}", f.source, f.path))
                .collect();
            self.section(&mut out, "Filtered by tags", "○", colors::DIM, &filtered);
        }
        if self.verbose > 1 {
            let overrides: Vec<String> = result
                .overrides
                .iter()
                .map(|o| format!("{}  {} over {}", o.path, o.winner, o.replaced))
                .collect();
            self.section(&mut out, "Overrides", "↳", colors::DIM, &overrides);
        }

        self.warnings(&mut out, result.all_warnings());
        self.diffs(&mut out, &result.diffs);
        out
    }

    pub fn render_detach(&self, result: &DetachResult) -> String {
        let mut out = String::new();

        let title = match (&result.deployment, result.had_lockfile) {
            (_, false) => "Nothing to detach",
            (None, true) => "Detach plan",
            (Some(_), true) => "Detached",
        };
        self.heading(&mut out, !result.has_conflicts(), title);

        match &result.deployment {
            Some(deployment) => self.deployed(&mut out, deployment),
            None => self.planned(&mut out, &result.plan),
        }
        self.conflicts(&mut out, &result.plan);
        if result.has_conflicts() && result.deployment.is_some() {
            out.push_str("\n  Conflicting files were left in place and are no longer tracked.\n");
        }
        self.warnings(&mut out, result.all_warnings());
        out
    }

    pub fn render_status(&self, report: &StatusReport) -> String {
        let mut out = String::new();

        if !report.has_lockfile {
            self.heading(&mut out, true, "Not synced yet (no ruleforge.lock)");
            return out;
        }

        let ok = report.files.iter().all(|f| f.state == TrackedState::Clean);
        self.heading(&mut out, ok, "Lock status");
        if let Some(at) = report.last_synced_at {
            out.push_str(&format!("  last sync: {}\n", at.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        out.push_str(&format!(
            "  {} tracked: {} clean, {} modified, {} missing\n",
            report.files.len(),
            report.count(TrackedState::Clean),
            report.count(TrackedState::Modified),
            report.count(TrackedState::Missing),
        ));

        let attention: Vec<String> = report
            .files
            .iter()
            .filter(|f| f.state != TrackedState::Clean || self.verbose > 0)
            .map(|f| format!("{}  {}", f.path, state_label(f.state)))
            .collect();
        self.section(&mut out, "Files", "•", colors::INFO, &attention);
        self.warnings(&mut out, report.warnings.iter());
        out
    }

    pub fn render_profiles(&self, listing: &ProfileListing) -> String {
        let mut out = String::new();

        for source in &listing.sources {
            let version = source
                .version
                .as_deref()
                .map(|v| format!(" ({})", v))
                .unwrap_or_default();
            out.push_str(&format!("{}{}\n", self.paint(&source.source, colors::INFO), version));
            if let Some(description) = &source.description {
                out.push_str(&format!("  {}\n", self.paint(description, colors::DIM)));
            }

            let width = source
                .profiles
                .iter()
                .map(|p| p.name.len())
                .max()
                .unwrap_or(0);
            for profile in &source.profiles {
                let marker = if profile.active {
                    self.paint("*", colors::SUCCESS)
                } else {
                    " ".to_string()
                };
                let line = format!("{:<width$}  {}", profile.name, profile.description, width = width);
                out.push_str(format!("  {} {}", marker, line).trim_end());
                out.push('\n');
            }
            out.push('\n');
        }

        if let Some(error) = &listing.selection_error {
            out.push_str(&format!("{} {}\n", self.paint("!", colors::WARNING), error));
        }
        self.warnings(&mut out, listing.warnings.iter());
        out
    }

    pub fn render_error(&self, err: &RuleforgeError) -> String {
        format!("{} {}\n", self.paint("✗", colors::ERROR), err)
    }
}

fn names(paths: &[RelativePath]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

fn conflict_message(reason: ConflictReason, op: ConflictOp) -> &'static str {
    match (reason, op) {
        (ConflictReason::Untracked, _) => "native file differs, not overwritten",
        (ConflictReason::Modified, _) => "edited since last sync, not removed",
        (ConflictReason::Unreadable, _) => "cannot be read, skipped",
        (ConflictReason::NotAFile, _) => "not a regular file, skipped",
        (ConflictReason::Reserved, _) => "reserved for ruleforge's own state, not written",
    }
}

fn state_label(state: TrackedState) -> &'static str {
    match state {
        TrackedState::Clean => "clean",
        TrackedState::Modified => "modified",
        TrackedState::Missing => "missing",
        TrackedState::Unverified => "unverified (no recorded hash)",
        TrackedState::Blocked => "not a readable file",
    }
}

pub fn action_label(action: PlanAction) -> &'static str {
    match action {
        PlanAction::Create => "create",
        PlanAction::Update => "update",
        PlanAction::Adopt => "adopt",
        PlanAction::Unchanged => "unchanged",
        PlanAction::Delete => "delete",
        PlanAction::Forget => "forget",
        PlanAction::Conflict(..) => "conflict",
    }
}

fn plan_json(plan: &DeploymentPlan) -> Value {
    Value::Array(
        plan.entries()
            .filter(|p| p.action != PlanAction::Unchanged)
            .map(|p| match p.action {
                PlanAction::Conflict(reason, op) => json!({
                    "path": p.path,
                    "action": action_label(p.action),
                    "reason": reason,
                    "operation": op,
                }),
                action => json!({ "path": p.path, "action": action_label(action) }),
            })
            .collect(),
    )
}

fn deployment_json(deployment: Option<&Deployment>) -> Value {
    match deployment {
        None => Value::Null,
        Some(d) => json!({
            "written": d.written,
            "adopted": d.adopted,
            "deleted": d.deleted,
            "forgotten": d.forgotten,
            "pruned": d.pruned,
        }),
    }
}

pub fn sync_json(result: &SyncResult) -> Value {
    let command = if result.dry_run { "plan" } else { "sync" };
    json!({
        "command": command,
        "success": result.is_success(),
        "changed": result.has_changes(),
        "sources": result.sources,
        "profiles": result.profiles,
        "plan": plan_json(&result.plan),
        "deployment": deployment_json(result.deployment.as_ref()),
        "conflicts": result.plan.conflicts(),
        "filtered": result
            .filtered
            .iter()
            .map(|f| json!({ "source": f.source, "path": f.path }))
            .collect::<Vec<_>>(),
        "overrides": result
            .overrides
            .iter()
            .map(|o| json!({ "path": o.path, "winner": o.winner, "replaced": o.replaced }))
            .collect::<Vec<_>>(),
        "warnings": result.all_warnings().collect::<Vec<_>>(),
        "diffs": result
            .diffs
            .iter()
            .map(|d| json!({ "path": d.path, "before": d.before, "after": d.after }))
            .collect::<Vec<_>>(),
    })
}

pub fn detach_json(result: &DetachResult) -> Value {
    json!({
        "command": "detach",
        "dry_run": result.dry_run,
        "had_lockfile": result.had_lockfile,
        "plan": plan_json(&result.plan),
        "deployment": deployment_json(result.deployment.as_ref()),
        "conflicts": result.plan.conflicts(),
        "warnings": result.all_warnings().collect::<Vec<_>>(),
    })
}

pub fn error_json(err: &RuleforgeError) -> Value {
    let kind = match err {
        RuleforgeError::ConfigInvalid { .. } => "config_invalid",
        RuleforgeError::SourceUnresolvable { .. } => "source_unresolvable",
        RuleforgeError::ProfileNotFound { .. } => "profile_not_found",
        RuleforgeError::GenerationFailure { .. } => "generation_failure",
        RuleforgeError::LockWrite { .. } => "lock_write",
        RuleforgeError::Io(_) => "io",
        RuleforgeError::Interrupted => "interrupted",
    };
    json!({ "success": false, "error": { "kind": kind, "message": err.to_string() } })
}

/// Pretty JSON for printing
pub fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
