//! Ruleforge CLI - layered AI assistant configuration, composed and deployed
//!
//! Usage: ruleforge <COMMAND>
//!
//! Commands:
//!   sync      Compose sources and deploy the result into the project
//!   plan      Show what sync would do without touching the project
//!   detach    Remove every file ruleforge owns, then the lock file
//!   profiles  List the profiles the configured sources declare
//!   status    Summarize the lock file and the state of tracked files

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use ruleforge::application::{list_profiles, DetachOptions, Interrupt, RunContext, SyncOptions};
use ruleforge::config::EnvOverrides;
use ruleforge::domain::value_objects::RefreshPolicy;
use ruleforge::error::RuleforgeError;
use ruleforge::presentation::output::{detach_json, error_json, sync_json, to_pretty};
use ruleforge::presentation::terminal::use_color;
use ruleforge::presentation::{
    create_detach_use_case, create_pipeline, create_status_use_case, create_sync_use_case, Cli,
    Commands, OutputFormat, TextRenderer,
};

/// Exit status when the run was stopped by Ctrl+C
const EXIT_INTERRUPTED: u8 = 130;
/// Exit status for `sync --fail-on-conflict` when a path is in conflict
const EXIT_CONFLICT: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    ctrlc::set_handler(move || {
        log::warn!("interrupt received, stopping at the next safe point");
        handler.raise();
    })
    .context("Error setting Ctrl+C handler")?;

    let printer = Printer {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        text: TextRenderer::new(use_color(cli.color), cli.verbose),
    };

    let ctx = match build_context(&cli, interrupt.clone()) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(printer.fail(&e)),
    };

    let code = match cli.command {
        Commands::Sync {
            dry_run,
            diff,
            fail_on_conflict,
        } => cmd_sync(&ctx, &printer, dry_run, diff, fail_on_conflict),
        Commands::Plan { diff } => cmd_sync(&ctx, &printer, true, diff, false),
        Commands::Detach { dry_run } => cmd_detach(&ctx, &printer, dry_run),
        Commands::Profiles => cmd_profiles(&ctx, &printer),
        Commands::Status => cmd_status(&ctx, &printer),
    };

    // Deployment and the lock write finish even after Ctrl+C; report it here
    if interrupt.is_raised() {
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
    Ok(code)
}

/// `-v` raises the default level one step per flag; `RUST_LOG` wins when set
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn build_context(cli: &Cli, interrupt: Interrupt) -> Result<RunContext, RuleforgeError> {
    let overrides = EnvOverrides::from_env()?;
    let project_root = match &cli.project {
        Some(path) => path.clone(),
        None => std::env::current_dir().map_err(RuleforgeError::Io)?,
    };
    log::debug!("project root: {}", project_root.display());

    let mut ctx = RunContext::new(absolute(project_root))
        .with_overrides(overrides)
        .with_verbosity(cli.verbose)
        .with_interrupt(interrupt);
    if cli.refresh {
        ctx = ctx.with_refresh(RefreshPolicy::Always);
    }
    Ok(ctx)
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .unwrap_or(path)
}

/// Prints results and errors in the format the user asked for
struct Printer {
    format: OutputFormat,
    text: TextRenderer,
}

impl Printer {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn fail(&self, err: &RuleforgeError) -> ExitCode {
        if self.json() {
            println!("{}", to_pretty(&error_json(err)));
        } else {
            eprint!("{}", self.text.render_error(err));
        }
        match err {
            RuleforgeError::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
            _ => ExitCode::FAILURE,
        }
    }
}

fn cmd_sync(
    ctx: &RunContext,
    printer: &Printer,
    dry_run: bool,
    diff: bool,
    fail_on_conflict: bool,
) -> ExitCode {
    let use_case = create_sync_use_case();
    let options = SyncOptions::new().with_dry_run(dry_run).with_diff(diff);

    let result = match use_case.execute(ctx, &options, Utc::now()) {
        Ok(result) => result,
        Err(e) => return printer.fail(&e),
    };

    if printer.json() {
        println!("{}", to_pretty(&sync_json(&result)));
    } else {
        print!("{}", printer.text.render_sync(&result));
    }

    if fail_on_conflict && result.has_conflicts() {
        return ExitCode::from(EXIT_CONFLICT);
    }
    ExitCode::SUCCESS
}

fn cmd_detach(ctx: &RunContext, printer: &Printer, dry_run: bool) -> ExitCode {
    let use_case = create_detach_use_case();
    let options = DetachOptions::new().with_dry_run(dry_run);

    match use_case.execute(ctx, &options, Utc::now()) {
        Ok(result) => {
            if printer.json() {
                println!("{}", to_pretty(&detach_json(&result)));
            } else {
                print!("{}", printer.text.render_detach(&result));
            }
            ExitCode::SUCCESS
        }
        Err(e) => printer.fail(&e),
    }
}

fn cmd_profiles(ctx: &RunContext, printer: &Printer) -> ExitCode {
    let pipeline = create_pipeline();

    match list_profiles(&pipeline, ctx, Utc::now()) {
        Ok(listing) => {
            if printer.json() {
                match serde_json::to_value(&listing) {
                    Ok(value) => println!("{}", to_pretty(&value)),
                    Err(e) => log::error!("failed to encode profile listing: {}", e),
                }
            } else {
                print!("{}", printer.text.render_profiles(&listing));
            }
            ExitCode::SUCCESS
        }
        Err(e) => printer.fail(&e),
    }
}

fn cmd_status(ctx: &RunContext, printer: &Printer) -> ExitCode {
    let use_case = create_status_use_case();

    match use_case.execute(ctx) {
        Ok(report) => {
            if printer.json() {
                match serde_json::to_value(&report) {
                    Ok(value) => println!("{}", to_pretty(&value)),
                    Err(e) => log::error!("failed to encode status report: {}", e),
                }
            } else {
                print!("{}", printer.text.render_status(&report));
            }
            ExitCode::SUCCESS
        }
        Err(e) => printer.fail(&e),
    }
}
