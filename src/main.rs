//! EmuELEC backup restore CLI.
//!
//! Invoked bare it runs the restore unconditionally; subcommands add
//! dry-run and plan inspection, with both human and robot (JSON) output.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};
use std::path::Path;

use clap::Parser;
use colored::Colorize;

use eerestore::cli::{self, Cli, Commands};
use eerestore::error::{Result, RestoreError};
use eerestore::logging::init_logging;
use eerestore::output::{Output, OutputMode, VersionInfo};
use eerestore::plan::RestorePlan;
use eerestore::restore::{self, RestoreOptions};

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

fn main() {
    let cli = Cli::parse();

    // Handle no-color flag or non-TTY
    if cli.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    init_logging(cli.use_json(), u8::from(cli.verbose), cli.quiet);

    // Run the command
    let result = run(&cli);

    // Handle errors
    if let Err(e) = result {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        // Bare invocation restores unconditionally.
        None => cmd_run(cli, &cli::RunArgs::default()),
        Some(Commands::Run(args)) => cmd_run(cli, args),
        Some(Commands::Plan(args)) => cmd_plan(cli, args),
        Some(Commands::Version) => cmd_version(cli),
        Some(Commands::Completions(args)) => cmd_completions(cli, args),
    }
}

/// Resolve the effective plan: manifest if given, the built-in EmuELEC set
/// otherwise, optionally re-based under --root.
fn load_plan(cli: &Cli, root: Option<&Path>) -> Result<RestorePlan> {
    let plan = match &cli.manifest {
        Some(path) => RestorePlan::load(path)?,
        None => RestorePlan::emuelec_default(),
    };

    Ok(match root {
        Some(root) => plan.rooted_at(root),
        None => plan,
    })
}

// === Command Implementations ===

fn cmd_run(cli: &Cli, args: &cli::RunArgs) -> Result<()> {
    let plan = load_plan(cli, args.root.as_deref())?;
    let options = RestoreOptions {
        dry_run: args.dry_run,
        skip_unchanged: args.skip_unchanged,
    };

    let report = restore::run(&plan, &options)?;

    let out = OutputMode::from_cli(cli).into_output();
    out.restore_report(&report);

    if args.strict && !report.summary.is_success() {
        return Err(RestoreError::StepsFailed {
            failed: report.summary.failed,
        });
    }
    Ok(())
}

fn cmd_plan(cli: &Cli, args: &cli::PlanArgs) -> Result<()> {
    let plan = load_plan(cli, args.root.as_deref())?;
    plan.validate()?;

    let out = OutputMode::from_cli(cli).into_output();
    out.plan(&plan);
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(cli: &Cli) -> Result<()> {
    let info = VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty() == "true",
        build_timestamp: build_info::build_timestamp(),
        rustc_version: build_info::rustc_semver(),
        target: build_info::target(),
    };

    let out = OutputMode::from_cli(cli).into_output();
    out.version_info(&info);
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(_cli: &Cli, args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "eerestore", &mut io::stdout());
    Ok(())
}

// === Utility Functions ===

fn output_error(cli: &Cli, error: &RestoreError) {
    if cli.use_json() {
        let json = serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    } else {
        eprintln!("{}: {}", "Error".red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", "Hint".yellow(), suggestion);
        }
    }
}
