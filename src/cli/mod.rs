//! CLI argument definitions and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// EmuELEC backup restore - copy a backed-up configuration set onto the system.
///
/// Invoked with no subcommand it runs the restore unconditionally.
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "eerestore", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "EERESTORE_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (show debug information)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Restore manifest (TOML) overriding the built-in EmuELEC plan
    #[arg(long, short = 'm', global = true, env = "EERESTORE_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the restore (the default when no subcommand is given)
    Run(RunArgs),

    /// Show the effective restore plan without touching the filesystem
    Plan(PlanArgs),

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct RunArgs {
    /// Show what would be copied without writing anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Skip copies whose destination already has identical content
    /// (compared by hash)
    #[arg(long)]
    pub skip_unchanged: bool,

    /// Exit nonzero when any copy step failed
    #[arg(long)]
    pub strict: bool,

    /// Re-base all absolute plan paths under this directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Re-base all absolute plan paths under this directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
