//! Human-friendly colored terminal output.

use colored::Colorize;

use super::{Output, VersionInfo};
use crate::plan::RestorePlan;
use crate::restore::{RestoreReport, StepOutcome};

/// Renders reports as colored text on stdout.
pub struct HumanOutput {
    quiet: bool,
}

impl HumanOutput {
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn print_step(outcome: &StepOutcome) {
        let arrow = format!("{} \u{2192} {}", outcome.target, outcome.dest);
        if outcome.ok {
            let detail = match (outcome.copied.len(), outcome.skipped) {
                (0, 0) => "nothing matched".dimmed().to_string(),
                (n, 0) => format!("{n} file(s)"),
                (n, s) => format!("{n} file(s), {s} unchanged"),
            };
            println!("  {} {arrow} ({detail})", "ok".green());
        } else {
            println!(
                "  {} {arrow}: {}",
                "failed".red().bold(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

impl Output for HumanOutput {
    fn restore_report(&self, report: &RestoreReport) {
        if report.dry_run {
            println!(
                "{} {} (nothing written)",
                "Dry run:".bold(),
                report.archive
            );
        } else if !self.quiet {
            println!(
                "{} {} ({} file(s) expanded)",
                "Restored from".bold(),
                report.archive,
                report.expanded
            );
        }

        if !self.quiet {
            for outcome in &report.steps {
                Self::print_step(outcome);
            }
        }

        let summary = &report.summary;
        if summary.is_success() {
            if !self.quiet {
                println!(
                    "{}: {} step(s), {} file(s) copied, {} unchanged",
                    "Done".green().bold(),
                    summary.total,
                    summary.files_copied,
                    summary.files_skipped
                );
            }
        } else {
            // Failures print even in quiet mode.
            println!(
                "{}: {} of {} step(s) failed, {} file(s) copied",
                "Incomplete".red().bold(),
                summary.failed,
                summary.total,
                summary.files_copied
            );
        }
    }

    fn plan(&self, plan: &RestorePlan) {
        println!("{}: {}", "Archive".bold(), plan.archive.display());
        println!("{}: {}", "Workdir".bold(), plan.workdir.display());
        println!("{}:", "Steps".bold());
        for step in &plan.steps {
            println!(
                "  {:<16} \u{2192} {}",
                step.matcher.target().cyan(),
                step.dest.display()
            );
        }
    }

    fn version_info(&self, info: &VersionInfo) {
        println!("eerestore {}", info.version);
        println!(
            "git: {}{}",
            info.git_sha,
            if info.git_dirty { " (dirty)" } else { "" }
        );
        println!("built: {}", info.build_timestamp);
        println!("rustc: {}", info.rustc_version);
        println!("target: {}", info.target);
    }
}
