//! The restore operator: expand the backup archive, then distribute the
//! expanded files to the destination set.
//!
//! Steps run sequentially and independently. A failed copy marks its step
//! failed in the report but never stops the remaining steps; there is
//! deliberately no rollback or transactionality across steps. Re-running is
//! idempotent because every copy is an unconditional overwrite of
//! deterministic source content.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::archive;
use crate::error::Result;
use crate::plan::{CopyStep, RestorePlan};

/// Switches for a restore run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestoreOptions {
    /// Report what would be copied without touching the filesystem.
    pub dry_run: bool,
    /// Skip copies whose destination already has identical content
    /// (compared by SHA-256).
    pub skip_unchanged: bool,
}

/// Result of a single copy step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    /// What the step matched on (`es_input.cfg`, `joy_*`).
    pub target: String,
    /// Destination directory.
    pub dest: String,
    /// File names copied (or that would be copied, in a dry run).
    pub copied: Vec<String>,
    /// Copies skipped because the destination was already identical.
    pub skipped: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    fn success(step: &CopyStep, copied: Vec<String>, skipped: usize) -> Self {
        Self {
            target: step.matcher.target(),
            dest: step.dest.display().to_string(),
            copied,
            skipped,
            ok: true,
            error: None,
        }
    }

    fn failure(step: &CopyStep, copied: Vec<String>, skipped: usize, error: String) -> Self {
        Self {
            target: step.matcher.target(),
            dest: step.dest.display().to_string(),
            copied,
            skipped,
            ok: false,
            error: Some(error),
        }
    }
}

/// Summary statistics for a restore run.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub files_copied: usize,
    pub files_skipped: usize,
}

impl RestoreSummary {
    fn from_outcomes(outcomes: &[StepOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| !o.ok).count();
        Self {
            total: outcomes.len(),
            success: outcomes.len() - failed,
            failed,
            files_copied: outcomes.iter().map(|o| o.copied.len()).sum(),
            files_skipped: outcomes.iter().map(|o| o.skipped).sum(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Full report of a restore run, one outcome per plan step.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub archive: String,
    pub dry_run: bool,
    /// Files expanded into the working directory (archive entry count in a
    /// dry run).
    pub expanded: usize,
    pub steps: Vec<StepOutcome>,
    pub summary: RestoreSummary,
    pub completed_at: DateTime<Utc>,
}

/// Run the restore plan.
///
/// Fatal errors (`Err`) are limited to a missing/invalid archive, a missing
/// working directory, and an invalid plan; in all of these no destination
/// file has been touched. Per-step copy failures are recorded in the report
/// and subsequent steps still run.
#[instrument(skip_all, fields(archive = %plan.archive.display(), dry_run = options.dry_run))]
pub fn run(plan: &RestorePlan, options: &RestoreOptions) -> Result<RestoreReport> {
    plan.validate()?;

    if options.dry_run {
        return dry_run(plan);
    }

    let expanded = archive::expand(&plan.archive, &plan.workdir)?;
    info!(expanded, "Archive expanded, distributing files");

    let outcomes: Vec<StepOutcome> = plan
        .steps
        .iter()
        .map(|step| execute_step(&plan.workdir, step, options))
        .collect();

    let summary = RestoreSummary::from_outcomes(&outcomes);
    if summary.is_success() {
        info!(
            steps = summary.total,
            files = summary.files_copied,
            "Restore complete"
        );
    } else {
        warn!(
            failed = summary.failed,
            total = summary.total,
            "Restore finished with failed steps"
        );
    }

    Ok(RestoreReport {
        archive: plan.archive.display().to_string(),
        dry_run: false,
        expanded,
        steps: outcomes,
        summary,
        completed_at: Utc::now(),
    })
}

/// Copy everything a step matches in the working directory into its
/// destination, overwriting same-named files. A pattern matching nothing is a
/// silent no-op. Individual copy errors are recorded and the remaining
/// matches still attempt.
fn execute_step(workdir: &Path, step: &CopyStep, options: &RestoreOptions) -> StepOutcome {
    let sources = match step.matches_in(workdir) {
        Ok(sources) => sources,
        Err(e) => {
            return StepOutcome::failure(step, Vec::new(), 0, e.to_string());
        }
    };

    if sources.is_empty() {
        debug!(target = %step.matcher.target(), "Pattern matched nothing, skipping step");
        return StepOutcome::success(step, Vec::new(), 0);
    }

    let mut copied = Vec::new();
    let mut skipped = 0;
    let mut first_error: Option<String> = None;

    for src in sources {
        let Some(name) = src.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let dst = step.dest.join(&name);

        if options.skip_unchanged && dst.is_file() && same_content(&src, &dst) {
            debug!(file = %name, dest = %step.dest.display(), "Destination unchanged, skipping");
            skipped += 1;
            continue;
        }

        match fs::copy(&src, &dst) {
            Ok(_) => {
                debug!(file = %name, dest = %step.dest.display(), "Copied");
                copied.push(name);
            }
            Err(e) => {
                warn!(file = %name, dest = %step.dest.display(), error = %e, "Copy failed");
                if first_error.is_none() {
                    first_error = Some(format!("{}: {e}", dst.display()));
                }
            }
        }
    }

    match first_error {
        None => StepOutcome::success(step, copied, skipped),
        Some(error) => StepOutcome::failure(step, copied, skipped, error),
    }
}

/// Simulate a run against the archive's entry listing; nothing is written.
///
/// Only top-level entries participate, matching what a real run copies out of
/// the working directory root.
fn dry_run(plan: &RestorePlan) -> Result<RestoreReport> {
    let entries = archive::list_entries(&plan.archive)?;
    let top_level: Vec<&str> = entries
        .iter()
        .map(String::as_str)
        .filter(|name| !name.contains('/'))
        .collect();

    let outcomes: Vec<StepOutcome> = plan
        .steps
        .iter()
        .map(|step| {
            let mut matched: Vec<String> = top_level
                .iter()
                .filter(|name| step.matcher.matches(name))
                .map(|name| (*name).to_string())
                .collect();
            matched.sort();
            StepOutcome::success(step, matched, 0)
        })
        .collect();

    let summary = RestoreSummary::from_outcomes(&outcomes);
    info!(
        entries = entries.len(),
        would_copy = summary.files_copied,
        "Dry run complete"
    );

    Ok(RestoreReport {
        archive: plan.archive.display().to_string(),
        dry_run: true,
        expanded: entries.len(),
        steps: outcomes,
        summary,
        completed_at: Utc::now(),
    })
}

/// Byte-identical check via SHA-256. Read errors count as "different" so the
/// copy still happens.
fn same_content(a: &Path, b: &Path) -> bool {
    match (file_digest(a), file_digest(b)) {
        (Ok(da), Ok(db)) => da == db,
        _ => false,
    }
}

fn file_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
