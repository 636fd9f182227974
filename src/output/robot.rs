//! Robot mode JSON output implementation.

use serde::Serialize;

use super::{Output, RobotFormat, VersionInfo};
use crate::plan::RestorePlan;
use crate::restore::RestoreReport;

/// Renders everything as JSON on stdout.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[must_use]
    pub const fn new(format: RobotFormat) -> Self {
        Self { format }
    }

    fn emit<T: Serialize>(&self, data: &T) {
        let json = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        match json {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("{{\"error\":true,\"message\":\"serialization failed: {e}\"}}"),
        }
    }
}

impl Output for RobotOutput {
    fn restore_report(&self, report: &RestoreReport) {
        self.emit(report);
    }

    fn plan(&self, plan: &RestorePlan) {
        self.emit(plan);
    }

    fn version_info(&self, info: &VersionInfo) {
        self.emit(info);
    }
}
