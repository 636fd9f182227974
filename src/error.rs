//! Error types for restore operations.

use thiserror::Error;

/// Primary error type for restore operations.
#[derive(Error, Debug)]
pub enum RestoreError {
    // Archive errors
    #[error("Backup archive not found: {path}")]
    ArchiveNotFound { path: String },

    #[error("Invalid or corrupt backup archive: {0}")]
    ArchiveInvalid(String),

    // Working directory errors
    #[error("Working directory not found: {path}")]
    WorkdirNotFound { path: String },

    // Manifest errors
    #[error("Restore manifest not found: {path}")]
    ManifestNotFound { path: String },

    #[error("Manifest parse error: {0}")]
    ManifestParse(String),

    #[error("Invalid manifest: {0}")]
    ManifestInvalid(String),

    // Aggregate step failures (surfaced only in --strict mode)
    #[error("{failed} restore step(s) failed")]
    StepsFailed { failed: usize },

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl RestoreError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ArchiveNotFound { .. }
                | Self::WorkdirNotFound { .. }
                | Self::ManifestNotFound { .. }
                | Self::ManifestParse(_)
                | Self::ManifestInvalid(_)
                | Self::StepsFailed { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ArchiveNotFound { .. } => {
                Some("Place the backup archive at the configured path, or pass --manifest")
            }
            Self::WorkdirNotFound { .. } => {
                Some("Create the working directory or adjust the manifest")
            }
            Self::ManifestNotFound { .. } => Some("Check the --manifest path"),
            Self::ManifestParse(_) | Self::ManifestInvalid(_) => {
                Some("Run: eerestore plan to see the expected manifest shape")
            }
            Self::StepsFailed { .. } => Some("Re-run with -v to see per-step errors"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using RestoreError.
pub type Result<T> = std::result::Result<T, RestoreError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| RestoreError::Other(format!("{}: {e}", f().into())))
    }
}
