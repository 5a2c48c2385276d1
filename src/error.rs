//! Unified error types for speedshift
//!
//! Error strategy:
//! - Per-job errors (missing executable, ffmpeg failure): recoverable, recorded
//!   as a failed job and the batch continues
//! - Request and plumbing errors (bad speed, missing source, pool failure):
//!   fatal, the batch terminates before or instead of draining
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, OGG, FLAC, M4A, AAC";

/// Top-level error type for speedshift operations
#[derive(Debug, Error)]
pub enum SpeedshiftError {
    // =========================================================================
    // Recoverable errors - record failure, continue batch
    // =========================================================================
    /// The executable could not be located or launched (missing, not executable, ...)
    #[error("Error: ffmpeg not found ('{}')\n  Tip: Install ffmpeg or pass its location with --ffmpeg", executable.display())]
    ExecutableNotFound { executable: PathBuf },

    #[error("Error processing {}:\n{diagnostic}", path.display())]
    ProcessFailure { path: PathBuf, diagnostic: String },

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Source directory not found: '{}'\n  Tip: Check the path exists and is accessible", .0.display())]
    FileNotFound(PathBuf),

    #[error("Cannot write output to '{}': {reason}\n  Tip: Check write permissions for the output directory", path.display())]
    OutputError { path: PathBuf, reason: String },

    #[error("Worker pool failure: {0}")]
    WorkerPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for speedshift operations
pub type Result<T> = std::result::Result<T, SpeedshiftError>;

impl SpeedshiftError {
    /// Returns true if this error only affects a single job (record it, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SpeedshiftError::ExecutableNotFound { .. } | SpeedshiftError::ProcessFailure { .. }
        )
    }

    /// Create an invalid parameter error
    pub fn invalid(reason: impl Into<String>) -> Self {
        SpeedshiftError::InvalidParameter(reason.into())
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            _ => err.to_string(),
        };
        SpeedshiftError::OutputError { path, reason }
    }
}
