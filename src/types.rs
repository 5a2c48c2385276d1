//! Core data types for speedshift
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// Batch request
// =============================================================================

/// One batch run: transform every eligible file under `source_dir` by `speed`
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Playback speed multiplier (2.0 = double speed)
    pub speed: f64,
}

impl BatchRequest {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>, speed: f64) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            speed,
        }
    }
}

// =============================================================================
// Jobs
// =============================================================================

/// One input file to be speed-transformed into one output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Absolute (or source-rooted) path of the input file
    pub input_path: PathBuf,
    /// Path of the input relative to the source root
    pub relative_path: PathBuf,
    /// `dest_dir / relative_path`
    pub output_path: PathBuf,
}

impl Job {
    pub fn new(source_root: &Path, dest_root: &Path, relative_path: PathBuf) -> Self {
        Self {
            input_path: source_root.join(&relative_path),
            output_path: dest_root.join(&relative_path),
            relative_path,
        }
    }

    /// File name used in progress messages
    pub fn display_name(&self) -> String {
        self.input_path
            .file_name()
            .unwrap_or(self.relative_path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

/// Outcome of running one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure { message: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }
}

/// A job paired with its outcome, produced by exactly one worker
#[derive(Debug, Clone)]
pub struct JobResult {
    pub job: Job,
    pub outcome: JobOutcome,
}

/// One failed file in the terminal report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub path: PathBuf,
    pub message: String,
}

// =============================================================================
// Batch outcome
// =============================================================================

/// Terminal state of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every job succeeded
    Success { processed: usize },
    /// No eligible files in the source tree (informational, not an error)
    NothingToProcess,
    /// Every job ran, some failed
    PartialFailure {
        processed: usize,
        failures: Vec<JobFailure>,
    },
    /// The batch could not run or was aborted by a plumbing error
    Fatal { error: String },
}

impl BatchOutcome {
    /// True for `Success` and `NothingToProcess`
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Success { .. } | BatchOutcome::NothingToProcess)
    }

    pub fn failures(&self) -> &[JobFailure] {
        match self {
            BatchOutcome::PartialFailure { failures, .. } => failures,
            _ => &[],
        }
    }

    /// Stable machine-readable name, used in the JSON report
    pub fn kind(&self) -> &'static str {
        match self {
            BatchOutcome::Success { .. } => "success",
            BatchOutcome::NothingToProcess => "nothing_to_process",
            BatchOutcome::PartialFailure { .. } => "partial_failure",
            BatchOutcome::Fatal { .. } => "fatal",
        }
    }

    /// Human-readable terminal report. Every failed file is listed with its diagnostic.
    pub fn report_text(&self) -> String {
        match self {
            BatchOutcome::Success { processed } => {
                format!("Processing complete: {} files", processed)
            }
            BatchOutcome::NothingToProcess => "No audio files found".to_string(),
            BatchOutcome::PartialFailure { processed, failures } => {
                let mut text = format!(
                    "Completed with {} errors ({} of {} files failed):",
                    failures.len(),
                    failures.len(),
                    processed
                );
                for failure in failures {
                    text.push_str(&format!("\n\n{}: {}", failure.path.display(), failure.message));
                }
                text
            }
            BatchOutcome::Fatal { error } => format!("Fatal error: {}", error),
        }
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio (and muxed audio/video) containers accepted as input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Ogg,
    Flac,
    M4a,
    Aac,
}

impl AudioFormat {
    /// Detect format from file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "ogg" => Some(AudioFormat::Ogg),
            "flac" => Some(AudioFormat::Flac),
            "m4a" => Some(AudioFormat::M4a),
            "aac" => Some(AudioFormat::Aac),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
