//! JSON batch report

use crate::error::{Result, SpeedshiftError};
use crate::types::{BatchOutcome, BatchRequest, JobFailure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON report structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Schema version for forward compatibility
    pub version: String,
    /// speedshift version that generated this file
    pub generator_version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source: String,
    pub destination: String,
    pub speed: f64,
    /// ffmpeg audio filter expression, null for stream copy
    pub filter: Option<String>,
    /// success | nothing_to_process | partial_failure | fatal
    pub outcome: String,
    pub total: usize,
    pub succeeded: usize,
    #[serde(default)]
    pub failures: Vec<JobFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal_error: Option<String>,
}

impl BatchReport {
    pub fn new(
        request: &BatchRequest,
        filter: Option<String>,
        outcome: &BatchOutcome,
        started_at: DateTime<Utc>,
    ) -> Self {
        let (total, succeeded) = match outcome {
            BatchOutcome::Success { processed } => (*processed, *processed),
            BatchOutcome::PartialFailure { processed, failures } => {
                (*processed, processed.saturating_sub(failures.len()))
            }
            BatchOutcome::NothingToProcess | BatchOutcome::Fatal { .. } => (0, 0),
        };

        Self {
            version: SCHEMA_VERSION.to_string(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            started_at,
            finished_at: Utc::now(),
            source: request.source_dir.to_string_lossy().to_string(),
            destination: request.dest_dir.to_string_lossy().to_string(),
            speed: request.speed,
            filter,
            outcome: outcome.kind().to_string(),
            total,
            succeeded,
            failures: outcome.failures().to_vec(),
            fatal_error: match outcome {
                BatchOutcome::Fatal { error } => Some(error.clone()),
                _ => None,
            },
        }
    }
}

/// Write the report to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
pub fn write_report(report: &BatchReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SpeedshiftError::output_error(parent, e))?;
        }
    }

    // Same directory keeps the rename on one filesystem
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| SpeedshiftError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    serde_json::to_writer_pretty(BufWriter::new(file), report).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        SpeedshiftError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        SpeedshiftError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote batch report to {}", output_path.display());

    Ok(())
}

/// Read a report previously written by [`write_report`]
pub fn read_report(path: &Path) -> Result<BatchReport> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        SpeedshiftError::invalid(format!("malformed report {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn request() -> BatchRequest {
        BatchRequest::new("/music", "/music_fast", 2.0)
    }

    #[test]
    fn test_partial_failure_report_counts() {
        let outcome = BatchOutcome::PartialFailure {
            processed: 5,
            failures: vec![JobFailure {
                path: PathBuf::from("sub/b.wav"),
                message: "Error processing /music/sub/b.wav:\ntruncated".into(),
            }],
        };
        let report = BatchReport::new(
            &request(),
            Some("atempo=2.0000".into()),
            &outcome,
            Utc::now(),
        );
        assert_eq!(report.outcome, "partial_failure");
        assert_eq!(report.total, 5);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failures.len(), 1);
        assert!(report.fatal_error.is_none());
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn test_write_then_read_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/run.json");
        let outcome = BatchOutcome::Fatal {
            error: "Invalid parameter: speed factor must be a positive number, got 0".into(),
        };
        let report = BatchReport::new(&request(), None, &outcome, Utc::now());

        write_report(&report, &path).unwrap();
        assert!(path.is_file());
        assert!(!path.with_extension("json.tmp").exists());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["outcome"], "fatal");
        assert!(raw["filter"].is_null());
        assert_eq!(raw["version"], SCHEMA_VERSION);

        let back = read_report(&path).unwrap();
        assert_eq!(back.outcome, "fatal");
        assert_eq!(back.fatal_error, report.fatal_error);
        assert_eq!(back.speed, 2.0);
    }

    #[test]
    fn test_read_malformed_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(read_report(&path).is_err());
    }
}
