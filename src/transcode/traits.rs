//! Transcoder trait abstraction

use crate::error::{Result, SpeedshiftError};
use crate::filter::FilterChain;
use crate::types::{Job, JobOutcome, JobResult};
use tracing::{debug, warn};

/// Backend that speed-transforms one input file into one output file
pub trait Transcoder: Send + Sync {
    /// Write `job.output_path` from `job.input_path` with `chain` applied.
    ///
    /// An empty chain means stream copy. The output directory already exists
    /// when this is called.
    fn transcode(&self, job: &Job, chain: &FilterChain) -> Result<()>;

    /// Get the name of this transcoder (for logging)
    fn name(&self) -> &'static str;
}

/// Run one job to completion, turning every error into a failed outcome.
///
/// Creates the output directory first. Never panics on job-level errors; the
/// caller always gets exactly one `JobResult` back.
pub fn run_job(transcoder: &dyn Transcoder, job: Job, chain: &FilterChain) -> JobResult {
    debug!("Transcoding {} with {}", job.relative_path.display(), transcoder.name());

    let result = ensure_output_dir(&job).and_then(|()| transcoder.transcode(&job, chain));

    let outcome = match result {
        Ok(()) => JobOutcome::Success,
        Err(e) => {
            if !e.is_recoverable() {
                warn!("Unexpected error for {}: {}", job.relative_path.display(), e);
            }
            JobOutcome::Failure {
                message: e.to_string(),
            }
        }
    };

    JobResult { job, outcome }
}

fn ensure_output_dir(job: &Job) -> Result<()> {
    match job.output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| SpeedshiftError::output_error(parent, e)),
        _ => Ok(()),
    }
}
