//! Batch orchestration
//!
//! Validates the request, collects jobs, fans them out to a bounded worker pool
//! and drains results through a single consumer. All batch state (completion
//! count, failure list) is owned by the coordinating thread; workers only send
//! `JobResult`s down a channel.

use super::observer::BatchObserver;
use super::progress::{ProgressReporter, ProgressUpdate};
use crate::config::Settings;
use crate::discovery;
use crate::error::{Result, SpeedshiftError};
use crate::filter::{build_chain_with_cap, FilterChain, DEFAULT_MAX_SLOWDOWN_STAGES};
use crate::transcode::{run_job, FfmpegTranscoder, Transcoder};
use crate::types::{BatchOutcome, BatchRequest, Job, JobFailure, JobOutcome, JobResult};
use crossbeam_channel::unbounded;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Coordinator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Collecting,
    Dispatched,
    Draining,
    Terminal,
}

/// Validated request with its filter chain and collected jobs
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub request: BatchRequest,
    pub chain: FilterChain,
    pub jobs: Vec<Job>,
}

/// Validate `request`, build its chain and collect jobs. Touches nothing on disk.
pub fn plan(request: &BatchRequest, max_slowdown_stages: usize) -> Result<BatchPlan> {
    let chain = build_chain_with_cap(request.speed, max_slowdown_stages)?;
    validate_directories(request)?;
    let jobs = discovery::scan(&request.source_dir, &request.dest_dir)?;

    Ok(BatchPlan {
        request: request.clone(),
        chain,
        jobs,
    })
}

fn validate_directories(request: &BatchRequest) -> Result<()> {
    let source = &request.source_dir;
    let dest = &request.dest_dir;

    if source.as_os_str().is_empty() || !source.is_dir() {
        return Err(SpeedshiftError::invalid(format!(
            "source directory not found: '{}'",
            source.display()
        )));
    }
    if dest.as_os_str().is_empty() {
        return Err(SpeedshiftError::invalid("destination directory is empty"));
    }
    if dest.exists() && !dest.is_dir() {
        return Err(SpeedshiftError::invalid(format!(
            "destination is not a directory: '{}'",
            dest.display()
        )));
    }
    if let (Ok(s), Ok(d)) = (source.canonicalize(), dest.canonicalize()) {
        if s == d {
            return Err(SpeedshiftError::invalid(
                "destination must differ from the source directory",
            ));
        }
    }
    Ok(())
}

/// Per-run state, mutated only by the coordinating thread
struct BatchState {
    progress: ProgressReporter,
    failures: Vec<JobFailure>,
}

impl BatchState {
    fn new(total: usize) -> Self {
        Self {
            progress: ProgressReporter::new(total),
            failures: Vec::new(),
        }
    }

    fn consume(&mut self, result: JobResult) -> ProgressUpdate {
        match result.outcome {
            JobOutcome::Success => {
                debug!("Done: {}", result.job.relative_path.display());
            }
            JobOutcome::Failure { message } => {
                warn!("Failed {}: {}", result.job.relative_path.display(), message);
                self.failures.push(JobFailure {
                    path: result.job.relative_path.clone(),
                    message,
                });
            }
        }
        self.progress.record(&result.job.display_name())
    }

    fn into_outcome(mut self) -> BatchOutcome {
        let processed = self.progress.total();
        if self.failures.is_empty() {
            return BatchOutcome::Success { processed };
        }
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
        BatchOutcome::PartialFailure {
            processed,
            failures: self.failures,
        }
    }
}

/// Drives one batch at a time over a pool of transcoder workers
pub struct Coordinator {
    transcoder: Arc<dyn Transcoder>,
    workers: usize,
    max_slowdown_stages: usize,
    phase: BatchPhase,
    filter_expression: Option<String>,
}

impl Coordinator {
    /// Coordinator with one worker per CPU
    pub fn new(transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            transcoder,
            workers: num_cpus::get().max(1),
            max_slowdown_stages: DEFAULT_MAX_SLOWDOWN_STAGES,
            phase: BatchPhase::Idle,
            filter_expression: None,
        }
    }

    pub fn from_settings(settings: &Settings, transcoder: Arc<dyn Transcoder>) -> Self {
        Self::new(transcoder)
            .with_workers(settings.workers)
            .with_max_slowdown_stages(settings.max_slowdown_stages)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_max_slowdown_stages(mut self, stages: usize) -> Self {
        self.max_slowdown_stages = stages;
        self
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Filter expression of the last planned batch, `None` for stream copy or
    /// when the request was rejected
    pub fn filter_expression(&self) -> Option<&str> {
        self.filter_expression.as_deref()
    }

    /// Run one batch to its terminal outcome.
    ///
    /// Per-job failures are collected into `PartialFailure`; only request and
    /// plumbing errors produce `Fatal`. The observer sees `on_terminal` exactly once.
    pub fn run(&mut self, request: &BatchRequest, observer: &mut dyn BatchObserver) -> BatchOutcome {
        if self.phase != BatchPhase::Idle {
            debug!("Previous batch not acknowledged, resetting");
            self.acknowledge(observer);
        }

        let start = Instant::now();
        self.filter_expression = None;

        let outcome = match self.execute(request, observer) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Batch aborted: {}", e);
                BatchOutcome::Fatal {
                    error: e.to_string(),
                }
            }
        };

        self.transition(BatchPhase::Terminal);
        info!(
            "Batch finished ({}) in {:.2}s",
            outcome.kind(),
            start.elapsed().as_secs_f64()
        );

        observer.on_status(&terminal_status(&outcome));
        observer.on_terminal(&outcome);
        outcome
    }

    /// Leave the terminal state and reset the observer's indicators
    pub fn acknowledge(&mut self, observer: &mut dyn BatchObserver) {
        self.transition(BatchPhase::Idle);
        observer.on_progress(0.0, "");
        observer.on_status("Ready");
    }

    fn execute(
        &mut self,
        request: &BatchRequest,
        observer: &mut dyn BatchObserver,
    ) -> Result<BatchOutcome> {
        self.transition(BatchPhase::Collecting);
        observer.on_status("Preparing...");

        let plan = plan(request, self.max_slowdown_stages)?;
        self.filter_expression = plan.chain.to_filter_expression();
        if plan.jobs.is_empty() {
            info!("Nothing to process in {}", request.source_dir.display());
            return Ok(BatchOutcome::NothingToProcess);
        }

        std::fs::create_dir_all(&request.dest_dir)
            .map_err(|e| SpeedshiftError::output_error(&request.dest_dir, e))?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("speedshift-worker-{}", i))
            .panic_handler(|panic| {
                let msg = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                error!("Worker panicked: {}", msg);
            })
            .build()
            .map_err(|e| SpeedshiftError::WorkerPool(format!("failed to start workers: {}", e)))?;

        let total = plan.jobs.len();
        let chain = Arc::new(plan.chain);
        let (result_tx, result_rx) = unbounded::<JobResult>();

        for job in plan.jobs {
            let tx = result_tx.clone();
            let transcoder = Arc::clone(&self.transcoder);
            let chain = Arc::clone(&chain);
            pool.spawn(move || {
                let result = run_job(transcoder.as_ref(), job, &chain);
                // receiver only disappears when the batch has already been abandoned
                let _ = tx.send(result);
            });
        }
        // Only workers hold senders now, so a disconnect means some job never reported
        drop(result_tx);

        self.transition(BatchPhase::Dispatched);
        info!(
            "Dispatched {} jobs to {} workers ({})",
            total,
            self.workers,
            chain.to_filter_expression().as_deref().unwrap_or("stream copy")
        );

        let mut state = BatchState::new(total);
        while !state.progress.is_complete() {
            let result = result_rx.recv().map_err(|_| {
                SpeedshiftError::WorkerPool(format!(
                    "workers stopped after {} of {} results",
                    state.progress.completed(),
                    total
                ))
            })?;
            if self.phase == BatchPhase::Dispatched {
                self.transition(BatchPhase::Draining);
            }

            let update = state.consume(result);
            observer.on_progress(update.percent, &update.current_file);
            observer.on_status(&update.status);
        }

        Ok(state.into_outcome())
    }

    fn transition(&mut self, next: BatchPhase) {
        debug!("Batch phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

fn terminal_status(outcome: &BatchOutcome) -> String {
    match outcome {
        BatchOutcome::Success { .. } => "Processing complete".to_string(),
        BatchOutcome::NothingToProcess => "No audio files found".to_string(),
        BatchOutcome::PartialFailure { failures, .. } => {
            format!("Completed with {} errors", failures.len())
        }
        BatchOutcome::Fatal { error } => format!("Fatal error: {}", error),
    }
}

/// Run a batch described by `settings` with the ffmpeg backend
pub fn run(settings: &Settings, observer: &mut dyn BatchObserver) -> BatchOutcome {
    let transcoder: Arc<dyn Transcoder> = Arc::new(FfmpegTranscoder::new(&settings.ffmpeg));
    let mut coordinator = Coordinator::from_settings(settings, transcoder);
    coordinator.run(&settings.request(), observer)
}
