//! speedshift - Batch Audio Speed Changer
//!
//! Rescales the playback speed of every audio (or muxed audio/video) file
//! under a source tree with ffmpeg, mirroring the tree under a destination
//! and reporting per-file and aggregate progress. Individual file failures
//! are collected and reported without aborting the batch.
//!
//! # Architecture
//!
//! - `filter`: speed factor to bounded `atempo` chain decomposition
//! - `discovery`: recursive scan of the source tree into jobs
//! - `transcode`: per-file ffmpeg invocation (swappable backend)
//! - `pipeline`: worker pool, result aggregation, progress and observers
//! - `export`: JSON batch report
//! - `config`: CLI argument parsing and runtime settings
//!
//! # Example
//!
//! ```no_run
//! use speedshift::{config::Settings, pipeline};
//!
//! let settings = Settings::default();
//! let outcome = pipeline::run(&settings, &mut pipeline::NullObserver);
//! println!("{}", outcome.report_text());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod transcode;
pub mod types;

// Re-export key types at crate root
pub use error::{Result, SpeedshiftError};
pub use types::{BatchOutcome, BatchRequest, Job, JobFailure, JobOutcome, JobResult};
