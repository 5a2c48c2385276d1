//! CLI argument parsing and configuration

use crate::filter::DEFAULT_MAX_SLOWDOWN_STAGES;
use crate::transcode::ffmpeg::DEFAULT_FFMPEG;
use clap::Parser;
use std::path::PathBuf;

/// speedshift - batch audio speed changer
///
/// Rescales the playback speed of every audio file under a directory tree
/// with ffmpeg's atempo filter, mirroring the tree under a destination.
#[derive(Parser, Debug)]
#[command(name = "speedshift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Source directory (scanned recursively)
    #[arg(short, long, value_name = "DIR")]
    pub input: PathBuf,

    /// Destination directory (defaults to Speedy_<input name> next to the input)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Speed multiplier (2.0 = twice as fast, 0.5 = half speed)
    #[arg(short, long, value_name = "FACTOR", default_value_t = 2.0)]
    pub speed: f64,

    /// Number of concurrent ffmpeg processes (defaults to CPU count)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Path to the ffmpeg executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_FFMPEG)]
    pub ffmpeg: PathBuf,

    /// Maximum number of 0.5x stages when slowing down
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_SLOWDOWN_STAGES)]
    pub max_slowdown_stages: usize,

    /// Write a JSON batch report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bar)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - show planned jobs without running ffmpeg
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
