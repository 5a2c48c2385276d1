//! Runtime configuration settings

use crate::discovery::default_output_dir;
use crate::filter::DEFAULT_MAX_SLOWDOWN_STAGES;
use crate::transcode::ffmpeg::DEFAULT_FFMPEG;
use crate::types::BatchRequest;
use std::path::PathBuf;

/// Runtime settings for a batch run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Source directory
    pub input: PathBuf,
    /// Destination directory
    pub output: PathBuf,
    /// Speed multiplier
    pub speed: f64,
    /// Number of concurrent ffmpeg processes
    pub workers: usize,
    /// ffmpeg executable
    pub ffmpeg: PathBuf,
    /// Cap on 0.5x stages for slow-downs
    pub max_slowdown_stages: usize,
    /// Optional JSON report path
    pub report: Option<PathBuf>,
    /// Show progress bar
    pub show_progress: bool,
    /// Dry run mode - plan jobs without running ffmpeg
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_dir(&cli.input));

        Self {
            input: cli.input.clone(),
            output,
            speed: cli.speed,
            workers: cli.jobs.unwrap_or_else(num_cpus::get).max(1),
            ffmpeg: cli.ffmpeg.clone(),
            max_slowdown_stages: cli.max_slowdown_stages,
            report: cli.report.clone(),
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }

    /// The batch this configuration describes
    pub fn request(&self) -> BatchRequest {
        BatchRequest::new(&self.input, &self.output, self.speed)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: default_output_dir(&PathBuf::from(".")),
            speed: 2.0,
            workers: num_cpus::get().max(1),
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            max_slowdown_stages: DEFAULT_MAX_SLOWDOWN_STAGES,
            report: None,
            show_progress: true,
            dry_run: false,
        }
    }
}
