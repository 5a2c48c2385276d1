//! speedshift CLI entry point

use chrono::Utc;
use clap::Parser;
use speedshift::config::{Cli, Settings};
use speedshift::export::{self, BatchReport};
use speedshift::pipeline::{self, BatchPlan, ConsoleObserver, Coordinator};
use speedshift::transcode::{FfmpegTranscoder, Transcoder};
use speedshift::BatchOutcome;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    let settings = Settings::from_cli(&cli);

    if settings.dry_run {
        return match pipeline::plan(&settings.request(), settings.max_slowdown_stages) {
            Ok(plan) => {
                print_dry_run(&plan);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let started_at = Utc::now();
    let mut observer = ConsoleObserver::new(settings.show_progress);
    let transcoder: Arc<dyn Transcoder> = Arc::new(FfmpegTranscoder::new(&settings.ffmpeg));
    let mut coordinator = Coordinator::from_settings(&settings, transcoder);
    let outcome = coordinator.run(&settings.request(), &mut observer);

    if let Some(report_path) = &settings.report {
        let filter = coordinator.filter_expression().map(str::to_string);
        let report = BatchReport::new(&settings.request(), filter, &outcome, started_at);
        if let Err(e) = export::write_report(&report, report_path) {
            eprintln!("Error: {}", e);
        }
    }

    // The observer has already printed the outcome; only counts are added here
    match &outcome {
        BatchOutcome::Success { processed } => {
            println!();
            println!(
                "Summary: {} files written to {}",
                processed,
                settings.output.display()
            );
            ExitCode::SUCCESS
        }
        BatchOutcome::NothingToProcess => ExitCode::SUCCESS,
        BatchOutcome::PartialFailure { processed, failures } => {
            println!();
            println!(
                "Summary: {} successful, {} failed (of {} total)",
                processed - failures.len(),
                failures.len(),
                processed
            );
            ExitCode::from(1)
        }
        BatchOutcome::Fatal { .. } => ExitCode::FAILURE,
    }
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Show planned jobs without running ffmpeg
fn print_dry_run(plan: &BatchPlan) {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();
    println!(
        "Filter: {}",
        plan.chain
            .to_filter_expression()
            .unwrap_or_else(|| "none (stream copy)".to_string())
    );
    println!();

    for job in &plan.jobs {
        println!("  {}", job.relative_path.display());
        println!("    -> {}", job.output_path.display());
    }

    println!();
    println!("─────────────────────────────────────────");
    println!(
        "Would process {} files into {}",
        plan.jobs.len(),
        plan.request.dest_dir.display()
    );
    println!();
}
