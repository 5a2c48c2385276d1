//! Observer interface for batch progress
//!
//! The coordinator calls these methods from its own thread as results arrive.
//! Front-ends decide how to present them.

use crate::types::BatchOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Receives progress, status and the terminal outcome of a batch
pub trait BatchObserver {
    /// `percent` is in [0, 100] and never decreases within a batch
    fn on_progress(&mut self, percent: f64, current_file: &str);

    fn on_status(&mut self, text: &str);

    /// Called exactly once per batch
    fn on_terminal(&mut self, outcome: &BatchOutcome);
}

/// Observer that discards everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl BatchObserver for NullObserver {
    fn on_progress(&mut self, _percent: f64, _current_file: &str) {}

    fn on_status(&mut self, _text: &str) {}

    fn on_terminal(&mut self, _outcome: &BatchOutcome) {}
}

/// One recorded observer call
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Progress { percent: f64, current_file: String },
    Status(String),
    Terminal(BatchOutcome),
}

/// Observer that records every call, for embedding front-ends that poll
#[derive(Debug, Default)]
pub struct CollectingObserver {
    pub events: Vec<ObserverEvent>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reported percentages, in call order
    pub fn percents(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ObserverEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ObserverEvent::Status(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn terminals(&self) -> Vec<&BatchOutcome> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ObserverEvent::Terminal(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }
}

impl BatchObserver for CollectingObserver {
    fn on_progress(&mut self, percent: f64, current_file: &str) {
        self.events.push(ObserverEvent::Progress {
            percent,
            current_file: current_file.to_string(),
        });
    }

    fn on_status(&mut self, text: &str) {
        self.events.push(ObserverEvent::Status(text.to_string()));
    }

    fn on_terminal(&mut self, outcome: &BatchOutcome) {
        self.events.push(ObserverEvent::Terminal(outcome.clone()));
    }
}

/// Terminal front-end: progress bar on stderr plus the outcome report.
///
/// This is the only place the outcome text is printed. With the bar hidden
/// (quiet mode, no terminal) statuses go to the log and successful outcomes
/// to stdout instead.
pub struct ConsoleObserver {
    bar: ProgressBar,
}

impl ConsoleObserver {
    pub fn new(show_progress: bool) -> Self {
        let bar = if show_progress {
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    /// True when nothing is drawn, so text has to be printed directly
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

impl BatchObserver for ConsoleObserver {
    fn on_progress(&mut self, percent: f64, _current_file: &str) {
        self.bar.set_position(percent.clamp(0.0, 100.0).round() as u64);
    }

    fn on_status(&mut self, text: &str) {
        if self.bar.is_hidden() {
            info!("{}", text);
        }
        self.bar.set_message(text.to_string());
    }

    fn on_terminal(&mut self, outcome: &BatchOutcome) {
        match outcome {
            BatchOutcome::Success { .. } | BatchOutcome::NothingToProcess => {
                if self.bar.is_hidden() {
                    println!("{}", outcome.report_text());
                }
                self.bar.finish_with_message(outcome.report_text());
            }
            BatchOutcome::PartialFailure { .. } | BatchOutcome::Fatal { .. } => {
                self.bar.abandon();
                eprintln!();
                eprintln!("{}", outcome.report_text());
            }
        }
    }
}
