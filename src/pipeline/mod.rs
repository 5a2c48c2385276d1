//! Batch pipeline: coordination, progress and observation

pub mod observer;
pub mod orchestrator;
pub mod progress;

pub use observer::{BatchObserver, CollectingObserver, ConsoleObserver, NullObserver, ObserverEvent};
pub use orchestrator::{plan, run, BatchPhase, BatchPlan, Coordinator};
pub use progress::{ProgressReporter, ProgressUpdate};
