//! Completion counting and status text
//!
//! Percentages are derived only from the number of completed jobs, never from
//! which job finished, so they are non-decreasing under any completion order.

/// One progress notification for the observer
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    /// 0.0 - 100.0
    pub percent: f64,
    pub current_file: String,
    pub status: String,
}

/// Tracks completed jobs out of a fixed total
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    total: usize,
    completed: usize,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// Percentage of jobs completed. An empty batch counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 * 100.0 / self.total as f64
    }

    /// Record one finished job. Saturates at `total`.
    pub fn record(&mut self, current_file: &str) -> ProgressUpdate {
        if self.completed < self.total {
            self.completed += 1;
        }
        ProgressUpdate {
            completed: self.completed,
            total: self.total,
            percent: self.percent(),
            current_file: current_file.to_string(),
            status: format!(
                "Processing {}/{}: {}",
                self.completed, self.total, current_file
            ),
        }
    }
}
