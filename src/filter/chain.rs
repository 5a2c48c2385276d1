//! Speed factor to `atempo` chain decomposition
//!
//! ffmpeg's `atempo` filter only accepts ratios in [0.5, 2.0] per instance, so an
//! arbitrary speed multiplier is expressed as a chain of stages whose product is
//! the requested factor. Speed-ups use full 2.0 stages plus a residual; slow-downs
//! use 0.5 stages plus a residual, capped at a bounded number of 0.5 stages.

use crate::error::{Result, SpeedshiftError};
use std::fmt;
use tracing::{debug, warn};

/// Smallest ratio a single stage accepts
pub const MIN_STAGE_RATIO: f64 = 0.5;

/// Largest ratio a single stage accepts
pub const MAX_STAGE_RATIO: f64 = 2.0;

/// Default number of 0.5 stages emitted before the residual on the slow-down branch
pub const DEFAULT_MAX_SLOWDOWN_STAGES: usize = 5;

/// Speeds outside this range are accepted but logged as suspicious
const SANE_SPEED_RANGE: (f64, f64) = (0.1, 100.0);

/// One primitive tempo adjustment, `ratio` in [0.5, 2.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStage {
    ratio: f64,
}

impl FilterStage {
    fn new(ratio: f64) -> Self {
        debug_assert!((MIN_STAGE_RATIO..=MAX_STAGE_RATIO).contains(&ratio));
        Self { ratio }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "atempo={:.4}", self.ratio)
    }
}

/// Ordered stages composing to the requested speed. Empty means passthrough.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
}

impl FilterChain {
    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when no filter is needed (speed == 1.0)
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Combined ratio of every stage
    pub fn product(&self) -> f64 {
        self.stages.iter().map(FilterStage::ratio).product()
    }

    /// Comma-joined ffmpeg audio filter expression, `None` for passthrough
    pub fn to_filter_expression(&self) -> Option<String> {
        if self.stages.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.stages.iter().map(ToString::to_string).collect();
        Some(parts.join(","))
    }
}

/// Build the chain for `speed` with the default slow-down cap
pub fn build_chain(speed: f64) -> Result<FilterChain> {
    build_chain_with_cap(speed, DEFAULT_MAX_SLOWDOWN_STAGES)
}

/// Build the chain for `speed`, emitting at most `max_slowdown_stages` 0.5 stages
/// before the residual when slowing down.
///
/// Factors below `0.5^(max_slowdown_stages + 1)` cannot be reached; the residual is
/// clamped to 0.5 and the chain's product is the closest achievable slow-down
/// (always >= the requested speed).
pub fn build_chain_with_cap(speed: f64, max_slowdown_stages: usize) -> Result<FilterChain> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(SpeedshiftError::invalid(format!(
            "speed factor must be a positive number, got {}",
            speed
        )));
    }

    if speed < SANE_SPEED_RANGE.0 || speed > SANE_SPEED_RANGE.1 {
        warn!(
            "Speed factor {} is far from 1.0; output may be unusable",
            speed
        );
    }

    let mut stages = Vec::new();

    if speed == 1.0 {
        // passthrough
    } else if (MIN_STAGE_RATIO..=MAX_STAGE_RATIO).contains(&speed) {
        stages.push(FilterStage::new(speed));
    } else if speed > MAX_STAGE_RATIO {
        let mut remaining = speed;
        while remaining > MAX_STAGE_RATIO {
            stages.push(FilterStage::new(MAX_STAGE_RATIO));
            remaining /= MAX_STAGE_RATIO;
        }
        push_residual(&mut stages, remaining);
    } else {
        let mut remaining = speed;
        let mut emitted = 0;
        while remaining < MIN_STAGE_RATIO && emitted < max_slowdown_stages {
            stages.push(FilterStage::new(MIN_STAGE_RATIO));
            remaining /= MIN_STAGE_RATIO;
            emitted += 1;
        }
        if remaining < MIN_STAGE_RATIO {
            warn!(
                "Speed factor {} is below the reachable minimum of {}; clamping",
                speed,
                MIN_STAGE_RATIO.powi(emitted as i32 + 1)
            );
            remaining = MIN_STAGE_RATIO;
        }
        push_residual(&mut stages, remaining);
    }

    let chain = FilterChain { stages };
    debug!(
        "Speed {} -> {} stage(s): {}",
        speed,
        chain.len(),
        chain.to_filter_expression().as_deref().unwrap_or("copy")
    );
    Ok(chain)
}

/// Append the residual stage unless it is a no-op at 4 decimal places
fn push_residual(stages: &mut Vec<FilterStage>, remaining: f64) {
    if rounds_to_one(remaining) {
        return;
    }
    stages.push(FilterStage::new(remaining.clamp(MIN_STAGE_RATIO, MAX_STAGE_RATIO)));
}

fn rounds_to_one(ratio: f64) -> bool {
    (ratio * 10_000.0).round() == 10_000.0
}
