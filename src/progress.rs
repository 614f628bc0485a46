//! Simulated progress reporting
//!
//! The external capability exposes no progress signal, so the controller
//! drives a cosmetic indicator instead: a value that rises toward an
//! asymptotic ceiling on each tick while a request is in flight, and is
//! forced to exactly 100 on success. It measures elapsed waiting, not model
//! progress, and must not be read as the latter.

use instant::Duration;
use tracing::{debug, info, warn};

/// Monotonically non-decreasing simulated progress value
///
/// Each tick halves the remaining distance to the ceiling, so the value
/// approaches but never reaches the ceiling on its own. Only
/// [`SimulatedProgress::complete`] produces 100.
#[derive(Debug, Clone)]
pub struct SimulatedProgress {
    value: f32,
    ceiling: f32,
}

impl SimulatedProgress {
    /// Create a simulator that climbs toward `ceiling` percent
    #[must_use]
    pub fn new(ceiling: f32) -> Self {
        Self {
            value: 0.0,
            ceiling,
        }
    }

    /// Advance one tick and return the new percentage
    pub fn tick(&mut self) -> u8 {
        self.value += (self.ceiling - self.value) * 0.5;
        self.percent()
    }

    /// Force completion to exactly 100
    pub fn complete(&mut self) -> u8 {
        self.value = 100.0;
        100
    }

    /// Reset to zero for the next submission
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Current value as a whole percentage
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.value.floor().clamp(0.0, 100.0) as u8
    }
}

impl Default for SimulatedProgress {
    fn default() -> Self {
        Self::new(90.0)
    }
}

/// Trait for observing pipeline progress
///
/// Frontends implement this to surface loading state however they like; the
/// controller guarantees `on_error` is invoked at most once per submission.
pub trait ProgressReporter: Send + Sync {
    /// Called when processing of a submission starts
    fn on_started(&self, source_name: &str);

    /// Called on each simulated progress advance (0-100)
    fn on_progress(&self, percent: u8);

    /// Called when processing completes successfully
    fn on_completed(&self, elapsed: Duration);

    /// Called when processing fails
    fn on_error(&self, error: &str);
}

/// No-operation progress reporter that does nothing
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn on_started(&self, _source_name: &str) {}
    fn on_progress(&self, _percent: u8) {}
    fn on_completed(&self, _elapsed: Duration) {}
    fn on_error(&self, _error: &str) {}
}

/// Reporter that forwards progress to the `tracing` subscriber
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn on_started(&self, source_name: &str) {
        info!(source = %source_name, "background removal started");
    }

    fn on_progress(&self, percent: u8) {
        debug!(percent, "processing");
    }

    fn on_completed(&self, elapsed: Duration) {
        info!(elapsed_ms = elapsed.as_millis() as u64, "background removal completed");
    }

    fn on_error(&self, error: &str) {
        warn!(%error, "background removal failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotone_and_bounded() {
        let mut progress = SimulatedProgress::new(90.0);
        let mut previous = progress.percent();
        for _ in 0..50 {
            let current = progress.tick();
            assert!(current >= previous, "progress regressed: {previous} -> {current}");
            assert!(current < 100, "simulated ticks must never reach 100");
            previous = current;
        }
        // Asymptotic: after many ticks the value sits just under the ceiling
        assert!(previous >= 89);
    }

    #[test]
    fn test_only_completion_reaches_100() {
        let mut progress = SimulatedProgress::default();
        for _ in 0..10 {
            progress.tick();
        }
        assert!(progress.percent() < 100);
        assert_eq!(progress.complete(), 100);
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut progress = SimulatedProgress::default();
        progress.tick();
        progress.complete();
        progress.reset();
        assert_eq!(progress.percent(), 0);
    }
}
