//! Interval accumulator used for the race start gate

use serde::{Deserialize, Serialize};

/// Accumulates elapsed milliseconds and reports how many whole intervals
/// have passed.
///
/// A single large `advance` reports every interval it covers, so callers
/// that fall behind still see each firing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodicTrigger {
    interval_ms: f32,
    accumulated_ms: f32,
}

impl PeriodicTrigger {
    pub fn new(interval_ms: f32) -> Self {
        Self {
            interval_ms,
            accumulated_ms: 0.0,
        }
    }

    /// Add elapsed time; returns the number of completed intervals.
    ///
    /// A non-positive interval never fires and does not accumulate.
    pub fn advance(&mut self, elapsed_ms: u32) -> u32 {
        if self.interval_ms <= 0.0 {
            return 0;
        }

        self.accumulated_ms += elapsed_ms as f32;

        let mut fired = 0;
        while self.accumulated_ms >= self.interval_ms {
            self.accumulated_ms -= self.interval_ms;
            fired += 1;
        }
        fired
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated_ms
    }

    pub fn interval(&self) -> f32 {
        self.interval_ms
    }

    pub fn set_interval(&mut self, interval_ms: f32) {
        self.interval_ms = interval_ms;
    }
}
