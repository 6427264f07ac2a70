//! Time utilities for the race simulation

use std::time::{Duration, Instant};

/// Tick rate defaults
pub const DEFAULT_TICK_RATE: u32 = 30; // 30 ticks per second
pub const DEFAULT_SNAPSHOT_RATE: u32 = 10; // 10 snapshots per second
/// Highest rate that still feeds the race a non-zero tick
pub const MAX_TICK_RATE: u32 = 1_000;

/// Wall-clock length of one tick
pub fn tick_duration(ticks_per_second: u32) -> Duration {
    Duration::from_micros(1_000_000 / ticks_per_second.max(1) as u64)
}

/// Simulated milliseconds fed to the race per tick
pub fn tick_millis(ticks_per_second: u32) -> u32 {
    1_000 / ticks_per_second.max(1)
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
