use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing of the fixed-step simulation loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Length of one simulation tick in milliseconds. Default 16.
    pub tick_rate_ms: u64,
    /// Largest frame backlog carried into the accumulator in milliseconds. Default 1000.
    pub max_accumulator_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            max_accumulator_ms: 1_000,
        }
    }
}

impl EngineConfig {
    /// Length of one simulation tick, never shorter than a millisecond.
    #[must_use]
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    /// Largest backlog the accumulator may hold.
    #[must_use]
    pub fn max_accumulator(&self) -> Duration {
        Duration::from_millis(self.max_accumulator_ms)
    }
}

/// Accumulates variable frame deltas into whole fixed-length ticks.
#[derive(Clone, Debug)]
pub struct FixedStep {
    tick: Duration,
    max_accumulator: Duration,
    accumulator: Duration,
}

impl FixedStep {
    /// Creates an empty accumulator for the provided engine timing.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tick: config.tick_rate(),
            max_accumulator: config.max_accumulator(),
            accumulator: Duration::ZERO,
        }
    }

    /// Length of one tick.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Adds a frame delta and returns how many whole ticks are now due.
    ///
    /// The backlog is clamped so a long stall does not trigger a burst of
    /// catch-up ticks.
    pub fn advance(&mut self, frame: Duration) -> u32 {
        self.accumulator = (self.accumulator + frame).min(self.max_accumulator);

        let mut steps = 0;
        while self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            steps += 1;
        }
        steps
    }
}
