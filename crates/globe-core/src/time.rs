//! Fixed-rate simulation clock
//!
//! The server advances in discrete ticks. Real elapsed time is accumulated and
//! converted into a whole number of ticks per frame, the same way a fixed
//! physics timestep is driven.

use serde::{Deserialize, Serialize};

/// Configuration for the tick clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickConfig {
    /// Simulation ticks per real second
    pub ticks_per_second: u32,
    /// Maximum real delta accepted per update, prevents a spiral of death
    pub max_delta_time: f32,
    /// Upper bound on ticks run from a single update
    pub max_catch_up_ticks: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20,
            max_delta_time: 0.25,
            max_catch_up_ticks: 10,
        }
    }
}

impl TickConfig {
    /// Length of one tick in seconds
    pub fn tick_length(&self) -> f32 {
        1.0 / self.ticks_per_second.max(1) as f32
    }
}

/// Tick tracking
#[derive(Debug, Clone)]
pub struct TickClock {
    /// Configuration
    pub config: TickConfig,
    /// Ticks completed since start
    pub tick_count: u64,
    accumulator: f32,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(TickConfig::default())
    }
}

impl TickClock {
    pub fn new(config: TickConfig) -> Self {
        Self {
            config,
            tick_count: 0,
            accumulator: 0.0,
        }
    }

    /// Feed the real delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        let delta = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.accumulator += delta;
    }

    /// Drain the accumulator and return how many ticks are due this frame.
    ///
    /// Each returned tick is already counted in `tick_count`.
    pub fn due_ticks(&mut self) -> u32 {
        let step = self.config.tick_length();
        let mut ticks = 0;
        while self.accumulator >= step && ticks < self.config.max_catch_up_ticks {
            self.accumulator -= step;
            ticks += 1;
        }
        // Anything still owed past the catch-up cap is dropped
        if ticks == self.config.max_catch_up_ticks {
            self.accumulator = self.accumulator.min(step);
        }
        self.tick_count += ticks as u64;
        ticks
    }

    /// Advance exactly one tick, ignoring real time (headless fast mode)
    pub fn step(&mut self) {
        self.tick_count += 1;
    }

    /// Whether the current tick is a multiple of `interval`
    pub fn every(&self, interval: u64) -> bool {
        interval != 0 && self.tick_count % interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_ticks_accumulates() {
        let mut clock = TickClock::default();
        clock.update(0.03);
        assert_eq!(clock.due_ticks(), 0);
        clock.update(0.03);
        assert_eq!(clock.due_ticks(), 1);
        assert_eq!(clock.tick_count, 1);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut clock = TickClock::new(TickConfig {
            ticks_per_second: 100,
            max_delta_time: 10.0,
            max_catch_up_ticks: 5,
        });
        clock.update(1.0);
        assert_eq!(clock.due_ticks(), 5);
        assert!(clock.due_ticks() <= 1);
    }

    #[test]
    fn test_every() {
        let mut clock = TickClock::default();
        for _ in 0..40 {
            clock.step();
        }
        assert!(clock.every(20));
        assert!(!clock.every(0));
    }
}
