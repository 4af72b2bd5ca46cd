#![warn(clippy::all, clippy::pedantic)]

use std::thread;
use std::time::{Duration, Instant};

/// Fixed-rate clock. `tick` blocks until the current frame's budget has
/// elapsed, then reports how long the frame actually took.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    last_tick: Instant,
}

impl FrameClock {
    #[must_use]
    pub fn new(ticks_per_second: u32) -> Self {
        assert!(ticks_per_second > 0, "clock rate must be positive");
        Self {
            period: Duration::from_secs(1) / ticks_per_second,
            last_tick: Instant::now(),
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        (self.last_tick + self.period).saturating_duration_since(Instant::now())
    }

    pub fn tick(&mut self) -> Duration {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }

        let now = Instant::now();
        let delta = now.duration_since(self.last_tick);
        self.last_tick = now;
        delta
    }
}
