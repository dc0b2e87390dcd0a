//! Fixed-rate tick driver.
//!
//! Ticks are paced by a tokio interval. When the loop falls behind, missed
//! ticks are skipped rather than replayed in a burst, so the simulation never
//! runs faster than the configured rate.

use std::time::{Duration, Instant};
use tokio::time::{interval, Interval, MissedTickBehavior};

pub struct TickScheduler {
    interval: Interval,
    period: Duration,
    last_tick: Instant,
    ticks: u64,
}

impl TickScheduler {
    pub fn new(tick_rate: u32) -> Self {
        let period = Self::period_for(tick_rate);
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            interval,
            period,
            last_tick: Instant::now(),
            ticks: 0,
        }
    }

    /// Tick period for a rate in Hz. A rate of zero is treated as one.
    pub fn period_for(tick_rate: u32) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(tick_rate.max(1)))
    }

    /// Waits for the next tick and returns the measured time since the previous one.
    pub async fn tick(&mut self) -> Duration {
        self.interval.tick().await;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.ticks += 1;
        elapsed
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
