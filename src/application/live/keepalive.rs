//! Keepalive ping schedule for open connections.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Periodic ping schedule, owned by the Open phase.
///
/// The first tick comes one full period after start. Dropping the value
/// cancels the schedule.
#[derive(Debug)]
pub struct KeepAlive {
    interval: Interval,
}

impl KeepAlive {
    /// `period` must be non-zero.
    pub fn start(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Completes at the next scheduled ping. Cancel safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
