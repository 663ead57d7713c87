//! Escalation domain - subscription interest and aggregate statistics.

mod stats;
mod subscriptions;

pub use stats::{StatsAggregate, BASELINE_COUNTERS};
pub use subscriptions::SubscriptionSet;
