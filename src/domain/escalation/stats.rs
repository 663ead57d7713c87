//! Aggregate counters published by the escalation service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::foundation::ValidationError;

/// Counters present in the zeroed baseline.
pub const BASELINE_COUNTERS: [&str; 4] = ["total_active", "pending", "assigned", "in_progress"];

/// A flat record of named counters.
///
/// The aggregate is only ever replaced wholesale by an authoritative
/// `stats_updated` payload. The single exception is [`StatsAggregate::nudge`],
/// an optimistic adjustment that the next authoritative payload overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsAggregate(BTreeMap<String, i64>);

impl Default for StatsAggregate {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl StatsAggregate {
    /// Baseline with every well-known counter at zero.
    pub fn zeroed() -> Self {
        Self(BASELINE_COUNTERS.iter().map(|name| (name.to_string(), 0)).collect())
    }

    /// Parses an authoritative payload.
    ///
    /// The payload must be a JSON object whose values are all integers. The
    /// result holds exactly the payload's counters, nothing carried over.
    pub fn from_payload(data: &Value) -> Result<Self, ValidationError> {
        let object = data
            .as_object()
            .ok_or_else(|| ValidationError::invalid_format("stats", "payload is not an object"))?;

        let mut counters = BTreeMap::new();
        for (name, value) in object {
            let count = value.as_i64().ok_or_else(|| {
                ValidationError::invalid_format(
                    "stats",
                    format!("counter '{}' is not an integer", name),
                )
            })?;
            counters.insert(name.clone(), count);
        }

        Ok(Self(counters))
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.get(name).copied()
    }

    pub fn total_active(&self) -> i64 {
        self.get("total_active").unwrap_or(0)
    }

    /// Adds `delta` to a counter, creating it at zero if absent.
    pub fn nudge(&mut self, name: &str, delta: i64) {
        let counter = self.0.entry(name.to_string()).or_insert(0);
        *counter = counter.saturating_add(delta);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zeroed_baseline_has_well_known_counters() {
        let stats = StatsAggregate::zeroed();

        assert_eq!(stats.len(), 4);
        for name in BASELINE_COUNTERS {
            assert_eq!(stats.get(name), Some(0));
        }
    }

    #[test]
    fn payload_replaces_everything() {
        let payload = json!({"total_active": 15, "pending": 8, "assigned": 3, "in_progress": 5});
        let stats = StatsAggregate::from_payload(&payload).unwrap();

        assert_eq!(serde_json::to_value(&stats).unwrap(), payload);
    }

    #[test]
    fn payload_with_fewer_counters_does_not_keep_old_ones() {
        let stats = StatsAggregate::from_payload(&json!({"total_active": 2})).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats.get("pending"), None);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = StatsAggregate::from_payload(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn non_integer_counter_is_rejected() {
        let result = StatsAggregate::from_payload(&json!({"total_active": "many"}));
        assert!(result.is_err());
    }

    #[test]
    fn nudge_adjusts_counter() {
        let mut stats = StatsAggregate::zeroed();
        stats.nudge("total_active", 1);
        stats.nudge("total_active", 1);
        stats.nudge("escalated_today", 3);

        assert_eq!(stats.total_active(), 2);
        assert_eq!(stats.get("escalated_today"), Some(3));
    }
}
