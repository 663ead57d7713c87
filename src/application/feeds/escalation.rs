//! Escalation feed: subscriptions and live statistics on top of a
//! connection manager.

use std::sync::Arc;

use tokio::sync::watch;

use crate::application::live::{ConnectionManager, LiveSnapshot};
use crate::config::{ConnectionConfig, ValidationError};
use crate::domain::connection::{ConnectionError, ConnectionState};
use crate::domain::envelope::{EscalationEnvelope, EscalationEventType, OutboundEnvelope};
use crate::domain::escalation::{StatsAggregate, SubscriptionSet};
use crate::domain::foundation::EntityId;
use crate::ports::{Connector, Delivery, Feed};

// ============================================
// Registry
// ============================================

/// Subscription interest and the aggregate statistics view.
///
/// Stats start zeroed. `stats_updated` replaces them wholesale and
/// `escalation_created` nudges `total_active` until the next authoritative
/// update. Unknown event types are consumed without touching either.
#[derive(Debug)]
pub struct SubscriptionRegistry {
    subscriptions: watch::Sender<SubscriptionSet>,
    stats: watch::Sender<StatsAggregate>,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        let (subscriptions, _) = watch::channel(SubscriptionSet::new());
        let (stats, _) = watch::channel(StatsAggregate::zeroed());
        Self { subscriptions, stats }
    }

    /// Returns true if the id was newly added.
    pub fn subscribe(&self, id: EntityId) -> bool {
        self.subscriptions.send_if_modified(|set| set.insert(id))
    }

    /// Returns true if the id was present.
    pub fn unsubscribe(&self, id: &EntityId) -> bool {
        self.subscriptions.send_if_modified(|set| set.remove(id))
    }

    pub fn subscriptions(&self) -> SubscriptionSet {
        self.subscriptions.borrow().clone()
    }

    pub fn stats(&self) -> StatsAggregate {
        self.stats.borrow().clone()
    }

    pub fn stats_watch(&self) -> watch::Receiver<StatsAggregate> {
        self.stats.subscribe()
    }
}

impl Feed for SubscriptionRegistry {
    type Envelope = EscalationEnvelope;

    fn on_envelope(&self, envelope: &EscalationEnvelope) -> Delivery {
        match &envelope.event_type {
            EscalationEventType::StatsUpdated => match StatsAggregate::from_payload(&envelope.data) {
                Ok(stats) => {
                    self.stats.send_replace(stats);
                    Delivery::Surface
                }
                Err(e) => {
                    tracing::error!(error = %e, "Ignoring invalid stats payload");
                    Delivery::Suppress
                }
            },
            EscalationEventType::EscalationCreated => {
                tracing::debug!(id = envelope.entity_id(), "Escalation created");
                self.stats.send_modify(|stats| stats.nudge("total_active", 1));
                Delivery::Surface
            }
            EscalationEventType::EscalationUpdated => {
                tracing::debug!(id = envelope.entity_id(), "Escalation updated");
                Delivery::Surface
            }
            EscalationEventType::Other(kind) => {
                tracing::debug!(kind = %kind, "Ignoring escalation event of unknown type");
                Delivery::Suppress
            }
        }
    }

    fn on_reconnected(&self) -> Vec<OutboundEnvelope> {
        self.subscriptions
            .borrow()
            .iter()
            .cloned()
            .map(|id| OutboundEnvelope::Subscribe { id })
            .collect()
    }
}

// ============================================
// Feed handle
// ============================================

/// A connection on the escalation channel.
///
/// Adds subscribe/unsubscribe and the stats view; everything else is
/// delegated to the underlying [`ConnectionManager`].
#[derive(Debug)]
pub struct EscalationFeed {
    manager: ConnectionManager<SubscriptionRegistry>,
}

impl EscalationFeed {
    pub fn new(config: &ConnectionConfig, connector: Arc<dyn Connector>) -> Result<Self, ValidationError> {
        let manager = ConnectionManager::new(config, connector, Arc::new(SubscriptionRegistry::new()))?;
        Ok(Self { manager })
    }

    /// Records interest in `id` and sends one `subscribe` frame, queued if
    /// the transport is not open.
    pub fn subscribe(&self, id: EntityId) {
        self.registry().subscribe(id.clone());
        self.manager.send(OutboundEnvelope::Subscribe { id });
    }

    /// Drops interest in `id` and sends one `unsubscribe` frame.
    pub fn unsubscribe(&self, id: EntityId) {
        self.registry().unsubscribe(&id);
        self.manager.send(OutboundEnvelope::Unsubscribe { id });
    }

    pub fn stats(&self) -> StatsAggregate {
        self.registry().stats()
    }

    pub fn stats_watch(&self) -> watch::Receiver<StatsAggregate> {
        self.registry().stats_watch()
    }

    pub fn subscriptions(&self) -> SubscriptionSet {
        self.registry().subscriptions()
    }

    /// Latest surfaced escalation event.
    pub fn last_event(&self) -> Option<EscalationEnvelope> {
        self.manager.last_message()
    }

    pub fn connect(&self) {
        self.manager.connect();
    }

    pub async fn disconnect(&self) {
        self.manager.disconnect().await;
    }

    pub async fn reconnect(&self) {
        self.manager.reconnect().await;
    }

    pub async fn shutdown(self) {
        self.manager.shutdown().await;
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn is_connecting(&self) -> bool {
        self.manager.is_connecting()
    }

    pub fn connection_error(&self) -> Option<ConnectionError> {
        self.manager.connection_error()
    }

    pub fn watch(&self) -> watch::Receiver<LiveSnapshot<EscalationEnvelope>> {
        self.manager.watch()
    }

    pub fn manager(&self) -> &ConnectionManager<SubscriptionRegistry> {
        &self.manager
    }

    fn registry(&self) -> &SubscriptionRegistry {
        self.manager.feed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(event_type: EscalationEventType, data: serde_json::Value) -> EscalationEnvelope {
        EscalationEnvelope {
            event_type,
            data,
            timestamp: None,
        }
    }

    fn id(raw: &str) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    #[test]
    fn stats_update_replaces_aggregate() {
        let registry = SubscriptionRegistry::new();
        let payload = json!({"total_active": 15, "pending": 8, "assigned": 3, "in_progress": 5});

        let delivery = registry.on_envelope(&envelope(EscalationEventType::StatsUpdated, payload.clone()));

        assert_eq!(delivery, Delivery::Surface);
        assert_eq!(serde_json::to_value(registry.stats()).unwrap(), payload);
    }

    #[test]
    fn invalid_stats_payload_leaves_stats_untouched() {
        let registry = SubscriptionRegistry::new();
        registry.on_envelope(&envelope(
            EscalationEventType::StatsUpdated,
            json!({"total_active": 4}),
        ));

        let delivery = registry.on_envelope(&envelope(EscalationEventType::StatsUpdated, json!("oops")));

        assert_eq!(delivery, Delivery::Suppress);
        assert_eq!(registry.stats().total_active(), 4);
    }

    #[test]
    fn created_event_nudges_total_active() {
        let registry = SubscriptionRegistry::new();

        registry.on_envelope(&envelope(EscalationEventType::EscalationCreated, json!({"id": "esc-1"})));
        registry.on_envelope(&envelope(EscalationEventType::EscalationUpdated, json!({"id": "esc-1"})));

        assert_eq!(registry.stats().total_active(), 1);
    }

    #[test]
    fn unknown_event_is_suppressed_and_harmless() {
        let registry = SubscriptionRegistry::new();
        let before = registry.stats();

        let delivery = registry.on_envelope(&envelope(
            EscalationEventType::Other("agent_joined".into()),
            json!({"total_active": 99}),
        ));

        assert_eq!(delivery, Delivery::Suppress);
        assert_eq!(registry.stats(), before);
    }

    #[test]
    fn reconnect_replays_current_subscriptions() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(id("esc-2"));
        registry.subscribe(id("esc-1"));
        registry.subscribe(id("esc-3"));
        registry.unsubscribe(&id("esc-3"));

        assert_eq!(
            registry.on_reconnected(),
            vec![
                OutboundEnvelope::Subscribe { id: id("esc-1") },
                OutboundEnvelope::Subscribe { id: id("esc-2") },
            ]
        );
    }

    #[test]
    fn subscribe_reports_changes() {
        let registry = SubscriptionRegistry::new();

        assert!(registry.subscribe(id("esc-1")));
        assert!(!registry.subscribe(id("esc-1")));
        assert!(registry.unsubscribe(&id("esc-1")));
        assert!(!registry.unsubscribe(&id("esc-1")));
    }

    #[tokio::test]
    async fn stats_watch_sees_replacement() {
        let registry = SubscriptionRegistry::new();
        let mut stats = registry.stats_watch();

        registry.on_envelope(&envelope(EscalationEventType::StatsUpdated, json!({"pending": 2})));

        stats.changed().await.unwrap();
        assert_eq!(stats.borrow().get("pending"), Some(2));
    }
}
