//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::time;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use admin_live::application::LiveSnapshot;
use admin_live::config::ConnectionConfig;

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for tests: memory endpoint, default reconnect policy
/// and a keepalive long enough to stay out of the way.
pub fn test_config() -> ConnectionConfig {
    let mut config = ConnectionConfig::new("ws://live.test/ws", "admin-1");
    config.keepalive_interval_secs = 3600;
    config
}

// =============================================================================
// Waiting
// =============================================================================

/// Upper bound for any wait, in virtual time.
pub const WAIT: Duration = Duration::from_secs(600);

/// Waits until a snapshot satisfies `predicate` and returns it.
pub async fn wait_until<E, P>(updates: &mut watch::Receiver<LiveSnapshot<E>>, predicate: P) -> LiveSnapshot<E>
where
    E: Clone,
    P: FnMut(&LiveSnapshot<E>) -> bool,
{
    let snapshot = time::timeout(WAIT, updates.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("connection driver stopped");
    snapshot.clone()
}

/// Lets the driver work through everything it has been sent.
pub async fn settle() {
    time::sleep(Duration::from_millis(1)).await;
}

pub fn json(frame: &str) -> Value {
    serde_json::from_str(frame).expect("client frame is valid JSON")
}

// =============================================================================
// Log capture
// =============================================================================

/// Events recorded by the capture layer: level and message.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    pub fn count_at_level(&self, level: Level) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn has_event(&self, level: Level, message_contains: &str) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(message_contains))
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        self.logs
            .events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.message));
    }
}

/// Captures every event on the current thread while the guard lives.
///
/// Tokio tests run on a current-thread runtime, so the connection driver's
/// events land here too.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer { logs: logs.clone() });
    (logs, subscriber.set_default())
}
