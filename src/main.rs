//! `admin-live` - tail a live-update socket from the terminal.
//!
//! Configuration comes from `ADMIN_LIVE__*` environment variables (see
//! `admin_live::config`). Every surfaced event is logged; Ctrl-C disconnects
//! cleanly.

use std::sync::Arc;

use tokio::sync::watch;

use admin_live::application::{ChatConnection, EscalationFeed, LiveSnapshot};
use admin_live::config::{FeedKind, LiveConfig};
use admin_live::domain::envelope::InboundEnvelope;
use admin_live::ports::Connector;
use admin_live::{adapters::TungsteniteConnector, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LiveConfig::load()?;
    config.validate()?;
    telemetry::init_subscriber(&config.logging);

    let connector: Arc<dyn Connector> =
        Arc::new(TungsteniteConnector::new(config.connection.connect_timeout()));

    match config.feed.kind {
        FeedKind::Chat => {
            let connection = ChatConnection::chat(&config.connection, connector)?;
            connection.connect();
            tail(connection.watch()).await;
            connection.shutdown().await;
        }
        FeedKind::Escalation => {
            let feed = EscalationFeed::new(&config.connection, connector)?;
            for id in config.feed.subscription_ids()? {
                feed.subscribe(id);
            }
            feed.connect();
            tail(feed.watch()).await;
            tracing::info!(stats = ?feed.stats(), "Final escalation stats");
            feed.shutdown().await;
        }
    }

    Ok(())
}

/// Logs state changes and surfaced envelopes until Ctrl-C.
async fn tail<E>(mut updates: watch::Receiver<LiveSnapshot<E>>)
where
    E: InboundEnvelope + PartialEq,
{
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_state = updates.borrow().state;
    let mut last_message: Option<E> = None;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Interrupted, disconnecting");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();

                if snapshot.state != last_state {
                    tracing::info!(state = %snapshot.state, error = ?snapshot.connection_error, "Connection state");
                    last_state = snapshot.state;
                }
                if snapshot.last_message.is_some() && snapshot.last_message != last_message {
                    if let Some(message) = &snapshot.last_message {
                        tracing::info!(kind = message.kind(), envelope = ?message, "Event");
                    }
                    last_message = snapshot.last_message;
                }
            }
        }
    }
}
