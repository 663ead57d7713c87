//! Public handle of a live connection.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::driver::{Command, Driver, DriverSettings};
use super::snapshot::LiveSnapshot;
use super::target::ConnectionTarget;
use crate::config::{ConnectionConfig, ValidationError};
use crate::domain::connection::{ConnectionError, ConnectionState};
use crate::domain::envelope::OutboundEnvelope;
use crate::domain::foundation::ConnectionId;
use crate::ports::{Connector, Feed};

/// Owns one resilient connection.
///
/// Every manager has its own driver task, so independent consumers never
/// share timers or transports. `connect` and the send operations return
/// immediately; `disconnect`, `reconnect` and `shutdown` return once the
/// driver has cancelled its timers and issued the transport close.
///
/// Dropping the manager aborts the driver and releases everything it owns.
/// Once the driver has stopped, every operation is a logged no-op.
pub struct ConnectionManager<F: Feed> {
    id: ConnectionId,
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<LiveSnapshot<F::Envelope>>,
    feed: Arc<F>,
    task: Option<JoinHandle<()>>,
}

impl<F: Feed> ConnectionManager<F> {
    /// Validates `config` and spawns the driver in the current tokio
    /// runtime. The manager starts `Idle`; nothing is opened until
    /// [`connect`](Self::connect) or a send.
    pub fn new(
        config: &ConnectionConfig,
        connector: Arc<dyn Connector>,
        feed: Arc<F>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;

        let settings = DriverSettings {
            target: ConnectionTarget::from_config(config)?,
            policy: config.reconnect_policy(),
            manual_reconnect_delay: config.manual_reconnect_delay(),
            keepalive_interval: config.keepalive_interval(),
            queue_capacity: config.queue_capacity,
            overflow_policy: config.overflow_policy,
            replay_subscriptions: config.replay_subscriptions,
            max_frame_bytes: config.max_frame_bytes,
        };

        let id = ConnectionId::new();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(LiveSnapshot::default());

        let driver = Driver::new(
            id,
            settings,
            connector,
            Arc::clone(&feed),
            snapshot_tx,
            command_rx,
        );
        let span = tracing::info_span!("live_connection", connection_id = %id, channel = %config.channel);
        let task = tokio::spawn(driver.run().instrument(span));

        Ok(Self {
            id,
            commands: command_tx,
            snapshot: snapshot_rx,
            feed,
            task: Some(task),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn feed(&self) -> &Arc<F> {
        &self.feed
    }

    /// Opens the transport unless one is already open or opening.
    pub fn connect(&self) {
        self.dispatch(Command::Connect, "connect");
    }

    /// Sends `{ type, content, timestamp }`, queueing while not open.
    pub fn send_message(&self, content: impl Into<String>, message_type: impl Into<String>) {
        self.send(OutboundEnvelope::message(content, message_type));
    }

    /// Sends any outbound envelope, queueing while not open.
    pub fn send(&self, envelope: OutboundEnvelope) {
        self.dispatch(Command::Send(envelope), "send");
    }

    /// Cancels any pending reconnect and the keepalive, closes the transport
    /// with 1000 and suppresses automatic reconnection.
    pub async fn disconnect(&self) {
        let (done, ack) = oneshot::channel();
        if self.dispatch(Command::Disconnect { done }, "disconnect") {
            let _ = ack.await;
        }
    }

    /// Disconnects, clears the attempt counter and any terminal error, and
    /// connects again after a short delay.
    pub async fn reconnect(&self) {
        let (done, ack) = oneshot::channel();
        if self.dispatch(Command::Reconnect { done }, "reconnect") {
            let _ = ack.await;
        }
    }

    /// Disconnects and waits for the driver task to finish.
    pub async fn shutdown(mut self) {
        let (done, ack) = oneshot::channel();
        if self.dispatch(Command::Shutdown { done }, "shutdown") {
            let _ = ack.await;
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(connection_id = %self.id, error = %e, "Connection driver ended abnormally");
            }
        }
    }

    /// Current observable state.
    pub fn snapshot(&self) -> LiveSnapshot<F::Envelope> {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<LiveSnapshot<F::Envelope>> {
        self.snapshot.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.snapshot.borrow().state
    }

    pub fn is_connected(&self) -> bool {
        self.snapshot.borrow().is_connected()
    }

    pub fn is_connecting(&self) -> bool {
        self.snapshot.borrow().is_connecting()
    }

    pub fn last_message(&self) -> Option<F::Envelope> {
        self.snapshot.borrow().last_message.clone()
    }

    pub fn connection_error(&self) -> Option<ConnectionError> {
        self.snapshot.borrow().connection_error.clone()
    }

    fn dispatch(&self, command: Command, operation: &'static str) -> bool {
        if self.commands.send(command).is_err() {
            tracing::debug!(connection_id = %self.id, operation, "Connection manager has stopped, ignoring call");
            return false;
        }
        true
    }
}

impl<F: Feed> Drop for ConnectionManager<F> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<F: Feed> std::fmt::Debug for ConnectionManager<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
