//! The driver task behind a [`ConnectionManager`](super::ConnectionManager).
//!
//! One driver per manager. It owns every mutable piece of a connection:
//! the transport link, the keepalive schedule, the retry timer, the outbound
//! queue and the reconnect bookkeeping. Callers talk to it through commands;
//! the transport and timers talk to it through the current [`Phase`].
//!
//! Handlers run to completion one at a time. Each resource lives inside the
//! phase variant it belongs to, so replacing the phase cancels it:
//!
//! ```text
//! Idle ──connect──► Connecting{link} ──Opened──► Open{link, keepalive}
//!                        │                            │
//!                        └──────────Closed────────────┴──► Closed{retry?}
//!                                                            │
//!                     Connecting{link} ◄──retry due / connect┘
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Sleep};

use super::keepalive::KeepAlive;
use super::snapshot::LiveSnapshot;
use super::target::ConnectionTarget;
use crate::domain::connection::{
    CloseEvent, ConnectionError, ConnectionState, Enqueued, FlushInterrupted, OutboundQueue,
    OverflowPolicy, ReconnectDecision, ReconnectPolicy, ReconnectState,
};
use crate::domain::envelope::{MessageCodec, OutboundEnvelope};
use crate::domain::foundation::{ConnectionId, StateMachine};
use crate::ports::{Connector, Delivery, Feed, TransportError, TransportEvent, TransportLink};

/// Requests from the manager handle.
#[derive(Debug)]
pub(super) enum Command {
    Connect,
    Send(OutboundEnvelope),
    Disconnect { done: oneshot::Sender<()> },
    Reconnect { done: oneshot::Sender<()> },
    Shutdown { done: oneshot::Sender<()> },
}

/// Driver settings resolved from configuration.
#[derive(Debug)]
pub(super) struct DriverSettings {
    pub target: ConnectionTarget,
    pub policy: ReconnectPolicy,
    pub manual_reconnect_delay: Duration,
    pub keepalive_interval: Duration,
    pub queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    pub replay_subscriptions: bool,
    pub max_frame_bytes: usize,
}

// ============================================
// Phase
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryKind {
    Auto,
    Manual,
}

#[derive(Debug)]
struct RetryTimer {
    sleep: Pin<Box<Sleep>>,
    kind: RetryKind,
}

impl RetryTimer {
    fn new(delay: Duration, kind: RetryKind) -> Self {
        Self {
            sleep: Box::pin(time::sleep(delay)),
            kind,
        }
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Connecting { link: TransportLink },
    Open { link: TransportLink, keepalive: KeepAlive },
    Closed { retry: Option<RetryTimer> },
}

enum Signal {
    Transport(TransportEvent),
    KeepAliveDue,
    RetryDue(RetryKind),
}

impl Phase {
    fn state(&self) -> ConnectionState {
        match self {
            Phase::Idle => ConnectionState::Idle,
            Phase::Connecting { .. } => ConnectionState::Connecting,
            Phase::Open { .. } => ConnectionState::Open,
            Phase::Closed { .. } => ConnectionState::Closed,
        }
    }

    fn into_link(self) -> Option<TransportLink> {
        match self {
            Phase::Connecting { link } | Phase::Open { link, .. } => Some(link),
            Phase::Idle | Phase::Closed { .. } => None,
        }
    }

    /// Waits for whatever the current phase owns. Cancel safe.
    async fn next_signal(&mut self) -> Signal {
        match self {
            Phase::Connecting { link } => Signal::Transport(link.next_event().await),
            Phase::Open { link, keepalive } => {
                tokio::select! {
                    biased;
                    event = link.next_event() => Signal::Transport(event),
                    _ = keepalive.tick() => Signal::KeepAliveDue,
                }
            }
            Phase::Closed { retry: Some(timer) } => {
                timer.sleep.as_mut().await;
                Signal::RetryDue(timer.kind)
            }
            Phase::Idle | Phase::Closed { retry: None } => std::future::pending().await,
        }
    }
}

// ============================================
// Driver
// ============================================

pub(super) struct Driver<F: Feed> {
    id: ConnectionId,
    settings: DriverSettings,
    connector: Arc<dyn Connector>,
    feed: Arc<F>,
    codec: MessageCodec,
    reconnect: ReconnectState,
    queue: OutboundQueue,
    opened_before: bool,
    phase: Phase,
    view: LiveSnapshot<F::Envelope>,
    snapshot: watch::Sender<LiveSnapshot<F::Envelope>>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<F: Feed> Driver<F> {
    pub(super) fn new(
        id: ConnectionId,
        settings: DriverSettings,
        connector: Arc<dyn Connector>,
        feed: Arc<F>,
        snapshot: watch::Sender<LiveSnapshot<F::Envelope>>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let codec = MessageCodec::new(settings.max_frame_bytes);
        let queue = OutboundQueue::new(settings.queue_capacity, settings.overflow_policy);

        Self {
            id,
            settings,
            connector,
            feed,
            codec,
            reconnect: ReconnectState::new(),
            queue,
            opened_before: false,
            phase: Phase::Idle,
            view: LiveSnapshot::default(),
            snapshot,
            commands,
        }
    }

    pub(super) async fn run(mut self) {
        tracing::debug!(connection_id = %self.id, "Connection driver started");

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown { done }) => {
                        self.disconnect();
                        let _ = done.send(());
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => {
                        self.disconnect();
                        break;
                    }
                },
                signal = self.phase.next_signal() => self.handle_signal(signal),
            }
        }

        tracing::debug!(connection_id = %self.id, "Connection driver stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect => self.connect(),
            Command::Send(envelope) => self.send(envelope),
            Command::Disconnect { done } => {
                self.disconnect();
                let _ = done.send(());
            }
            Command::Reconnect { done } => {
                self.manual_reconnect();
                let _ = done.send(());
            }
            Command::Shutdown { done } => {
                // Handled by the run loop
                let _ = done.send(());
            }
        }
    }

    fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Transport(TransportEvent::Opened) => self.on_opened(),
            Signal::Transport(TransportEvent::Frame(frame)) => self.on_frame(frame),
            Signal::Transport(TransportEvent::Failed(error)) => self.on_failed(error),
            Signal::Transport(TransportEvent::Closed(close)) => self.on_closed(close),
            Signal::KeepAliveDue => {
                tracing::trace!(connection_id = %self.id, "Sending keepalive ping");
                self.send(OutboundEnvelope::Ping);
            }
            Signal::RetryDue(kind) => {
                tracing::debug!(
                    connection_id = %self.id,
                    manual = kind == RetryKind::Manual,
                    attempt = self.reconnect.attempts(),
                    "Reconnect timer fired"
                );
                self.open_transport();
            }
        }
    }

    // ============================================
    // Commands
    // ============================================

    fn connect(&mut self) {
        let state = self.phase.state();
        if state.has_transport() {
            tracing::debug!(connection_id = %self.id, state = %state, "Connect ignored");
            return;
        }
        if self.reconnect.is_exhausted() {
            tracing::warn!(
                connection_id = %self.id,
                "Connect refused: reconnect attempts exhausted, call reconnect()"
            );
            return;
        }

        self.reconnect.on_connect();
        self.open_transport();
    }

    fn send(&mut self, envelope: OutboundEnvelope) {
        let payload = match self.codec.encode(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(connection_id = %self.id, kind = envelope.kind(), error = %e, "Dropping unencodable envelope");
                return;
            }
        };

        if let Phase::Open { link, .. } = &self.phase {
            match link.send_text(payload.clone()) {
                Ok(()) => {
                    tracing::trace!(connection_id = %self.id, kind = envelope.kind(), "Frame sent");
                    return;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %self.id, error = %e, "Send failed, queueing frame");
                }
            }
        }

        self.enqueue(payload);

        if !self.phase.state().has_transport() {
            self.connect();
        }
    }

    fn disconnect(&mut self) {
        self.reconnect.on_disconnect();
        self.view.reconnect_attempts = 0;

        let previous = std::mem::replace(&mut self.phase, Phase::Closed { retry: None });
        let had_retry = matches!(previous, Phase::Closed { retry: Some(_) });

        match previous.into_link() {
            Some(link) => {
                self.record_transition(ConnectionState::Closing);
                link.close(CloseEvent::normal("client disconnect"));
                drop(link);
                self.record_transition(ConnectionState::Closed);
                tracing::info!(connection_id = %self.id, "Disconnected");
            }
            None => {
                if had_retry {
                    tracing::debug!(connection_id = %self.id, "Pending reconnect cancelled");
                }
                self.record_transition(ConnectionState::Closed);
            }
        }

        self.publish();
    }

    fn manual_reconnect(&mut self) {
        self.disconnect();
        self.reconnect.on_manual_reconnect();
        self.view.connection_error = None;

        let delay = self.settings.manual_reconnect_delay;
        tracing::info!(
            connection_id = %self.id,
            delay_ms = delay.as_millis() as u64,
            "Manual reconnect requested"
        );
        self.phase = Phase::Closed {
            retry: Some(RetryTimer::new(delay, RetryKind::Manual)),
        };
        self.publish();
    }

    // ============================================
    // Transport events
    // ============================================

    fn open_transport(&mut self) {
        tracing::info!(
            connection_id = %self.id,
            url = %self.settings.target.redacted(),
            attempt = self.reconnect.attempts(),
            "Opening connection"
        );
        let link = self.connector.open(&self.settings.target.url());
        self.enter(Phase::Connecting { link });
    }

    fn on_opened(&mut self) {
        let link = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Connecting { link } => link,
            other => {
                self.phase = other;
                tracing::warn!(connection_id = %self.id, "Ignoring unexpected open event");
                return;
            }
        };

        self.reconnect.on_open();
        self.view.reconnect_attempts = 0;
        self.view.connection_error = None;

        let flushed = self.flush_queue(&link);
        if self.opened_before && self.settings.replay_subscriptions {
            self.replay(&link, &flushed);
        }
        self.opened_before = true;

        let keepalive = KeepAlive::start(self.settings.keepalive_interval);
        self.enter(Phase::Open { link, keepalive });
        tracing::info!(connection_id = %self.id, "Connection open");
    }

    fn on_frame(&mut self, frame: String) {
        tracing::trace!(connection_id = %self.id, len = frame.len(), "Frame received");

        match self.codec.decode::<F::Envelope>(&frame) {
            Ok(envelope) => match self.feed.on_envelope(&envelope) {
                Delivery::Surface => {
                    self.view.last_message = Some(envelope);
                    self.publish();
                }
                Delivery::Suppress => {}
            },
            Err(e) => {
                tracing::error!(connection_id = %self.id, error = %e, "Discarding undecodable frame");
            }
        }
    }

    fn on_failed(&mut self, error: String) {
        tracing::warn!(connection_id = %self.id, error = %error, "Transport error");
        self.view.connection_error = Some(ConnectionError::Transport(error));
        self.publish();
    }

    fn on_closed(&mut self, close: CloseEvent) {
        tracing::info!(
            connection_id = %self.id,
            code = close.code,
            reason = %close.reason,
            "Connection closed"
        );

        let retry = match self.settings.policy.on_close(&mut self.reconnect, &close) {
            ReconnectDecision::Schedule { delay, attempt } => {
                tracing::info!(
                    connection_id = %self.id,
                    attempt,
                    max_attempts = self.settings.policy.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "Reconnect scheduled"
                );
                Some(RetryTimer::new(delay, RetryKind::Auto))
            }
            ReconnectDecision::Suppressed => {
                tracing::debug!(connection_id = %self.id, "Close was intentional, not reconnecting");
                None
            }
            ReconnectDecision::Disabled => {
                tracing::debug!(connection_id = %self.id, "Auto-reconnect disabled");
                None
            }
            ReconnectDecision::Exhausted { attempts } => {
                tracing::error!(connection_id = %self.id, attempts, "Reconnect attempts exhausted");
                self.view.connection_error = Some(ConnectionError::Capacity { attempts });
                None
            }
        };

        self.view.reconnect_attempts = self.reconnect.attempts();
        self.enter(Phase::Closed { retry });
    }

    // ============================================
    // Helpers
    // ============================================

    /// Sends the queued frames and returns the ones that went out.
    fn flush_queue(&mut self, link: &TransportLink) -> Vec<String> {
        let mut flushed = Vec::new();
        let outcome = self.queue.flush(|payload| -> Result<(), TransportError> {
            link.send_text(payload)?;
            flushed.push(payload.to_owned());
            Ok(())
        });
        match outcome {
            Ok(0) => {}
            Ok(sent) => {
                tracing::debug!(connection_id = %self.id, sent, "Flushed outbound queue");
            }
            Err(FlushInterrupted { sent, source }) => {
                tracing::warn!(
                    connection_id = %self.id,
                    sent,
                    remaining = self.queue.len(),
                    error = %source,
                    "Queue flush interrupted, remaining frames stay queued"
                );
            }
        }
        self.view.queued = self.queue.len();
        flushed
    }

    /// Re-sends the feed's frames, skipping any already flushed or still
    /// queued so a single call never reaches the server twice.
    fn replay(&mut self, link: &TransportLink, flushed: &[String]) {
        let frames = self.feed.on_reconnected();
        if frames.is_empty() {
            return;
        }

        tracing::debug!(connection_id = %self.id, count = frames.len(), "Replaying subscriptions");
        for envelope in frames {
            let payload = match self.codec.encode(&envelope) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(connection_id = %self.id, error = %e, "Dropping unencodable replay frame");
                    continue;
                }
            };
            if flushed.contains(&payload) || self.queue.iter().any(|queued| queued.payload == payload) {
                tracing::trace!(connection_id = %self.id, kind = envelope.kind(), "Replay frame already sent");
                continue;
            }
            if link.send_text(payload.clone()).is_err() {
                self.enqueue(payload);
            }
        }
    }

    fn enqueue(&mut self, payload: String) {
        match self.queue.enqueue(payload) {
            Enqueued::Stored => {}
            Enqueued::Evicted(oldest) => {
                self.view.dropped_messages += 1;
                tracing::warn!(
                    connection_id = %self.id,
                    capacity = self.queue.capacity(),
                    enqueued_at = %oldest.enqueued_at,
                    "Outbound queue full, dropped oldest frame"
                );
            }
            Enqueued::Rejected(_) => {
                self.view.dropped_messages += 1;
                tracing::warn!(
                    connection_id = %self.id,
                    capacity = self.queue.capacity(),
                    "Outbound queue full, rejected new frame"
                );
            }
        }
        self.view.queued = self.queue.len();
        self.publish();
    }

    /// Replaces the phase, dropping whatever the old one owned.
    fn enter(&mut self, next: Phase) {
        let to = next.state();
        self.phase = next;
        self.record_transition(to);
        self.publish();
    }

    fn record_transition(&mut self, to: ConnectionState) {
        let from = self.view.state;
        if from == to {
            return;
        }
        match from.transition_to(to) {
            Ok(_) => {
                tracing::debug!(connection_id = %self.id, from = %from, to = %to, "State transition");
            }
            Err(e) => {
                tracing::warn!(connection_id = %self.id, from = %from, to = %to, error = %e, "Unexpected state transition");
            }
        }
        self.view.state = to;
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.view.clone());
    }
}
