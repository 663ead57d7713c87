//! Transport port - Interface for a single full-duplex text socket.
//!
//! A [`Connector`] turns a URL into a [`TransportLink`] without blocking.
//! The link is the client half of a pair of channels; the adapter keeps the
//! other half, a [`TransportEndpoint`], and reports the socket's progress on
//! it as [`TransportEvent`]s.
//!
//! ## Event order
//!
//! 1. `Opened` once the handshake succeeds, or `Failed` followed by `Closed`
//!    when it does not
//! 2. any number of `Frame`s
//! 3. exactly one `Closed`
//!
//! If the adapter drops its endpoint without reporting a close, the link
//! yields an abnormal `Closed` on its own.

use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

use crate::domain::connection::CloseEvent;

/// Progress reported by a transport adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Failed(String),
    Closed(CloseEvent),
}

/// Instruction from the client to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Send(String),
    Close(CloseEvent),
}

/// Errors returned when talking to the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Transport is gone")]
    Gone,
}

/// Opens transports.
pub trait Connector: Send + Sync {
    /// Starts opening `url` and returns immediately.
    fn open(&self, url: &Url) -> TransportLink;
}

/// Creates a connected link/endpoint pair.
pub fn channel() -> (TransportLink, TransportEndpoint) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    (
        TransportLink {
            commands: command_tx,
            events: event_rx,
        },
        TransportEndpoint {
            events: event_tx,
            commands: command_rx,
        },
    )
}

// ============================================
// Client half
// ============================================

/// The client's handle on one transport.
///
/// Dropping the link tells the adapter to tear the socket down.
#[derive(Debug)]
pub struct TransportLink {
    commands: mpsc::UnboundedSender<TransportCommand>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl TransportLink {
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), TransportError> {
        self.commands
            .send(TransportCommand::Send(text.into()))
            .map_err(|_| TransportError::Gone)
    }

    /// Asks the adapter to close the socket. Best effort.
    pub fn close(&self, close: CloseEvent) {
        let _ = self.commands.send(TransportCommand::Close(close));
    }

    /// Next event from the adapter. Cancel safe.
    pub async fn next_event(&mut self) -> TransportEvent {
        match self.events.recv().await {
            Some(event) => event,
            None => TransportEvent::Closed(CloseEvent::abnormal("transport dropped")),
        }
    }
}

// ============================================
// Adapter half
// ============================================

/// The adapter's side of one transport.
#[derive(Debug)]
pub struct TransportEndpoint {
    events: mpsc::UnboundedSender<TransportEvent>,
    commands: mpsc::UnboundedReceiver<TransportCommand>,
}

impl TransportEndpoint {
    /// Reports an event. Returns false once the link has been dropped.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Next command from the client, or `None` once the link is dropped
    /// and every buffered command has been read.
    pub async fn next_command(&mut self) -> Option<TransportCommand> {
        self.commands.recv().await
    }

    pub fn try_next_command(&mut self) -> Option<TransportCommand> {
        self.commands.try_recv().ok()
    }

    pub fn is_link_dropped(&self) -> bool {
        self.events.is_closed()
    }
}
