use crate::domain::connection::{ConnectionError, ConnectionState};

/// Observable state of one connection manager.
///
/// Published through a `watch` channel after every change. Domain data
/// (`last_message`) survives disconnects; only the connectivity fields and
/// `connection_error` move with the transport.
#[derive(Debug, Clone)]
pub struct LiveSnapshot<E> {
    pub state: ConnectionState,
    /// Latest surfaced inbound envelope.
    pub last_message: Option<E>,
    pub connection_error: Option<ConnectionError>,
    /// Automatic attempts since the last successful open.
    pub reconnect_attempts: u32,
    /// Frames waiting in the outbound queue.
    pub queued: usize,
    /// Frames lost to queue overflow over the manager's lifetime.
    pub dropped_messages: u64,
}

impl<E> Default for LiveSnapshot<E> {
    fn default() -> Self {
        Self {
            state: ConnectionState::default(),
            last_message: None,
            connection_error: None,
            reconnect_attempts: 0,
            queued: 0,
            dropped_messages: 0,
        }
    }
}

impl<E> LiveSnapshot<E> {
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn is_connecting(&self) -> bool {
        self.state.is_connecting()
    }
}
