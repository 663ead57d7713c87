//! Connection lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of a single connection manager.
///
/// Exactly one value is active per manager at any time. The public
/// `is_connected` / `is_connecting` flags are derived from it, so they can
/// never both be true.
///
/// ```text
/// Idle ──► Connecting ──► Open ──► Closing ──► Closed
///   │          │  │         │                    │
///   │          │  └─────────┴────────────────────►│
///   └──────────┴─────────────────────────────────►│
///              ▲                                  │
///              └──────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Constructed, never asked to connect.
    #[default]
    Idle,
    /// Transport opened, waiting for the handshake to complete.
    Connecting,
    /// Transport open; frames flow both ways.
    Open,
    /// Client-initiated close issued on a live transport.
    Closing,
    /// No transport. A reconnect may be pending.
    Closed,
}

impl ConnectionState {
    /// True only while the transport is open.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// True only while a transport is being established.
    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }

    /// True when the manager holds a live transport handle.
    pub fn has_transport(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }

    /// Snake-case name used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ConnectionState {
    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Idle => vec![Connecting, Closed],
            Connecting => vec![Open, Closing, Closed],
            Open => vec![Closing, Closed],
            Closing => vec![Closed],
            Closed => vec![Connecting],
        }
    }
}
