//! Envelopes sent from this client to the server.

use crate::domain::foundation::{EntityId, Timestamp};

/// Everything the client can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEnvelope {
    /// `{ type, content, timestamp }` on the generic channel.
    Message {
        message_type: String,
        content: String,
        timestamp: Timestamp,
    },

    /// `{ type: "subscribe", id }`
    Subscribe { id: EntityId },

    /// `{ type: "unsubscribe", id }`
    Unsubscribe { id: EntityId },

    /// `{ type: "ping" }`, emitted by the keepalive.
    Ping,
}

impl OutboundEnvelope {
    /// A content message stamped with the current time.
    pub fn message(content: impl Into<String>, message_type: impl Into<String>) -> Self {
        OutboundEnvelope::Message {
            message_type: message_type.into(),
            content: content.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Wire value of the `type` field.
    pub fn kind(&self) -> &str {
        match self {
            OutboundEnvelope::Message { message_type, .. } => message_type,
            OutboundEnvelope::Subscribe { .. } => "subscribe",
            OutboundEnvelope::Unsubscribe { .. } => "unsubscribe",
            OutboundEnvelope::Ping => "ping",
        }
    }
}
