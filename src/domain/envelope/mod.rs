//! Envelope types exchanged over the socket and the codec that maps them
//! to and from JSON text frames.

mod chat;
mod codec;
mod escalation;
mod outbound;

use serde::de::DeserializeOwned;
use std::fmt;

pub use chat::{ChatEnvelope, ChatMessageType};
pub use codec::{CodecError, MessageCodec, DEFAULT_MAX_FRAME_BYTES};
pub use escalation::{EscalationEnvelope, EscalationEventType};
pub use outbound::OutboundEnvelope;

/// An envelope that can arrive from the server.
pub trait InboundEnvelope: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Wire value of the `type` discriminant.
    fn kind(&self) -> &str;
}
