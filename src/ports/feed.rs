//! Feed port - Consumer of decoded inbound envelopes.
//!
//! A connection manager owns exactly one feed. The feed decides which
//! envelopes become the observable `last_message`, keeps whatever derived
//! state its channel needs, and may ask for frames to be re-sent after a
//! reconnect.

use crate::domain::envelope::{InboundEnvelope, OutboundEnvelope};

/// What the manager should do with a decoded envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Publish as the latest message.
    Surface,
    /// Consume silently.
    Suppress,
}

/// Channel-specific handling of inbound envelopes.
///
/// Methods are called from the manager's driver task, one at a time and in
/// frame order. They must not block.
pub trait Feed: Send + Sync + 'static {
    type Envelope: InboundEnvelope;

    fn on_envelope(&self, envelope: &Self::Envelope) -> Delivery;

    /// Frames to send after a reconnect, following the queue flush.
    fn on_reconnected(&self) -> Vec<OutboundEnvelope> {
        Vec::new()
    }
}
