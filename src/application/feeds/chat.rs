//! Generic chat/notification channel.

use std::sync::Arc;

use crate::application::live::ConnectionManager;
use crate::config::{ConnectionConfig, ValidationError};
use crate::domain::envelope::ChatEnvelope;
use crate::ports::{Connector, Delivery, Feed};

/// Surfaces every decoded chat envelope, unknown types included.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatFeed;

impl Feed for ChatFeed {
    type Envelope = ChatEnvelope;

    fn on_envelope(&self, envelope: &ChatEnvelope) -> Delivery {
        if !envelope.message_type.is_known() {
            tracing::debug!(kind = %envelope.message_type, "Surfacing chat envelope of unknown type");
        }
        Delivery::Surface
    }
}

/// A connection on the chat/notification channel.
pub type ChatConnection = ConnectionManager<ChatFeed>;

impl ConnectionManager<ChatFeed> {
    pub fn chat(config: &ConnectionConfig, connector: Arc<dyn Connector>) -> Result<Self, ValidationError> {
        Self::new(config, connector, Arc::new(ChatFeed))
    }
}
