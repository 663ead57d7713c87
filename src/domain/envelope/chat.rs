//! Envelopes of the generic chat/notification channel.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::InboundEnvelope;

/// Discriminant of a chat envelope.
///
/// Unrecognised values are kept verbatim in `Other` so a server that adds a
/// new type never breaks decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChatMessageType {
    Message,
    Typing,
    System,
    Error,
    ConnectionStatus,
    AiResponse,
    Other(String),
}

impl ChatMessageType {
    pub fn as_str(&self) -> &str {
        match self {
            ChatMessageType::Message => "message",
            ChatMessageType::Typing => "typing",
            ChatMessageType::System => "system",
            ChatMessageType::Error => "error",
            ChatMessageType::ConnectionStatus => "connection_status",
            ChatMessageType::AiResponse => "ai_response",
            ChatMessageType::Other(other) => other,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ChatMessageType::Other(_))
    }
}

impl From<String> for ChatMessageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "message" => ChatMessageType::Message,
            "typing" => ChatMessageType::Typing,
            "system" => ChatMessageType::System,
            "error" => ChatMessageType::Error,
            "connection_status" => ChatMessageType::ConnectionStatus,
            "ai_response" => ChatMessageType::AiResponse,
            _ => ChatMessageType::Other(value),
        }
    }
}

impl From<ChatMessageType> for String {
    fn from(value: ChatMessageType) -> Self {
        match value {
            ChatMessageType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ChatMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound envelope on the chat/notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEnvelope {
    #[serde(rename = "type")]
    pub message_type: ChatMessageType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl InboundEnvelope for ChatEnvelope {
    fn kind(&self) -> &str {
        self.message_type.as_str()
    }
}
