//! JSON text codec for envelopes.
//!
//! Decoding failures are returned as values. The connection manager logs
//! them and carries on, so a bad frame can never tear down a connection.

use serde::Serialize;
use thiserror::Error;

use crate::domain::foundation::EntityId;

use super::{InboundEnvelope, OutboundEnvelope};

/// Default upper bound for a single inbound frame (1 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Errors raised at the codec boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Frame of {len} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { len: usize, limit: usize },

    #[error("Failed to encode outbound envelope: {0}")]
    Encode(#[source] serde_json::Error),
}

// ============================================
// Wire frames
// ============================================

#[derive(Serialize)]
struct MessageFrame<'a> {
    #[serde(rename = "type")]
    message_type: &'a str,
    content: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct ControlFrame<'a> {
    #[serde(rename = "type")]
    control: &'static str,
    id: &'a EntityId,
}

#[derive(Serialize)]
struct PingFrame {
    #[serde(rename = "type")]
    ping: &'static str,
}

// ============================================
// Codec
// ============================================

/// Encodes outbound envelopes and decodes inbound frames.
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    max_frame_bytes: usize,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl MessageCodec {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self { max_frame_bytes }
    }

    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }

    pub fn encode(&self, envelope: &OutboundEnvelope) -> Result<String, CodecError> {
        let encoded = match envelope {
            OutboundEnvelope::Message {
                message_type,
                content,
                timestamp,
            } => serde_json::to_string(&MessageFrame {
                message_type,
                content,
                timestamp: timestamp.to_rfc3339(),
            }),
            OutboundEnvelope::Subscribe { id } => serde_json::to_string(&ControlFrame {
                control: "subscribe",
                id,
            }),
            OutboundEnvelope::Unsubscribe { id } => serde_json::to_string(&ControlFrame {
                control: "unsubscribe",
                id,
            }),
            OutboundEnvelope::Ping => serde_json::to_string(&PingFrame { ping: "ping" }),
        };

        encoded.map_err(CodecError::Encode)
    }

    pub fn decode<E: InboundEnvelope>(&self, frame: &str) -> Result<E, CodecError> {
        if frame.len() > self.max_frame_bytes {
            return Err(CodecError::FrameTooLarge {
                len: frame.len(),
                limit: self.max_frame_bytes,
            });
        }

        serde_json::from_str(frame).map_err(CodecError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::envelope::{ChatEnvelope, ChatMessageType, EscalationEnvelope, EscalationEventType};
    use crate::domain::foundation::Timestamp;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn encodes_content_message() {
        let codec = MessageCodec::default();
        let timestamp = Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        let envelope = OutboundEnvelope::Message {
            message_type: "message".into(),
            content: "hello".into(),
            timestamp,
        };

        let frame = codec.encode(&envelope).unwrap();

        assert_eq!(
            parse(&frame),
            json!({"type": "message", "content": "hello", "timestamp": "2025-03-01T12:00:00.000Z"})
        );
    }

    #[test]
    fn encodes_control_frames() {
        let codec = MessageCodec::default();
        let id = EntityId::new("esc-123").unwrap();

        let subscribe = codec.encode(&OutboundEnvelope::Subscribe { id: id.clone() }).unwrap();
        let unsubscribe = codec.encode(&OutboundEnvelope::Unsubscribe { id }).unwrap();

        assert_eq!(parse(&subscribe), json!({"type": "subscribe", "id": "esc-123"}));
        assert_eq!(parse(&unsubscribe), json!({"type": "unsubscribe", "id": "esc-123"}));
    }

    #[test]
    fn encodes_ping() {
        let frame = MessageCodec::default().encode(&OutboundEnvelope::Ping).unwrap();
        assert_eq!(frame, r#"{"type":"ping"}"#);
    }

    #[test]
    fn decodes_chat_envelope() {
        let envelope: ChatEnvelope = MessageCodec::default()
            .decode(r#"{"type":"system","conversation_id":"c-1","content":"maintenance at noon"}"#)
            .unwrap();

        assert_eq!(envelope.message_type, ChatMessageType::System);
        assert_eq!(envelope.content, "maintenance at noon");
    }

    #[test]
    fn decodes_escalation_envelope() {
        let envelope: EscalationEnvelope = MessageCodec::default()
            .decode(r#"{"type":"stats_updated","data":{"total_active":2}}"#)
            .unwrap();

        assert_eq!(envelope.event_type, EscalationEventType::StatsUpdated);
    }

    #[test]
    fn non_json_is_malformed() {
        let result: Result<ChatEnvelope, _> = MessageCodec::default().decode("not json {");
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }

    #[test]
    fn json_without_type_is_malformed() {
        let result: Result<ChatEnvelope, _> = MessageCodec::default().decode(r#"{"content":"x"}"#);
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }

    #[test]
    fn oversized_frame_is_rejected_before_parsing() {
        let codec = MessageCodec::new(16);
        let frame = r#"{"type":"message","content":"this is far too long"}"#;

        let result: Result<ChatEnvelope, _> = codec.decode(frame);

        match result {
            Err(CodecError::FrameTooLarge { len, limit }) => {
                assert_eq!(len, frame.len());
                assert_eq!(limit, 16);
            }
            other => panic!("expected FrameTooLarge, got {:?}", other),
        }
    }
}
