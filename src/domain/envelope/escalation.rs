//! Envelopes of the escalation feed channel.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::InboundEnvelope;

/// Discriminant of an escalation envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EscalationEventType {
    EscalationCreated,
    EscalationUpdated,
    StatsUpdated,
    Other(String),
}

impl EscalationEventType {
    pub fn as_str(&self) -> &str {
        match self {
            EscalationEventType::EscalationCreated => "escalation_created",
            EscalationEventType::EscalationUpdated => "escalation_updated",
            EscalationEventType::StatsUpdated => "stats_updated",
            EscalationEventType::Other(other) => other,
        }
    }
}

impl From<String> for EscalationEventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "escalation_created" => EscalationEventType::EscalationCreated,
            "escalation_updated" => EscalationEventType::EscalationUpdated,
            "stats_updated" => EscalationEventType::StatsUpdated,
            _ => EscalationEventType::Other(value),
        }
    }
}

impl From<EscalationEventType> for String {
    fn from(value: EscalationEventType) -> Self {
        match value {
            EscalationEventType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EscalationEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound envelope on the escalation channel: a type tag plus free-form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationEnvelope {
    #[serde(rename = "type")]
    pub event_type: EscalationEventType,

    #[serde(default)]
    pub data: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl EscalationEnvelope {
    /// The `id` field of `data`, when present.
    pub fn entity_id(&self) -> Option<&str> {
        self.data.get("id").and_then(|v| v.as_str())
    }
}

impl InboundEnvelope for EscalationEnvelope {
    fn kind(&self) -> &str {
        self.event_type.as_str()
    }
}
