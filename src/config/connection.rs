//! Connection configuration

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;
use crate::domain::connection::{OverflowPolicy, ReconnectPolicy};
use crate::domain::envelope::DEFAULT_MAX_FRAME_BYTES;

/// Everything one connection manager needs to reach its endpoint and
/// survive outages.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// WebSocket endpoint (`ws://` or `wss://`)
    pub endpoint: String,

    /// Identity appended as the `user_id` query parameter
    pub user_id: String,

    /// Logical channel
    #[serde(default = "default_channel")]
    pub channel: String,

    #[serde(default = "default_role")]
    pub role: String,

    pub conversation_id: Option<String>,

    pub thread_id: Option<String>,

    /// Pre-issued access token, sent as the `token` query parameter
    pub token: Option<String>,

    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,

    /// Fixed delay before every automatic reconnect
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    /// Ceiling on consecutive automatic reconnects
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Delay between disconnect and connect in a manual reconnect
    #[serde(default = "default_manual_reconnect_delay_ms")]
    pub manual_reconnect_delay_ms: u64,

    #[serde(default = "default_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,

    /// Frames held while the transport is down
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub overflow_policy: OverflowPolicy,

    /// Re-send subscriptions after a reconnect
    #[serde(default = "default_replay_subscriptions")]
    pub replay_subscriptions: bool,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Handshake timeout for the WebSocket transport
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ConnectionConfig {
    /// Configuration with every optional value at its default.
    pub fn new(endpoint: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_id: user_id.into(),
            channel: default_channel(),
            role: default_role(),
            conversation_id: None,
            thread_id: None,
            token: None,
            auto_reconnect: default_auto_reconnect(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            manual_reconnect_delay_ms: default_manual_reconnect_delay_ms(),
            keepalive_interval_secs: default_keepalive_interval_secs(),
            queue_capacity: default_queue_capacity(),
            overflow_policy: OverflowPolicy::default(),
            replay_subscriptions: default_replay_subscriptions(),
            max_frame_bytes: default_max_frame_bytes(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.auto_reconnect,
            Duration::from_millis(self.reconnect_interval_ms),
            self.max_reconnect_attempts,
        )
    }

    pub fn manual_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.manual_reconnect_delay_ms)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Parse the endpoint, enforcing a WebSocket scheme.
    pub fn endpoint_url(&self) -> Result<Url, ValidationError> {
        if self.endpoint.trim().is_empty() {
            return Err(ValidationError::MissingRequired("connection.endpoint"));
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| ValidationError::InvalidEndpoint(e.to_string()))?;

        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Validate connection configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.endpoint_url()?;

        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("connection.user_id"));
        }
        if self.channel.trim().is_empty() {
            return Err(ValidationError::MissingRequired("connection.channel"));
        }
        if self.reconnect_interval_ms == 0 {
            return Err(ValidationError::NotPositive("connection.reconnect_interval_ms"));
        }
        if self.keepalive_interval_secs == 0 {
            return Err(ValidationError::NotPositive("connection.keepalive_interval_secs"));
        }
        if self.queue_capacity == 0 {
            return Err(ValidationError::NotPositive("connection.queue_capacity"));
        }
        if self.max_frame_bytes == 0 {
            return Err(ValidationError::NotPositive("connection.max_frame_bytes"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::NotPositive("connection.connect_timeout_secs"));
        }
        Ok(())
    }
}

fn default_channel() -> String {
    "notifications".to_string()
}

fn default_role() -> String {
    "admin".to_string()
}

fn default_auto_reconnect() -> bool {
    true
}

fn default_reconnect_interval_ms() -> u64 {
    3000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_manual_reconnect_delay_ms() -> u64 {
    100
}

fn default_keepalive_interval_secs() -> u64 {
    30
}

fn default_queue_capacity() -> usize {
    256
}

fn default_replay_subscriptions() -> bool {
    true
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}

fn default_connect_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConnectionConfig {
        ConnectionConfig::new("wss://live.example.com/ws", "admin-1")
    }

    #[test]
    fn defaults_are_applied() {
        let config = valid();

        assert_eq!(config.channel, "notifications");
        assert_eq!(config.role, "admin");
        assert!(config.auto_reconnect);
        assert_eq!(config.reconnect_interval_ms, 3000);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.keepalive_interval(), Duration::from_secs(30));
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.overflow_policy, OverflowPolicy::DropOldest);
        assert!(config.replay_subscriptions);
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn http_endpoint_is_rejected() {
        let mut config = valid();
        config.endpoint = "https://live.example.com/ws".to_string();

        assert_eq!(
            config.validate(),
            Err(ValidationError::UnsupportedScheme("https".to_string()))
        );
    }

    #[test]
    fn unparseable_endpoint_is_rejected() {
        let mut config = valid();
        config.endpoint = "not a url".to_string();

        assert!(matches!(config.validate(), Err(ValidationError::InvalidEndpoint(_))));
    }

    #[test]
    fn empty_user_id_is_rejected() {
        let mut config = valid();
        config.user_id = "  ".to_string();

        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("connection.user_id"))
        );
    }

    #[test]
    fn zero_keepalive_is_rejected() {
        let mut config = valid();
        config.keepalive_interval_secs = 0;

        assert_eq!(
            config.validate(),
            Err(ValidationError::NotPositive("connection.keepalive_interval_secs"))
        );
    }

    #[test]
    fn zero_max_attempts_is_allowed() {
        let mut config = valid();
        config.max_reconnect_attempts = 0;

        assert!(config.validate().is_ok());
        assert_eq!(config.reconnect_policy().max_attempts(), 0);
    }

    #[test]
    fn reconnect_policy_reflects_settings() {
        let mut config = valid();
        config.auto_reconnect = false;
        config.reconnect_interval_ms = 250;

        let policy = config.reconnect_policy();
        assert!(!policy.is_enabled());
        assert_eq!(policy.interval(), Duration::from_millis(250));
    }
}
