//! User-visible connection errors.

use thiserror::Error;

/// The error surfaced through a manager's `connection_error`.
///
/// Transport errors are transient and cleared by the next successful open.
/// `Capacity` is terminal: it persists until a manual reconnect.
/// Undecodable frames are never stored here; they are only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection lost: gave up after {attempts} reconnection attempts")]
    Capacity { attempts: u32 },
}

impl ConnectionError {
    /// True for the condition that requires a manual reconnect.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionError::Capacity { .. })
    }

    /// Stable code for hosting UIs.
    pub fn code(&self) -> &'static str {
        match self {
            ConnectionError::Transport(_) => "TRANSPORT_ERROR",
            ConnectionError::Capacity { .. } => "RECONNECT_EXHAUSTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_capacity_is_terminal() {
        assert!(ConnectionError::Capacity { attempts: 5 }.is_terminal());
        assert!(!ConnectionError::Transport("reset".into()).is_terminal());
    }

    #[test]
    fn capacity_message_names_attempts() {
        let err = ConnectionError::Capacity { attempts: 3 };
        assert_eq!(
            err.to_string(),
            "Connection lost: gave up after 3 reconnection attempts"
        );
        assert_eq!(err.code(), "RECONNECT_EXHAUSTED");
    }
}
