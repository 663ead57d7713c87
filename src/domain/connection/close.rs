//! Close events reported by the transport.

use std::fmt;

/// A transport close with its WebSocket close code and reason.
///
/// The code is advisory: the reconnect decision depends on whether the
/// close was intentional, not on the code itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
    pub code: u16,
    pub reason: String,
}

impl CloseEvent {
    /// Normal closure.
    pub const NORMAL: u16 = 1000;
    /// No status code was present in the close frame.
    pub const NO_STATUS: u16 = 1005;
    /// Connection dropped without a close frame.
    pub const ABNORMAL: u16 = 1006;

    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// A 1000 close, as sent by an explicit client disconnect.
    pub fn normal(reason: impl Into<String>) -> Self {
        Self::new(Self::NORMAL, reason)
    }

    /// A 1006 close, used when the transport vanished or failed.
    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self::new(Self::ABNORMAL, reason)
    }

    pub fn is_normal(&self) -> bool {
        self.code == Self::NORMAL
    }

    pub fn is_abnormal(&self) -> bool {
        self.code == Self::ABNORMAL
    }
}

impl fmt::Display for CloseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} ({})", self.code, self.reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_expected_codes() {
        assert!(CloseEvent::normal("bye").is_normal());
        assert!(CloseEvent::abnormal("lost").is_abnormal());
        assert!(!CloseEvent::new(4001, "custom").is_normal());
    }

    #[test]
    fn display_includes_reason_when_present() {
        assert_eq!(CloseEvent::abnormal("").to_string(), "1006");
        assert_eq!(CloseEvent::normal("bye").to_string(), "1000 (bye)");
    }
}
