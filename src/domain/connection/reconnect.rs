//! Reconnect policy - fixed-interval retry with an attempt ceiling.
//!
//! ## Rules
//!
//! - Every scheduled attempt waits the same interval (no exponential growth).
//! - The close code is advisory: normal (1000) and abnormal (1006) closes are
//!   both retried, unless the close was caused by an explicit disconnect.
//! - Once `attempts == max_attempts` the policy stops scheduling and reports
//!   exhaustion. Only a manual reconnect clears that condition.
//!
//! ## Attempt accounting
//!
//! ```text
//! close ──[intentional]──────────────► Suppressed
//! close ──[disabled]─────────────────► Disabled
//! close ──[attempts <  max]──────────► Schedule (attempts += 1)
//! close ──[attempts == max]──────────► Exhausted (terminal)
//! open / manual reconnect ───────────► attempts = 0
//! ```

use std::time::Duration;

use super::CloseEvent;

/// Outcome of consulting the policy after a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Reconnect after `delay`; this is attempt number `attempt` (1-based).
    Schedule { delay: Duration, attempt: u32 },

    /// The close came from an explicit disconnect.
    Suppressed,

    /// Automatic reconnection is switched off.
    Disabled,

    /// The ceiling was reached; nothing more is scheduled.
    Exhausted { attempts: u32 },
}

/// Fixed-interval reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    enabled: bool,
    interval: Duration,
    max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_millis(3000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    pub fn new(enabled: bool, interval: Duration, max_attempts: u32) -> Self {
        Self {
            enabled,
            interval,
            max_attempts,
        }
    }

    /// Enabled policy with the given interval and ceiling.
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self::new(true, interval, max_attempts)
    }

    /// Policy that never schedules a reconnect.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide what to do about `close`, updating the attempt counter.
    pub fn on_close(&self, state: &mut ReconnectState, close: &CloseEvent) -> ReconnectDecision {
        if state.intentional_close {
            return ReconnectDecision::Suppressed;
        }
        if !self.enabled {
            return ReconnectDecision::Disabled;
        }
        if state.attempts >= self.max_attempts {
            state.exhausted = true;
            return ReconnectDecision::Exhausted {
                attempts: state.attempts,
            };
        }

        state.attempts += 1;
        tracing::trace!(
            code = close.code,
            attempt = state.attempts,
            max_attempts = self.max_attempts,
            "reconnect attempt granted"
        );
        ReconnectDecision::Schedule {
            delay: self.interval,
            attempt: state.attempts,
        }
    }
}

/// Mutable reconnect bookkeeping owned by one connection manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconnectState {
    attempts: u32,
    intentional_close: bool,
    exhausted: bool,
}

impl ReconnectState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts scheduled since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True after an explicit disconnect, until the next connect.
    pub fn is_intentional_close(&self) -> bool {
        self.intentional_close
    }

    /// True once the ceiling was hit, until an open or manual reconnect.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// The transport reached Open.
    pub fn on_open(&mut self) {
        self.attempts = 0;
        self.exhausted = false;
    }

    /// A connect was requested by the caller.
    pub fn on_connect(&mut self) {
        self.intentional_close = false;
    }

    /// An explicit disconnect; suppresses reconnects until the next connect.
    pub fn on_disconnect(&mut self) {
        self.intentional_close = true;
        self.attempts = 0;
    }

    /// A manual reconnect; the only way out of exhaustion.
    pub fn on_manual_reconnect(&mut self) {
        self.attempts = 0;
        self.exhausted = false;
        self.intentional_close = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn abnormal() -> CloseEvent {
        CloseEvent::abnormal("")
    }

    #[test]
    fn default_policy_values() {
        let policy = ReconnectPolicy::default();
        assert!(policy.is_enabled());
        assert_eq!(policy.interval(), Duration::from_millis(3000));
        assert_eq!(policy.max_attempts(), 5);
    }

    #[test]
    fn abnormal_close_schedules_after_fixed_interval() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(500), 3);
        let mut state = ReconnectState::new();

        let first = policy.on_close(&mut state, &abnormal());
        let second = policy.on_close(&mut state, &abnormal());

        assert_eq!(
            first,
            ReconnectDecision::Schedule {
                delay: Duration::from_millis(500),
                attempt: 1
            }
        );
        assert_eq!(
            second,
            ReconnectDecision::Schedule {
                delay: Duration::from_millis(500),
                attempt: 2
            }
        );
    }

    #[test]
    fn normal_close_is_retried_when_not_intentional() {
        let policy = ReconnectPolicy::fixed(Duration::from_secs(1), 3);
        let mut state = ReconnectState::new();

        let decision = policy.on_close(&mut state, &CloseEvent::normal("server restart"));
        assert!(matches!(decision, ReconnectDecision::Schedule { attempt: 1, .. }));
    }

    #[test]
    fn intentional_close_is_never_retried() {
        let policy = ReconnectPolicy::fixed(Duration::from_secs(1), 3);
        let mut state = ReconnectState::new();
        state.on_disconnect();

        assert_eq!(
            policy.on_close(&mut state, &abnormal()),
            ReconnectDecision::Suppressed
        );
        assert_eq!(state.attempts(), 0);
    }

    #[test]
    fn disabled_policy_never_schedules() {
        let policy = ReconnectPolicy::disabled();
        let mut state = ReconnectState::new();

        assert_eq!(
            policy.on_close(&mut state, &abnormal()),
            ReconnectDecision::Disabled
        );
    }

    #[test]
    fn ceiling_reports_exhaustion_and_stays_exhausted() {
        let policy = ReconnectPolicy::fixed(Duration::from_secs(1), 2);
        let mut state = ReconnectState::new();

        policy.on_close(&mut state, &abnormal());
        policy.on_close(&mut state, &abnormal());
        let third = policy.on_close(&mut state, &abnormal());
        let fourth = policy.on_close(&mut state, &abnormal());

        assert_eq!(third, ReconnectDecision::Exhausted { attempts: 2 });
        assert_eq!(fourth, ReconnectDecision::Exhausted { attempts: 2 });
        assert!(state.is_exhausted());
    }

    #[test]
    fn open_resets_attempts_and_exhaustion() {
        let policy = ReconnectPolicy::fixed(Duration::from_secs(1), 1);
        let mut state = ReconnectState::new();
        policy.on_close(&mut state, &abnormal());
        policy.on_close(&mut state, &abnormal());
        assert!(state.is_exhausted());

        state.on_open();

        assert_eq!(state.attempts(), 0);
        assert!(!state.is_exhausted());
    }

    #[test]
    fn manual_reconnect_clears_every_flag() {
        let mut state = ReconnectState::new();
        state.on_disconnect();
        state.on_manual_reconnect();

        assert_eq!(state, ReconnectState::new());
    }

    #[test]
    fn connect_clears_intentional_flag_only() {
        let policy = ReconnectPolicy::fixed(Duration::from_secs(1), 0);
        let mut state = ReconnectState::new();
        policy.on_close(&mut state, &abnormal());
        state.on_disconnect();

        state.on_connect();

        assert!(!state.is_intentional_close());
        assert!(state.is_exhausted());
    }

    proptest! {
        #[test]
        fn consecutive_failures_schedule_exactly_max_attempts(max in 0u32..20, closes in 0usize..40) {
            let policy = ReconnectPolicy::fixed(Duration::from_millis(10), max);
            let mut state = ReconnectState::new();

            let scheduled = (0..closes)
                .map(|_| policy.on_close(&mut state, &abnormal()))
                .filter(|d| matches!(d, ReconnectDecision::Schedule { .. }))
                .count();

            prop_assert_eq!(scheduled, closes.min(max as usize));
            prop_assert!(state.attempts() <= max);
            prop_assert_eq!(state.is_exhausted(), closes > max as usize);
        }
    }
}
