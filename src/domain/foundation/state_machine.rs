//! State machine trait for lifecycle enums.
//!
//! Gives lifecycle enums (currently [`ConnectionState`]) one place to declare
//! which transitions are legal, and a checked `transition_to` built on top.
//!
//! [`ConnectionState`]: crate::domain::connection::ConnectionState

use super::ValidationError;

/// Trait for enums that represent a finite state machine.
///
/// Implementors list their valid transitions; `transition_to` and
/// `is_terminal` are derived from that list.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for ConnectionState {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Idle => vec![Connecting, Closed],
///             Connecting => vec![Open, Closing, Closed],
///             // ... etc
///         }
///     }
/// }
///
/// let next = ConnectionState::Idle.transition_to(ConnectionState::Connecting)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if a transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs the transition with validation, returning an error if it is
    /// not allowed from the current state.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if the current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lamp {
        Off,
        Warming,
        On,
        Broken,
    }

    impl StateMachine for Lamp {
        fn valid_transitions(&self) -> Vec<Self> {
            use Lamp::*;
            match self {
                Off => vec![Warming, Broken],
                Warming => vec![On, Off, Broken],
                On => vec![Off, Broken],
                Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Lamp::Off.transition_to(Lamp::Warming), Ok(Lamp::Warming));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let err = Lamp::Off.transition_to(Lamp::On).unwrap_err();
        assert!(err.to_string().contains("Cannot transition from Off to On"));
    }

    #[test]
    fn can_transition_to_follows_valid_transitions() {
        assert!(Lamp::Warming.can_transition_to(&Lamp::On));
        assert!(!Lamp::On.can_transition_to(&Lamp::Warming));
    }

    #[test]
    fn is_terminal_only_for_states_without_exits() {
        assert!(Lamp::Broken.is_terminal());
        assert!(!Lamp::Off.is_terminal());
        assert!(!Lamp::On.is_terminal());
    }
}
