//! Foundation module - Shared domain primitives.
//!
//! Value objects, identifiers and error types used by every other
//! domain module.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ConnectionId, EntityId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
