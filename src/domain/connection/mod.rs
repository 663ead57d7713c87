//! Connection domain - lifecycle state, reconnect rules and the outbound queue.
//!
//! Everything here is synchronous and runtime-free. The connection manager
//! in `application::live` drives these types from its event loop.

mod close;
mod error;
mod outbound_queue;
mod reconnect;
mod state;

pub use close::CloseEvent;
pub use error::ConnectionError;
pub use outbound_queue::{Enqueued, FlushInterrupted, OutboundQueue, OverflowPolicy, QueuedMessage};
pub use reconnect::{ReconnectDecision, ReconnectPolicy, ReconnectState};
pub use state::ConnectionState;
