//! Application layer - connection orchestration.
//!
//! - `live` - The connection manager, its driver task and observable state
//! - `feeds` - Chat and escalation channel variants

pub mod feeds;
pub mod live;

pub use feeds::{ChatConnection, ChatFeed, EscalationFeed, SubscriptionRegistry};
pub use live::{ConnectionManager, LiveSnapshot};
