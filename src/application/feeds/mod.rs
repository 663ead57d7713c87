//! The two channel variants built on the connection manager.
//!
//! - `ChatFeed` / `ChatConnection` - generic chat and notification socket
//! - `SubscriptionRegistry` / `EscalationFeed` - escalation socket with
//!   subscriptions and aggregate statistics

mod chat;
mod escalation;

pub use chat::{ChatConnection, ChatFeed};
pub use escalation::{EscalationFeed, SubscriptionRegistry};
