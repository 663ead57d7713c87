//! Live connection management.
//!
//! [`ConnectionManager`] is the only entry point. It glues the connection
//! domain (state, reconnect policy, outbound queue), the envelope codec, a
//! keepalive schedule and a [`Feed`](crate::ports::Feed) together behind a
//! single driver task.

mod driver;
mod keepalive;
mod manager;
mod snapshot;
mod target;

pub use keepalive::KeepAlive;
pub use manager::ConnectionManager;
pub use snapshot::LiveSnapshot;
pub use target::ConnectionTarget;
