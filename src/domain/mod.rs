//! Domain layer containing the connection rules and wire types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, state machine trait)
//! - `connection` - Connection lifecycle state, reconnect policy, outbound queue
//! - `envelope` - Inbound/outbound envelopes and the JSON codec
//! - `escalation` - Subscription set and aggregate statistics

pub mod connection;
pub mod envelope;
pub mod escalation;
pub mod foundation;
