//! Admin Live - Resilient real-time connection core
//!
//! This crate keeps the admin application's live-update sockets (the generic
//! chat/notification channel and the escalation feed) connected: it owns the
//! connection state machine, bounded automatic reconnection, ordered
//! delivery of frames queued during outages, keepalive, and clean teardown.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
