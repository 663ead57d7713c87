//! WebSocket transport adapter.
//!
//! Implements the `Connector` port over tokio-tungstenite. TLS endpoints
//! (`wss://`) use rustls with the webpki root store.

mod connector;

pub use connector::{TungsteniteConnector, DEFAULT_CONNECT_TIMEOUT};
