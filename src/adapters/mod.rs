//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the connection core to external systems:
//! - `websocket` - tokio-tungstenite transport (production)
//! - `memory` - In-process transport (tests, demos)

pub mod memory;
pub mod websocket;

pub use memory::{MemoryConnector, MemoryPeer, MemoryServer};
pub use websocket::TungsteniteConnector;
