//! In-memory adapters for testing.
//!
//! These adapters are intended for unit and integration tests, and for
//! demos that should run without a server.

mod transport;

pub use transport::{MemoryConnector, MemoryPeer, MemoryServer};
