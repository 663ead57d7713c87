//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the connection core and the outside world. Adapters implement these ports.
//!
//! - `Connector` / `TransportLink` - Opening and driving one text socket
//! - `Feed` - Channel-specific consumption of decoded envelopes

mod feed;
mod transport;

pub use feed::{Delivery, Feed};
pub use transport::{
    channel, Connector, TransportCommand, TransportEndpoint, TransportError, TransportEvent,
    TransportLink,
};
