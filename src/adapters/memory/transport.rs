//! In-process transport for tests and demos.
//!
//! [`MemoryConnector`] hands every link it opens to a [`MemoryServer`] as a
//! [`MemoryPeer`]. The peer plays the remote end: it accepts, pushes frames,
//! fails or closes, and reads what the client sent.
//!
//! Dropping a peer without closing it looks like a vanished socket to the
//! client (abnormal close, 1006).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use url::Url;

use crate::domain::connection::CloseEvent;
use crate::ports::{channel, Connector, TransportCommand, TransportEndpoint, TransportEvent, TransportLink};

/// Connector that never touches the network.
#[derive(Debug)]
pub struct MemoryConnector {
    peers: mpsc::UnboundedSender<MemoryPeer>,
    opened: Arc<AtomicUsize>,
    auto_accept: bool,
}

impl MemoryConnector {
    /// Peers must be accepted explicitly.
    pub fn new() -> (Self, MemoryServer) {
        Self::build(false)
    }

    /// Every link reports `Opened` as soon as it is created.
    pub fn auto_accepting() -> (Self, MemoryServer) {
        Self::build(true)
    }

    fn build(auto_accept: bool) -> (Self, MemoryServer) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        let opened = Arc::new(AtomicUsize::new(0));

        (
            Self {
                peers: peers_tx,
                opened: Arc::clone(&opened),
                auto_accept,
            },
            MemoryServer {
                peers: peers_rx,
                opened,
            },
        )
    }

    /// Number of transports opened so far.
    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryConnector {
    fn open(&self, url: &Url) -> TransportLink {
        let (link, endpoint) = channel();
        self.opened.fetch_add(1, Ordering::SeqCst);

        let peer = MemoryPeer {
            url: url.clone(),
            endpoint,
        };
        if self.auto_accept {
            peer.accept();
        }
        if self.peers.send(peer).is_err() {
            tracing::debug!("Memory server is gone; link will close abnormally");
        }

        link
    }
}

/// Receives the peers of every link the paired connector opens.
#[derive(Debug)]
pub struct MemoryServer {
    peers: mpsc::UnboundedReceiver<MemoryPeer>,
    opened: Arc<AtomicUsize>,
}

impl MemoryServer {
    pub async fn next_peer(&mut self) -> Option<MemoryPeer> {
        self.peers.recv().await
    }

    pub fn try_next_peer(&mut self) -> Option<MemoryPeer> {
        self.peers.try_recv().ok()
    }

    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

/// Remote end of one in-memory link.
#[derive(Debug)]
pub struct MemoryPeer {
    url: Url,
    endpoint: TransportEndpoint,
}

impl MemoryPeer {
    /// URL the client asked for.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Completes the handshake.
    pub fn accept(&self) -> bool {
        self.endpoint.emit(TransportEvent::Opened)
    }

    pub fn push_frame(&self, frame: impl Into<String>) -> bool {
        self.endpoint.emit(TransportEvent::Frame(frame.into()))
    }

    /// Reports an error without closing.
    pub fn fail(&self, error: impl Into<String>) -> bool {
        self.endpoint.emit(TransportEvent::Failed(error.into()))
    }

    /// Closes from the server side. Later client sends fail.
    pub fn close(self, code: u16, reason: impl Into<String>) {
        self.endpoint
            .emit(TransportEvent::Closed(CloseEvent::new(code, reason)));
    }

    /// Next raw command from the client.
    pub async fn recv(&mut self) -> Option<TransportCommand> {
        self.endpoint.next_command().await
    }

    /// Next text frame the client sent. `None` once the client closed or
    /// dropped the link.
    pub async fn next_frame(&mut self) -> Option<String> {
        match self.endpoint.next_command().await {
            Some(TransportCommand::Send(frame)) => Some(frame),
            Some(TransportCommand::Close(_)) | None => None,
        }
    }

    /// Like [`next_frame`](Self::next_frame) without waiting.
    pub fn try_next_frame(&mut self) -> Option<String> {
        match self.endpoint.try_next_command() {
            Some(TransportCommand::Send(frame)) => Some(frame),
            _ => None,
        }
    }

    /// True once the client dropped its link.
    pub fn is_released(&self) -> bool {
        self.endpoint.is_link_dropped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("ws://memory.test/ws").unwrap()
    }

    #[tokio::test]
    async fn open_hands_peer_to_server_and_counts() {
        let (connector, mut server) = MemoryConnector::new();

        let mut link = connector.open(&url());
        let peer = server.next_peer().await.unwrap();

        assert_eq!(connector.opened_count(), 1);
        assert_eq!(server.opened_count(), 1);
        assert_eq!(peer.url().host_str(), Some("memory.test"));

        peer.accept();
        assert_eq!(link.next_event().await, TransportEvent::Opened);
    }

    #[tokio::test]
    async fn auto_accepting_connector_opens_immediately() {
        let (connector, mut server) = MemoryConnector::auto_accepting();

        let mut link = connector.open(&url());
        let _peer = server.next_peer().await.unwrap();

        assert_eq!(link.next_event().await, TransportEvent::Opened);
    }

    #[tokio::test]
    async fn peer_reads_client_frames_until_close() {
        let (connector, mut server) = MemoryConnector::new();
        let link = connector.open(&url());
        let mut peer = server.next_peer().await.unwrap();

        link.send_text("one").unwrap();
        link.close(CloseEvent::normal("done"));

        assert_eq!(peer.next_frame().await.as_deref(), Some("one"));
        assert_eq!(peer.next_frame().await, None);
        assert_eq!(peer.try_next_frame(), None);
    }

    #[tokio::test]
    async fn closed_peer_rejects_client_sends() {
        let (connector, mut server) = MemoryConnector::new();
        let mut link = connector.open(&url());
        let peer = server.next_peer().await.unwrap();

        peer.close(4000, "kicked");

        assert_eq!(
            link.next_event().await,
            TransportEvent::Closed(CloseEvent::new(4000, "kicked"))
        );
        assert!(link.send_text("too late").is_err());
    }

    #[tokio::test]
    async fn dropped_link_releases_peer() {
        let (connector, mut server) = MemoryConnector::new();
        let link = connector.open(&url());
        let peer = server.next_peer().await.unwrap();

        assert!(!peer.is_released());
        drop(link);
        assert!(peer.is_released());
    }
}
