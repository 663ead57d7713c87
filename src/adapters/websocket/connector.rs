//! tokio-tungstenite implementation of the transport port.
//!
//! Every `open` spawns one socket task that owns the WebSocket stream. The
//! task bridges the stream and the link's channels until either side goes
//! away.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use url::Url;

use crate::domain::connection::CloseEvent;
use crate::ports::{channel, Connector, TransportCommand, TransportEndpoint, TransportEvent, TransportLink};

/// Default bound on the opening handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Production WebSocket connector.
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    connect_timeout: Duration,
}

impl Default for TungsteniteConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl TungsteniteConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Connector for TungsteniteConnector {
    /// Must be called from within a tokio runtime.
    fn open(&self, url: &Url) -> TransportLink {
        let (link, endpoint) = channel();
        tokio::spawn(run_socket(url.clone(), endpoint, self.connect_timeout));
        link
    }
}

fn report_failure(endpoint: &TransportEndpoint, error: String) {
    endpoint.emit(TransportEvent::Failed(error.clone()));
    endpoint.emit(TransportEvent::Closed(CloseEvent::abnormal(error)));
}

async fn run_socket(url: Url, mut endpoint: TransportEndpoint, connect_timeout: Duration) {
    let stream = match tokio::time::timeout(connect_timeout, connect_async(url.as_str())).await {
        Ok(Ok((stream, _response))) => stream,
        Ok(Err(e)) => {
            report_failure(&endpoint, format!("WebSocket handshake failed: {}", e));
            return;
        }
        Err(_) => {
            report_failure(
                &endpoint,
                format!("WebSocket handshake timed out after {:?}", connect_timeout),
            );
            return;
        }
    };

    // The client may have given up while the handshake was in flight.
    if !endpoint.emit(TransportEvent::Opened) {
        return;
    }

    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            command = endpoint.next_command() => {
                match command {
                    Some(TransportCommand::Send(text)) => {
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            report_failure(&endpoint, format!("WebSocket send failed: {}", e));
                            return;
                        }
                    }
                    Some(TransportCommand::Close(close)) => {
                        let frame = CloseFrame {
                            code: CloseCode::from(close.code),
                            reason: close.reason.into(),
                        };
                        if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                            tracing::debug!(error = %e, "Failed to send close frame");
                        }
                    }
                    None => {
                        // Link dropped
                        let _ = sink.close().await;
                        return;
                    }
                }
            }

            message = source.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        endpoint.emit(TransportEvent::Frame(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => {
                            endpoint.emit(TransportEvent::Frame(text));
                        }
                        Err(_) => {
                            tracing::warn!(len = bytes.len(), "Dropping binary frame that is not UTF-8");
                        }
                    },
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sink.send(Message::Pong(data)).await {
                            tracing::debug!(error = %e, "Failed to answer ping");
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let close = frame
                            .map(|f| CloseEvent::new(u16::from(f.code), f.reason.as_str().to_owned()))
                            .unwrap_or_else(|| CloseEvent::new(CloseEvent::NO_STATUS, ""));
                        endpoint.emit(TransportEvent::Closed(close));
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        report_failure(&endpoint, format!("WebSocket error: {}", e));
                        return;
                    }
                    None => {
                        endpoint.emit(TransportEvent::Closed(CloseEvent::abnormal("stream ended")));
                        return;
                    }
                }
            }
        }
    }
}
