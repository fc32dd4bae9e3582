//! Message transport used by the session driver

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{FishingError, Result};

/// Inbound event seen by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Text(String),
    Closed,
}

/// Bidirectional text-frame channel to the game server
pub trait FrameTransport: Send {
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<()>> + Send;

    /// Next text frame, or `Closed` once the peer is gone
    fn recv(&mut self) -> impl Future<Output = Result<Inbound>> + Send;

    /// Best-effort close initiated by the client
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Opens transports for a given account token
pub trait Connector: Send + Sync {
    type Transport: FrameTransport;

    fn connect(&self, token: &str) -> impl Future<Output = Result<Self::Transport>> + Send;
}

/// Live WebSocket transport
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl FrameTransport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Inbound> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Inbound::Text(text)),
                Some(Ok(Message::Binary(bin))) => match String::from_utf8(bin) {
                    Ok(text) => return Ok(Inbound::Text(text)),
                    Err(_) => {
                        tracing::warn!("[protocol] Skipping non-UTF-8 binary frame");
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!("Closed by server: {:?}", frame);
                    return Ok(Inbound::Closed);
                }
                // ping/pong are answered by tungstenite itself
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(FishingError::from(e)),
                None => return Ok(Inbound::Closed),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::trace!("Close handshake failed: {}", e);
        }
    }
}

/// Connects to `{ws_url}/?token=<token>`
#[derive(Debug, Clone)]
pub struct WsConnector {
    ws_url: String,
}

impl WsConnector {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn session_url(&self, token: &str) -> String {
        format!("{}/?token={}", self.ws_url, token)
    }
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, token: &str) -> Result<WsTransport> {
        let (stream, response) = connect_async(self.session_url(token)).await?;
        tracing::debug!("WebSocket connected ({})", response.status());
        Ok(WsTransport { stream })
    }
}
