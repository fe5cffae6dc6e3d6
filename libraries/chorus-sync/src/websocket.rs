//! Websocket transport (tokio-tungstenite).

use crate::error::ChannelError;
use crate::message::ChannelMessage;
use crate::transport::{ChannelConnector, ChannelTransport};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

/// Connects to `<base_url><path>` over ws:// or wss://.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: Url,
}

impl WebSocketConnector {
    /// Build a connector, validating the endpoint.
    pub fn new(base_url: &str, path: &str) -> Result<Self, ChannelError> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(ChannelError::InvalidUrl("URL cannot be empty".into()));
        }
        if !base.starts_with("ws://") && !base.starts_with("wss://") {
            return Err(ChannelError::InvalidUrl(
                "URL must start with ws:// or wss://".into(),
            ));
        }

        let path = path.trim();
        let full = if path.is_empty() {
            base.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        };
        let url = Url::parse(&full).map_err(|e| ChannelError::InvalidUrl(e.to_string()))?;

        Ok(Self { url })
    }

    /// Endpoint this connector dials
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait]
impl ChannelConnector for WebSocketConnector {
    async fn connect(&self) -> Result<Box<dyn ChannelTransport>, ChannelError> {
        debug!(url = %self.url, "Connecting change channel");
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        Ok(Box::new(WebSocketTransport { stream }))
    }
}

/// A connected websocket carrying JSON text frames.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl ChannelTransport for WebSocketTransport {
    async fn send(&mut self, message: ChannelMessage) -> Result<(), ChannelError> {
        let text = message.to_text()?;
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<ChannelMessage, ChannelError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(ChannelMessage::from_text(&text)),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Change channel closed by peer");
                    return None;
                }
                // Pings are answered by tungstenite itself
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Ok(Message::Binary(bytes)) => {
                    warn!(size = bytes.len(), "Ignoring binary frame on change channel");
                }
                Err(e) => return Some(Err(ChannelError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }
}
