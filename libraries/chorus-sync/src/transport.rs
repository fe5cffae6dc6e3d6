//! Pluggable connections behind a change channel.

use crate::error::ChannelError;
use crate::message::ChannelMessage;
use async_trait::async_trait;

/// One live, bidirectional connection to the push endpoint.
#[async_trait]
pub trait ChannelTransport: Send {
    /// Send one frame.
    async fn send(&mut self, message: ChannelMessage) -> Result<(), ChannelError>;

    /// Next frame from the peer; `None` once the peer has closed.
    ///
    /// Must be cancel safe: the channel polls it inside `select!`.
    async fn recv(&mut self) -> Option<Result<ChannelMessage, ChannelError>>;

    /// Close the connection gracefully.
    async fn close(&mut self) -> Result<(), ChannelError>;
}

/// Opens transports; called on open and on every reconnect.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    /// Establish a fresh connection.
    async fn connect(&self) -> Result<Box<dyn ChannelTransport>, ChannelError>;
}
