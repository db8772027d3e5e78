//! Channel events and client errors.

use bc_domain::ChatMessage;

/// Lifecycle and push events surfaced by a [`ChatConnection`](crate::ChatConnection).
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The WebSocket handshake completed.
    Opened,
    /// The server's `welcome` message.
    Greeting(ChatMessage),
    /// The connection ended. No further events follow.
    Closed,
}

/// Top-level client error.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("config: {0}")]
    Config(String),
    #[error("websocket: {0}")]
    WebSocket(String),
    #[error("channel closed")]
    ChannelClosed,
    #[error("message is {bytes} bytes, limit is {max}")]
    TooLarge { bytes: usize, max: usize },
}
