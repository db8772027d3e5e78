//! Builder pattern for constructing a [`ChatClient`].

use std::time::Duration;

use crate::client::ChatClient;
use crate::types::ClientError;

/// Fluent builder for [`ChatClient`].
///
/// # Example
///
/// ```rust,no_run
/// # use bc_client::ChatClientBuilder;
/// let client = ChatClientBuilder::new()
///     .server_ws_url("ws://localhost:8080/v1/chat/ws")
///     .heartbeat_interval(Some(std::time::Duration::from_secs(30)))
///     .build()
///     .unwrap();
/// ```
pub struct ChatClientBuilder {
    pub(crate) server_ws_url: String,
    pub(crate) heartbeat_interval: Option<Duration>,
    pub(crate) max_message_bytes: usize,
}

impl ChatClientBuilder {
    pub fn new() -> Self {
        Self {
            server_ws_url: "ws://127.0.0.1:8080/v1/chat/ws".into(),
            heartbeat_interval: Some(Duration::from_secs(30)),
            max_message_bytes: 64 * 1024, // 64 KB
        }
    }

    /// Set the server WebSocket URL (e.g. `ws://chat.example.com/v1/chat/ws`).
    pub fn server_ws_url(mut self, url: impl Into<String>) -> Self {
        self.server_ws_url = url.into();
        self
    }

    /// Interval between `ping` frames. `None` disables the heartbeat.
    pub fn heartbeat_interval(mut self, d: Option<Duration>) -> Self {
        self.heartbeat_interval = d;
        self
    }

    /// Inbound frames larger than this are dropped (default 64 KB).
    pub fn max_message_bytes(mut self, n: usize) -> Self {
        self.max_message_bytes = n;
        self
    }

    /// Build the [`ChatClient`].
    pub fn build(self) -> Result<ChatClient, ClientError> {
        if self.server_ws_url.is_empty() {
            return Err(ClientError::Config("server_ws_url is required".into()));
        }
        if !self.server_ws_url.starts_with("ws://") && !self.server_ws_url.starts_with("wss://") {
            return Err(ClientError::Config(format!(
                "server_ws_url must start with ws:// or wss://, got {}",
                self.server_ws_url
            )));
        }
        if self.heartbeat_interval == Some(Duration::ZERO) {
            return Err(ClientError::Config("heartbeat_interval must be non-zero".into()));
        }

        Ok(ChatClient {
            server_ws_url: self.server_ws_url,
            heartbeat_interval: self.heartbeat_interval,
            max_message_bytes: self.max_message_bytes,
        })
    }
}

impl Default for ChatClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
