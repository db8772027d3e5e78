//! Chat protocol: WebSocket message envelope exchanged between the chat
//! view and the server.
//!
//! Every frame is a JSON text message tagged by `event`. A user utterance
//! travels as `bot` with a client-chosen `request_id`; the server answers
//! with exactly one `bot_reply` carrying the same id.

use bc_domain::ChatMessage;
use serde::{Deserialize, Serialize};

/// Path of the chat WebSocket endpoint.
pub const CHAT_WS_PATH: &str = "/v1/chat/ws";

/// WebSocket message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum WsMessage {
    /// Server → Client: the channel is live.
    #[serde(rename = "connected")]
    Connected { connected: bool },

    /// Server → Client: greeting, sent once per connection.
    #[serde(rename = "welcome")]
    Welcome { message: ChatMessage },

    /// Client → Server: a user utterance awaiting one reply.
    #[serde(rename = "bot")]
    Bot {
        request_id: String,
        utterance: String,
    },

    /// Server → Client: the reply to the `bot` request with `request_id`.
    #[serde(rename = "bot_reply")]
    BotReply {
        request_id: String,
        message: ChatMessage,
    },

    /// Bidirectional: heartbeat.
    #[serde(rename = "ping")]
    Ping { timestamp: i64 },

    /// Bidirectional: heartbeat response.
    #[serde(rename = "pong")]
    Pong { timestamp: i64 },
}

impl WsMessage {
    /// The `event` tag this message is sent under.
    pub fn event_name(&self) -> &'static str {
        match self {
            WsMessage::Connected { .. } => "connected",
            WsMessage::Welcome { .. } => "welcome",
            WsMessage::Bot { .. } => "bot",
            WsMessage::BotReply { .. } => "bot_reply",
            WsMessage::Ping { .. } => "ping",
            WsMessage::Pong { .. } => "pong",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
