//! Chat message model.
//!
//! On the wire a message is `{ "type": 0 | 1, "message": "..." }` where
//! `0` is the user and `1` is the bot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SenderKind {
    User,
    Bot,
}

impl From<SenderKind> for u8 {
    fn from(kind: SenderKind) -> u8 {
        match kind {
            SenderKind::User => 0,
            SenderKind::Bot => 1,
        }
    }
}

impl TryFrom<u8> for SenderKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SenderKind::User),
            1 => Ok(SenderKind::Bot),
            other => Err(format!("unknown sender type {other}, expected 0 (user) or 1 (bot)")),
        }
    }
}

impl fmt::Display for SenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderKind::User => f.write_str("user"),
            SenderKind::Bot => f.write_str("bot"),
        }
    }
}

/// A single transcript entry. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    sender: SenderKind,
    #[serde(rename = "message")]
    text: String,
}

impl ChatMessage {
    pub fn new(sender: SenderKind, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    /// A message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(SenderKind::User, text)
    }

    /// A message produced by the server.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(SenderKind::Bot, text)
    }

    pub fn sender(&self) -> SenderKind {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bot(&self) -> bool {
        self.sender == SenderKind::Bot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_message_wire_shape() {
        let msg = ChatMessage::bot("안녕하세요");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({ "type": 1, "message": "안녕하세요" }));
    }

    #[test]
    fn user_message_parses_from_wire() {
        let msg: ChatMessage = serde_json::from_str(r#"{"type":0,"message":"hi"}"#).unwrap();
        assert_eq!(msg.sender(), SenderKind::User);
        assert_eq!(msg.text(), "hi");
        assert!(!msg.is_bot());
    }

    #[test]
    fn unknown_sender_type_is_rejected() {
        let err = serde_json::from_str::<ChatMessage>(r#"{"type":2,"message":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown sender type 2"));
    }
}
