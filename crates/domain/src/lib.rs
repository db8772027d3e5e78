//! `bc-domain` — shared model for the botchat server and client.
//!
//! Holds the chat message type, the static answer table with its
//! responder, configuration, and the shared error type.

pub mod answers;
pub mod config;
pub mod error;
pub mod message;

pub use answers::{AnswerEntry, AnswerLint, AnswerTable, Responder, FALLBACK_TEXT};
pub use error::{Error, Result};
pub use message::{ChatMessage, SenderKind};
