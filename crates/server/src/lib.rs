//! `bc-server` — the botchat server.
//!
//! Serves one WebSocket endpoint ([`bc_protocol::CHAT_WS_PATH`]) where each
//! connection is an independent chat session answered from the static
//! answer table, plus a couple of read-only HTTP endpoints.

pub mod api;
pub mod cli;
pub mod cors;
pub mod session;
pub mod state;
