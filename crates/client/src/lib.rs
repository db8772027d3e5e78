//! `bc-client` — client side of the botchat widget.
//!
//! Two halves:
//!
//! - [`ChatClient`] / [`ChatConnection`]: the WebSocket channel. Opens the
//!   connection, surfaces lifecycle events, and pairs every submitted
//!   utterance with its reply by `request_id`.
//! - [`ChatView`]: the presentation state (transcript, draft, live/offline
//!   indicator, auto-scroll target) plus the rendering rules in [`render`].
//!
//! # Connection flow
//!
//! 1. Connect WS to `ws://host:port/v1/chat/ws`
//! 2. Receive `connected`, then `welcome { message }`
//! 3. For each submission: send `bot { request_id, utterance }`, wait for
//!    `bot_reply { request_id, message }`
//! 4. On close: pending submissions fail with [`ClientError::ChannelClosed`];
//!    there is no automatic reconnect
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), bc_client::ClientError> {
//! use bc_client::{ChannelEvent, ChatClientBuilder, ChatView};
//!
//! let mut conn = ChatClientBuilder::new()
//!     .server_ws_url("ws://127.0.0.1:8080/v1/chat/ws")
//!     .build()?
//!     .connect()
//!     .await?;
//!
//! let mut view = ChatView::new();
//! while let Some(event) = conn.next_event().await {
//!     match event {
//!         ChannelEvent::Opened => view.on_channel_open(),
//!         ChannelEvent::Greeting(msg) => {
//!             view.on_greeting_received(msg);
//!             break;
//!         }
//!         ChannelEvent::Closed => view.on_channel_closed(),
//!     }
//! }
//!
//! view.on_draft_change("-help");
//! if let Some(utterance) = view.submit() {
//!     let reply = conn.ask(&utterance).await?;
//!     view.on_reply_received(reply);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod render;
pub mod types;
pub mod view;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::ChatClientBuilder;
pub use client::{ChatClient, ChatConnection};
pub use render::TerminalRenderer;
pub use types::{ChannelEvent, ClientError};
pub use view::{ChatView, ConnectionIndicator};

pub use bc_domain::{ChatMessage, SenderKind};
pub use bc_protocol::WsMessage;
