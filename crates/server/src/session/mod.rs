//! Chat sessions: one per WebSocket connection.
//!
//! Each connection gets its own [`SessionContext`], passed explicitly to
//! every handler. There is no shared "current connection".
//!
//! Flow:
//! 1. Client connects to `/v1/chat/ws`
//! 2. Server sends `connected`, then the `welcome` greeting
//! 3. Each `bot { request_id, utterance }` goes to the [`UtteranceHandler`];
//!    its message is sent back once as `bot_reply { request_id, message }`
//! 4. `ping` is answered with `pong`
//! 5. On close the session is dropped from the registry; nothing persists

pub mod registry;
pub mod ws;

use bc_domain::{ChatMessage, Responder};
use bc_protocol::WsMessage;
use tokio::sync::mpsc;

/// Channel feeding a session's WebSocket writer task.
pub type SessionSink = mpsc::Sender<WsMessage>;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// The writer side of the connection is gone while the session is
    /// still handling events. Treated as a bug: the session is torn down.
    #[error("session {session_id}: connection missing")]
    ConnectionMissing { session_id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-connection handle: identity plus the outbound channel.
#[derive(Clone, Debug)]
pub struct SessionContext {
    session_id: String,
    sink: SessionSink,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, sink: SessionSink) -> Self {
        Self {
            session_id: session_id.into(),
            sink,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn send(&self, msg: WsMessage) -> Result<(), SessionError> {
        self.sink
            .send(msg)
            .await
            .map_err(|_| SessionError::ConnectionMissing {
                session_id: self.session_id.clone(),
            })
    }

    /// Announce the channel, then greet. Runs once per connection.
    pub async fn on_connect(&self, greeting: &str) -> Result<(), SessionError> {
        self.send(WsMessage::Connected { connected: true }).await?;
        self.send_greeting(greeting).await
    }

    pub async fn send_greeting(&self, greeting: &str) -> Result<(), SessionError> {
        self.send(WsMessage::Welcome {
            message: ChatMessage::bot(greeting),
        })
        .await
    }

    /// Reply slot for one `bot` request.
    pub fn reply_to(&self, request_id: impl Into<String>) -> Reply {
        Reply {
            request_id: request_id.into(),
            ctx: self.clone(),
        }
    }
}

/// Single-use reply for a `bot` request. Consumed by [`Reply::send`].
#[must_use = "every bot request must be answered"]
#[derive(Debug)]
pub struct Reply {
    request_id: String,
    ctx: SessionContext,
}

impl Reply {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub async fn send(self, message: ChatMessage) -> Result<(), SessionError> {
        self.ctx
            .send(WsMessage::BotReply {
                request_id: self.request_id,
                message,
            })
            .await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Computes the reply to a user utterance.
pub trait UtteranceHandler: Send + Sync + 'static {
    fn handle(&self, ctx: &SessionContext, utterance: &str) -> ChatMessage;
}

impl UtteranceHandler for Responder {
    fn handle(&self, _ctx: &SessionContext, utterance: &str) -> ChatMessage {
        self.respond(utterance)
    }
}

/// Process one inbound event for a session.
pub async fn dispatch(
    ctx: &SessionContext,
    handler: &dyn UtteranceHandler,
    msg: WsMessage,
) -> Result<(), SessionError> {
    match msg {
        WsMessage::Bot {
            request_id,
            utterance,
        } => {
            let reply = ctx.reply_to(request_id);
            let message = handler.handle(ctx, &utterance);
            tracing::debug!(
                session_id = %ctx.session_id(),
                request_id = %reply.request_id(),
                "sending reply"
            );
            reply.send(message).await
        }
        WsMessage::Ping { timestamp } => ctx.send(WsMessage::Pong { timestamp }).await,
        WsMessage::Pong { .. } => Ok(()),
        other => {
            tracing::debug!(
                session_id = %ctx.session_id(),
                event = other.event_name(),
                "unexpected inbound event"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bc_domain::{AnswerEntry, AnswerTable, FALLBACK_TEXT};

    use super::*;

    fn responder() -> Responder {
        Responder::new(Arc::new(AnswerTable::new(vec![AnswerEntry::new(
            "-help",
            "try -intro",
        )])))
    }

    fn session() -> (SessionContext, mpsc::Receiver<WsMessage>) {
        let (tx, rx) = mpsc::channel(8);
        (SessionContext::new("s1", tx), rx)
    }

    #[tokio::test]
    async fn on_connect_sends_connected_then_greeting() {
        let (ctx, mut rx) = session();
        ctx.on_connect("hi there").await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), WsMessage::Connected { connected: true });
        assert_eq!(
            rx.recv().await.unwrap(),
            WsMessage::Welcome {
                message: ChatMessage::bot("hi there")
            }
        );
    }

    #[tokio::test]
    async fn bot_request_gets_exactly_one_reply_with_same_id() {
        let (ctx, mut rx) = session();
        let handler = responder();

        dispatch(
            &ctx,
            &handler,
            WsMessage::Bot {
                request_id: "r1".into(),
                utterance: "-HELP".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            WsMessage::BotReply {
                request_id: "r1".into(),
                message: ChatMessage::bot("try -intro"),
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unmatched_request_gets_fallback() {
        let (ctx, mut rx) = session();
        dispatch(
            &ctx,
            &responder(),
            WsMessage::Bot {
                request_id: "r2".into(),
                utterance: "hi".into(),
            },
        )
        .await
        .unwrap();

        match rx.recv().await.unwrap() {
            WsMessage::BotReply { message, .. } => assert_eq!(message.text(), FALLBACK_TEXT),
            other => panic!("expected bot_reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ping_is_answered_with_pong() {
        let (ctx, mut rx) = session();
        dispatch(&ctx, &responder(), WsMessage::Ping { timestamp: 42 })
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap(), WsMessage::Pong { timestamp: 42 });
    }

    #[tokio::test]
    async fn server_only_events_are_ignored() {
        let (ctx, mut rx) = session();
        dispatch(&ctx, &responder(), WsMessage::Connected { connected: true })
            .await
            .unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn missing_connection_is_an_error() {
        let (ctx, rx) = session();
        drop(rx);

        let err = dispatch(
            &ctx,
            &responder(),
            WsMessage::Bot {
                request_id: "r3".into(),
                utterance: "-help".into(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SessionError::ConnectionMissing { ref session_id } if session_id == "s1"));
    }

    #[tokio::test]
    async fn handler_sees_session_context() {
        struct WhoAmI;
        impl UtteranceHandler for WhoAmI {
            fn handle(&self, ctx: &SessionContext, _utterance: &str) -> ChatMessage {
                ChatMessage::bot(ctx.session_id())
            }
        }

        let (ctx, mut rx) = session();
        dispatch(
            &ctx,
            &WhoAmI,
            WsMessage::Bot {
                request_id: "r4".into(),
                utterance: "who".into(),
            },
        )
        .await
        .unwrap();

        match rx.recv().await.unwrap() {
            WsMessage::BotReply { message, .. } => assert_eq!(message.text(), "s1"),
            other => panic!("expected bot_reply, got {other:?}"),
        }
    }
}
