//! WebSocket endpoint for chat sessions.

use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use bc_protocol::WsMessage;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::session::{dispatch, SessionContext};
use crate::state::AppState;

/// GET /v1/chat/ws — upgrade to WebSocket. No authentication.
pub async fn chat_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Socket handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How long queued replies get to reach the socket once the read side ends.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let session_id = uuid::Uuid::new_v4().to_string();

    // Outbound messages from handlers → writer task → socket.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<WsMessage>(64);
    let ctx = SessionContext::new(session_id.clone(), outbound_tx);

    state.sessions.register(&session_id);
    tracing::info!(session_id = %session_id, "session connected");

    // Runs until every sender is gone, then hands the sink back.
    let mut writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if send_ws_message(&mut ws_sink, &msg).await.is_err() {
                break;
            }
        }
        ws_sink
    });

    let close = match ctx.on_connect(&state.config.chat.greeting).await {
        Ok(()) => read_loop(&ctx, &mut ws_stream, &state).await,
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "failed to greet session");
            None
        }
    };

    // Last sender: the writer drains what is queued, then stops.
    drop(ctx);
    match tokio::time::timeout(FLUSH_TIMEOUT, &mut writer).await {
        Ok(Ok(mut sink)) => {
            if let Some(frame) = close {
                let _ = sink.send(Message::Close(Some(frame))).await;
            }
        }
        Ok(Err(e)) => tracing::warn!(session_id = %session_id, error = %e, "writer task failed"),
        Err(_) => {
            tracing::warn!(session_id = %session_id, "outbound flush timed out");
            writer.abort();
        }
    }

    state.sessions.remove(&session_id);
    tracing::info!(session_id = %session_id, "session disconnected");
}

/// Process inbound frames in arrival order until the client leaves.
///
/// Returns the close frame to send when the server ends the session
/// itself, `None` when the client went away or the connection broke.
async fn read_loop(
    ctx: &SessionContext,
    stream: &mut (impl StreamExt<Item = Result<Message, axum::Error>> + Unpin),
    state: &AppState,
) -> Option<CloseFrame<'static>> {
    let session_id = ctx.session_id();
    let max_bytes = state.config.server.max_message_bytes;

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => {
                state.sessions.touch(session_id);

                // An over-limit `bot` could never be answered, so the whole
                // session ends and the client's pending asks fail.
                if text.len() > max_bytes {
                    tracing::warn!(
                        session_id = %session_id,
                        bytes = text.len(),
                        max = max_bytes,
                        "inbound message exceeds max_message_bytes, closing session"
                    );
                    return Some(CloseFrame {
                        code: close_code::SIZE,
                        reason: "message too big".into(),
                    });
                }

                let ws_msg = match WsMessage::from_json(&text) {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::debug!(session_id = %session_id, error = %e, "ignoring unparseable message");
                        continue;
                    }
                };

                tracing::info!(
                    session_id = %session_id,
                    event = ws_msg.event_name(),
                    payload = %text,
                    "inbound event"
                );

                if matches!(ws_msg, WsMessage::Bot { .. }) {
                    state.sessions.record_request(session_id);
                }
                if let Err(e) = dispatch(ctx, state.handler.as_ref(), ws_msg).await {
                    tracing::error!(session_id = %session_id, error = %e, "session handler aborted");
                    return None;
                }
            }
            Message::Close(_) => return None,
            Message::Ping(_) | Message::Pong(_) => {
                // axum handles WS-level ping/pong automatically.
                state.sessions.touch(session_id);
            }
            Message::Binary(_) => {
                tracing::debug!(session_id = %session_id, "ignoring binary frame");
            }
        }
    }
    None
}

async fn send_ws_message(
    sink: &mut (impl SinkExt<Message> + Unpin),
    msg: &WsMessage,
) -> Result<(), ()> {
    let json = msg.to_json().map_err(|_| ())?;
    sink.send(Message::Text(json)).await.map_err(|_| ())
}
