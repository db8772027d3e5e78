//! Core chat client — manages the WebSocket lifecycle, heartbeat, and
//! request/reply pairing for submitted utterances.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bc_domain::ChatMessage;
use bc_protocol::WsMessage;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::types::{ChannelEvent, ClientError};

/// Map of request_id → waiting `ask` call.
type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ChatMessage>>>>;

/// A configured chat client.
///
/// Create via [`ChatClientBuilder`](crate::builder::ChatClientBuilder).
#[derive(Debug, Clone)]
pub struct ChatClient {
    pub(crate) server_ws_url: String,
    pub(crate) heartbeat_interval: Option<Duration>,
    pub(crate) max_message_bytes: usize,
}

impl ChatClient {
    /// Start a new builder.
    pub fn builder() -> crate::builder::ChatClientBuilder {
        crate::builder::ChatClientBuilder::new()
    }

    pub fn server_ws_url(&self) -> &str {
        &self.server_ws_url
    }

    /// Open the channel.
    ///
    /// The returned connection immediately yields [`ChannelEvent::Opened`];
    /// the server's greeting follows as [`ChannelEvent::Greeting`].
    pub async fn connect(&self) -> Result<ChatConnection, ClientError> {
        tracing::info!(url = %self.server_ws_url, "connecting to chat server");

        let (ws, _response) = tokio_tungstenite::connect_async(&self.server_ws_url)
            .await
            .map_err(|e| ClientError::WebSocket(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<WsMessage>(64);
        let (event_tx, event_rx) = mpsc::channel::<ChannelEvent>(64);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        // Fresh channel, the receiver is still empty.
        let _ = event_tx.try_send(ChannelEvent::Opened);

        let mut tasks = Vec::with_capacity(3);

        // Writer task: sends outbound messages to the WebSocket.
        tasks.push(tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let json = match msg.to_json() {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize outbound message");
                        continue;
                    }
                };
                if sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }));

        // Ping task: emit heartbeat pings.
        if let Some(every) = self.heartbeat_interval {
            let ping_tx = outbound_tx.clone();
            tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(every);
                // The first tick fires immediately; skip it.
                interval.tick().await;
                loop {
                    interval.tick().await;
                    let msg = WsMessage::Ping {
                        timestamp: Utc::now().timestamp_millis(),
                    };
                    if ping_tx.send(msg).await.is_err() {
                        break;
                    }
                }
            }));
        }

        // Reader task: routes replies to waiting asks, pushes events.
        let reader_pending = pending.clone();
        let reader_closed = closed.clone();
        let pong_tx = outbound_tx.clone();
        let max_bytes = self.max_message_bytes;
        tasks.push(tokio::spawn(async move {
            while let Some(Ok(msg)) = stream.next().await {
                match msg {
                    Message::Text(ref text) => {
                        // Dropping the frame could strand an ask, so the
                        // channel is closed instead.
                        if text.len() > max_bytes {
                            tracing::warn!(
                                bytes = text.len(),
                                max = max_bytes,
                                "inbound message exceeds max_message_bytes, closing channel"
                            );
                            break;
                        }

                        match WsMessage::from_json(text) {
                            Ok(WsMessage::Welcome { message }) => {
                                if event_tx.send(ChannelEvent::Greeting(message)).await.is_err() {
                                    tracing::debug!("event receiver dropped, greeting discarded");
                                }
                            }
                            Ok(WsMessage::BotReply {
                                request_id,
                                message,
                            }) => {
                                let waiter = reader_pending.lock().remove(&request_id);
                                match waiter {
                                    Some(tx) => {
                                        let _ = tx.send(message);
                                    }
                                    None => {
                                        tracing::warn!(
                                            request_id = %request_id,
                                            "reply for unknown request, dropping"
                                        );
                                    }
                                }
                            }
                            Ok(WsMessage::Connected { connected }) => {
                                tracing::debug!(connected, "server acknowledged connection");
                            }
                            Ok(WsMessage::Ping { timestamp }) => {
                                let _ = pong_tx.send(WsMessage::Pong { timestamp }).await;
                            }
                            Ok(WsMessage::Pong { .. }) => {
                                tracing::trace!("received pong");
                            }
                            Ok(other) => {
                                tracing::debug!(event = other.event_name(), "ignoring message");
                            }
                            Err(e) => {
                                tracing::debug!(error = %e, "failed to parse message");
                            }
                        }
                    }
                    Message::Close(_) => {
                        tracing::info!("server closed connection");
                        break;
                    }
                    _ => {}
                }
            }

            // Flag first, then drop the waiters: an `ask` that registers
            // after the clear sees the flag and bails out.
            reader_closed.store(true, Ordering::SeqCst);
            let dropped = {
                let mut pending = reader_pending.lock();
                let n = pending.len();
                pending.clear();
                n
            };
            tracing::info!(unanswered = dropped, "chat channel closed");
            let _ = event_tx.send(ChannelEvent::Closed).await;
        }));

        Ok(ChatConnection {
            outbound: outbound_tx,
            max_message_bytes: self.max_message_bytes,
            pending,
            closed,
            events: event_rx,
            tasks,
        })
    }
}

/// A live channel to the chat server.
///
/// Dropping the connection stops its background tasks, which closes the
/// socket.
pub struct ChatConnection {
    outbound: mpsc::Sender<WsMessage>,
    max_message_bytes: usize,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    events: mpsc::Receiver<ChannelEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl ChatConnection {
    /// The `bot` frame for `utterance`, or [`ClientError::TooLarge`] when
    /// it would exceed the frame limit.
    fn bot_frame(&self, request_id: &str, utterance: &str) -> Result<WsMessage, ClientError> {
        let msg = WsMessage::Bot {
            request_id: request_id.to_string(),
            utterance: utterance.to_string(),
        };
        let bytes = msg
            .to_json()
            .map_err(|e| ClientError::WebSocket(e.to_string()))?
            .len();
        if bytes > self.max_message_bytes {
            return Err(ClientError::TooLarge {
                bytes,
                max: self.max_message_bytes,
            });
        }
        Ok(msg)
    }

    /// Check that `utterance` fits in one frame without sending it.
    pub fn check_utterance(&self, utterance: &str) -> Result<(), ClientError> {
        // Request ids are hyphenated v4 UUIDs, always 36 chars.
        self.bot_frame(&"0".repeat(36), utterance).map(|_| ())
    }

    /// Send an utterance and wait for its reply.
    ///
    /// Replies are matched by `request_id`, so concurrent asks each get
    /// their own answer regardless of arrival order. There is no timeout:
    /// the future resolves only on reply or channel close. An utterance
    /// too large for one frame is rejected before anything is sent.
    pub async fn ask(&self, utterance: &str) -> Result<ChatMessage, ClientError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let msg = self.bot_frame(&request_id, utterance)?;

        let (tx, rx) = oneshot::channel();
        let prev = self.pending.lock().insert(request_id.clone(), tx);
        debug_assert!(prev.is_none(), "request_id collision: {request_id}");

        if self.closed.load(Ordering::SeqCst) {
            self.pending.lock().remove(&request_id);
            return Err(ClientError::ChannelClosed);
        }

        if self.outbound.send(msg).await.is_err() {
            self.pending.lock().remove(&request_id);
            return Err(ClientError::ChannelClosed);
        }

        tracing::debug!(request_id = %request_id, "utterance sent");
        rx.await.map_err(|_| ClientError::ChannelClosed)
    }

    /// Wait for the next channel event. `None` once the connection is gone
    /// and every event has been consumed.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    /// Non-blocking variant of [`next_event`](Self::next_event).
    pub fn try_next_event(&mut self) -> Option<ChannelEvent> {
        self.events.try_recv().ok()
    }

    /// Whether the server side of the channel has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of asks still waiting for a reply.
    pub fn pending_requests(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Drop for ChatConnection {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
