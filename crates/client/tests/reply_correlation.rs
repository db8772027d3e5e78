//! Integration test: boots an in-process WebSocket server that plays the
//! server side of the chat protocol, connects a real [`ChatConnection`],
//! and asserts greeting delivery, reply correlation, and close handling.

use std::net::SocketAddr;
use std::time::Duration;

use bc_client::{ChannelEvent, ChatClientBuilder, ChatMessage, ChatView, ClientError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// How the mini server behaves after sending the greeting.
#[derive(Clone, Copy)]
enum Script {
    /// Collect `n` requests, then answer them in reverse order.
    ReplyReversed(usize),
    /// Hang up right after the greeting.
    HangUp,
    /// Answer the first request with a reply of this many bytes.
    OversizedReply(usize),
}

async fn start_mini_server(script: Script) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _peer)) = listener.accept().await {
            tokio::spawn(async move {
                let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                let (mut sink, mut stream) = ws.split();

                for msg in [
                    WsMessage::Connected { connected: true },
                    WsMessage::Welcome {
                        message: ChatMessage::bot("welcome"),
                    },
                ] {
                    let json = msg.to_json().unwrap();
                    if sink.send(Message::Text(json)).await.is_err() {
                        return;
                    }
                }

                let n = match script {
                    Script::HangUp => {
                        let _ = sink.close().await;
                        return;
                    }
                    Script::OversizedReply(size) => {
                        while let Some(Ok(frame)) = stream.next().await {
                            let Message::Text(text) = frame else { continue };
                            if let Ok(WsMessage::Bot { request_id, .. }) = WsMessage::from_json(&text) {
                                let reply = WsMessage::BotReply {
                                    request_id,
                                    message: ChatMessage::bot("y".repeat(size)),
                                };
                                let _ = sink.send(Message::Text(reply.to_json().unwrap())).await;
                                break;
                            }
                        }
                        while let Some(Ok(_)) = stream.next().await {}
                        return;
                    }
                    Script::ReplyReversed(n) => n,
                };

                let mut requests = Vec::new();
                while requests.len() < n {
                    match stream.next().await {
                        Some(Ok(Message::Text(text))) => {
                            if let Ok(WsMessage::Bot {
                                request_id,
                                utterance,
                            }) = WsMessage::from_json(&text)
                            {
                                requests.push((request_id, utterance));
                            }
                        }
                        Some(Ok(_)) => continue,
                        _ => return,
                    }
                }

                for (request_id, utterance) in requests.into_iter().rev() {
                    let reply = WsMessage::BotReply {
                        request_id,
                        message: ChatMessage::bot(format!("echo:{utterance}")),
                    };
                    let json = reply.to_json().unwrap();
                    if sink.send(Message::Text(json)).await.is_err() {
                        return;
                    }
                }

                // Keep the socket open until the client goes away.
                while let Some(Ok(_)) = stream.next().await {}
            });
        }
    });

    addr
}

async fn next_event(conn: &mut bc_client::ChatConnection) -> ChannelEvent {
    tokio::time::timeout(Duration::from_secs(5), conn.next_event())
        .await
        .expect("timeout waiting for channel event")
        .expect("event stream ended")
}

#[tokio::test]
async fn greeting_then_replies_matched_by_request_id() {
    let addr = start_mini_server(Script::ReplyReversed(2)).await;

    let mut conn = ChatClientBuilder::new()
        .server_ws_url(format!("ws://{addr}/"))
        .heartbeat_interval(None)
        .build()
        .unwrap()
        .connect()
        .await
        .unwrap();

    let mut view = ChatView::new();

    assert_eq!(next_event(&mut conn).await, ChannelEvent::Opened);
    view.on_channel_open();

    match next_event(&mut conn).await {
        ChannelEvent::Greeting(msg) => view.on_greeting_received(msg),
        other => panic!("expected greeting, got: {other:?}"),
    }
    assert_eq!(view.transcript(), &[ChatMessage::bot("welcome")]);

    // Both asks are in flight at once; the server answers the second first.
    let (first, second) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(conn.ask("first"), conn.ask("second"))
    })
    .await
    .expect("timeout waiting for replies");

    assert_eq!(first.unwrap(), ChatMessage::bot("echo:first"));
    assert_eq!(second.unwrap(), ChatMessage::bot("echo:second"));
    assert_eq!(conn.pending_requests(), 0);
}

#[tokio::test]
async fn hang_up_closes_channel_and_fails_asks() {
    let addr = start_mini_server(Script::HangUp).await;

    let mut conn = ChatClientBuilder::new()
        .server_ws_url(format!("ws://{addr}/"))
        .heartbeat_interval(None)
        .build()
        .unwrap()
        .connect()
        .await
        .unwrap();

    let mut view = ChatView::new();
    loop {
        match next_event(&mut conn).await {
            ChannelEvent::Opened => view.on_channel_open(),
            ChannelEvent::Greeting(msg) => view.on_greeting_received(msg),
            ChannelEvent::Closed => {
                view.on_channel_closed();
                break;
            }
        }
    }

    assert!(conn.is_closed());
    assert!(!view.is_connected());
    assert_eq!(view.transcript().len(), 1);

    let err = conn.ask("anyone there?").await.unwrap_err();
    assert!(matches!(err, ClientError::ChannelClosed));
}

async fn connect_with_limit(addr: SocketAddr, max_message_bytes: usize) -> bc_client::ChatConnection {
    let mut conn = ChatClientBuilder::new()
        .server_ws_url(format!("ws://{addr}/"))
        .heartbeat_interval(None)
        .max_message_bytes(max_message_bytes)
        .build()
        .unwrap()
        .connect()
        .await
        .unwrap();
    assert_eq!(next_event(&mut conn).await, ChannelEvent::Opened);
    assert!(matches!(next_event(&mut conn).await, ChannelEvent::Greeting(_)));
    conn
}

#[tokio::test]
async fn oversized_reply_closes_channel_instead_of_stranding_ask() {
    let addr = start_mini_server(Script::OversizedReply(500)).await;
    let mut conn = connect_with_limit(addr, 200).await;

    let err = tokio::time::timeout(Duration::from_secs(5), conn.ask("-help"))
        .await
        .expect("ask must not hang on an oversized reply")
        .unwrap_err();
    assert!(matches!(err, ClientError::ChannelClosed));
    assert_eq!(next_event(&mut conn).await, ChannelEvent::Closed);
    assert!(conn.is_closed());
    assert_eq!(conn.pending_requests(), 0);
}

#[tokio::test]
async fn oversized_utterance_is_rejected_before_sending() {
    let addr = start_mini_server(Script::ReplyReversed(1)).await;
    let conn = connect_with_limit(addr, 200).await;

    let big = "x".repeat(500);
    assert!(matches!(conn.check_utterance(&big), Err(ClientError::TooLarge { max: 200, .. })));
    match conn.ask(&big).await {
        Err(ClientError::TooLarge { bytes, max }) => {
            assert!(bytes > 500);
            assert_eq!(max, 200);
        }
        other => panic!("expected TooLarge, got: {other:?}"),
    }
    assert_eq!(conn.pending_requests(), 0);

    // Nothing reached the server, so the next ask is its first request.
    assert!(conn.check_utterance("small").is_ok());
    let reply = tokio::time::timeout(Duration::from_secs(5), conn.ask("small"))
        .await
        .expect("timeout waiting for reply")
        .unwrap();
    assert_eq!(reply, ChatMessage::bot("echo:small"));
    assert!(!conn.is_closed());
}

#[tokio::test]
async fn connect_to_dead_port_is_websocket_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let client = ChatClientBuilder::new()
        .server_ws_url(format!("ws://{addr}/"))
        .build()
        .unwrap();

    match client.connect().await {
        Err(ClientError::WebSocket(_)) => {}
        Err(other) => panic!("expected websocket error, got: {other:?}"),
        Ok(_) => panic!("expected connection failure"),
    }
}
