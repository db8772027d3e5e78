//! `botchat chat` — interactive terminal chat view.
//!
//! Connects to a running server, prints the greeting, then sends each
//! line as an utterance and prints the reply. The prompt carries the
//! connection indicator; once the server goes away it reads `---` and the
//! loop ends. There is no reconnection.

use std::time::Duration;

use bc_client::{
    ChannelEvent, ChatClientBuilder, ChatConnection, ChatView, ClientError, TerminalRenderer,
};

/// How long to wait for the greeting after the socket opens.
const GREETING_TIMEOUT: Duration = Duration::from_secs(5);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(url: String, max_message_bytes: usize) -> anyhow::Result<()> {
    let client = ChatClientBuilder::new()
        .server_ws_url(url.as_str())
        .max_message_bytes(max_message_bytes)
        .build()?;
    let mut conn = client.connect().await?;

    let mut view = ChatView::new();
    let mut renderer = TerminalRenderer::new();

    // Opened, then the greeting.
    let greeted = tokio::time::timeout(GREETING_TIMEOUT, async {
        while let Some(event) = conn.next_event().await {
            let done = matches!(event, ChannelEvent::Greeting(_) | ChannelEvent::Closed);
            apply_event(&mut view, event);
            if done {
                break;
            }
        }
    })
    .await;
    if greeted.is_err() {
        tracing::warn!(url = %url, "no greeting from server");
    }
    print_new(&mut renderer, &mut view);

    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".botchat")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    eprintln!("Connected to {url}  |  Ctrl+D to exit");

    while view.is_connected() {
        let prompt = format!("[{}] > ", view.indicator().label());
        match rl.readline(&prompt) {
            Ok(line) => {
                // Events that arrived while we were waiting on the keyboard.
                while let Some(event) = conn.try_next_event() {
                    apply_event(&mut view, event);
                }
                print_new(&mut renderer, &mut view);
                if !view.is_connected() {
                    break;
                }

                // Never echo what could not be sent.
                if let Err(e) = conn.check_utterance(&line) {
                    eprintln!("\x1B[31merror: {e}\x1B[0m");
                    continue;
                }
                view.on_draft_change(line.as_str());
                let Some(utterance) = view.submit() else {
                    continue;
                };
                rl.add_history_entry(&line).ok();
                print_new(&mut renderer, &mut view);

                match send(&conn, &utterance).await {
                    Ok(reply) => view.on_reply_received(reply),
                    Err(ClientError::ChannelClosed) => view.on_channel_closed(),
                    Err(e) => eprintln!("\x1B[31merror: {e}\x1B[0m"),
                }
                print_new(&mut renderer, &mut view);
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D to quit)");
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();

    if !view.is_connected() {
        eprintln!("[{}] connection closed", view.indicator().label());
    }
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn apply_event(view: &mut ChatView, event: ChannelEvent) {
    match event {
        ChannelEvent::Opened => view.on_channel_open(),
        ChannelEvent::Greeting(msg) => view.on_greeting_received(msg),
        ChannelEvent::Closed => view.on_channel_closed(),
    }
}

async fn send(
    conn: &ChatConnection,
    utterance: &str,
) -> Result<bc_client::ChatMessage, ClientError> {
    tracing::debug!(utterance = %utterance, "sending utterance");
    conn.ask(utterance).await
}

fn print_new(renderer: &mut TerminalRenderer, view: &mut ChatView) {
    for line in renderer.drain(view) {
        println!("{line}");
    }
}
