use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use bc_domain::config::Config;
use bc_server::cli::{AnswersCommand, Cli, Command, ConfigCommand};
use bc_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            init_tracing();
            let (config, config_path) = bc_server::cli::load_config()?;
            run_server(Arc::new(config), config_path).await
        }
        Some(Command::Chat { url }) => {
            init_cli_tracing();
            let (config, _) = bc_server::cli::load_config()?;
            let url = url.unwrap_or_else(|| bc_server::cli::default_chat_url(&config));
            bc_server::cli::chat::chat(url, config.server.max_message_bytes).await
        }
        Some(Command::Ask { utterance }) => {
            init_cli_tracing();
            let (config, _) = bc_server::cli::load_config()?;
            bc_server::cli::answers::ask(&config, &utterance)
        }
        Some(Command::Answers(AnswersCommand::List)) => {
            init_cli_tracing();
            let (config, _) = bc_server::cli::load_config()?;
            bc_server::cli::answers::list(&config)
        }
        Some(Command::Answers(AnswersCommand::Check)) => {
            init_cli_tracing();
            let (config, _) = bc_server::cli::load_config()?;
            if !bc_server::cli::answers::check(&config)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = bc_server::cli::load_config()?;
            if !bc_server::cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _) = bc_server::cli::load_config()?;
            bc_server::cli::config::show(&config)
        }
        Some(Command::Version) => {
            println!("botchat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Structured JSON tracing for the `serve` command.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bc_server=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_current_span(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Compact stderr-only tracing for CLI commands.
///
/// Defaults to `warn` so diagnostics stay out of stdout.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Start the chat server with the given configuration.
async fn run_server(config: Arc<Config>, config_path: String) -> anyhow::Result<()> {
    tracing::info!(config_path = %config_path, "botchat starting");

    for issue in config.validate() {
        tracing::warn!(field = %issue.field, "{}", issue.message);
    }

    let state = AppState::new(config.clone()).context("loading answer table")?;
    let sessions = state.sessions.clone();
    let app = bc_server::api::app(state);

    // ── Bind ─────────────────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "botchat listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("axum server error")?;

    tracing::info!(open_sessions = sessions.len(), "shutdown complete");
    Ok(())
}

/// Resolves on the first of Ctrl-C or (on unix) SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal, "shutting down");
}
