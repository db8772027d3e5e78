pub mod answers;
pub mod chat;
pub mod config;

use clap::{Parser, Subcommand};

/// botchat — a canned-answer chat server and terminal client.
#[derive(Debug, Parser)]
#[command(name = "botchat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the chat server (default when no subcommand is given).
    Serve,
    /// Open an interactive chat against a running server.
    Chat {
        /// WebSocket URL (defaults to the configured host and port).
        #[arg(long)]
        url: Option<String>,
    },
    /// Answer one utterance locally, without a server.
    Ask {
        /// The utterance, e.g. `-help`.
        #[arg(allow_hyphen_values = true)]
        utterance: String,
    },
    /// Answer table utilities.
    #[command(subcommand)]
    Answers(AnswersCommand),
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum AnswersCommand {
    /// Print every question and its answer.
    List,
    /// Report entries that can never be returned.
    Check,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `BOTCHAT_CONFIG` (or
/// `botchat.toml` by default), then apply the `BOTCHAT_PORT` override.
/// A missing file means all defaults. Returns the config and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(bc_domain::config::Config, String)> {
    let config_path =
        std::env::var("BOTCHAT_CONFIG").unwrap_or_else(|_| "botchat.toml".into());

    let mut config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        bc_domain::config::Config::default()
    };

    if let Ok(port) = std::env::var("BOTCHAT_PORT") {
        config.server.port = port
            .parse()
            .map_err(|e| anyhow::anyhow!("BOTCHAT_PORT={port}: {e}"))?;
    }

    Ok((config, config_path))
}

/// `ws://host:port/v1/chat/ws` for the configured server.
pub fn default_chat_url(config: &bc_domain::config::Config) -> String {
    let host = match config.server.host.as_str() {
        "0.0.0.0" => "127.0.0.1",
        "::" => "[::1]",
        other => other,
    };
    format!(
        "ws://{host}:{}{}",
        config.server.port,
        bc_protocol::CHAT_WS_PATH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_accepts_hyphenated_utterance() {
        let cli = Cli::try_parse_from(["botchat", "ask", "-help"]).unwrap();
        match cli.command {
            Some(Command::Ask { utterance }) => assert_eq!(utterance, "-help"),
            other => panic!("expected ask, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["botchat"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn chat_url_from_config() {
        let mut config = bc_domain::config::Config::default();
        assert_eq!(default_chat_url(&config), "ws://127.0.0.1:8080/v1/chat/ws");

        config.server.host = "0.0.0.0".into();
        config.server.port = 9000;
        assert_eq!(default_chat_url(&config), "ws://127.0.0.1:9000/v1/chat/ws");
    }
}
