mod chat;
mod server;

pub use chat::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single finding from [`Config::validate`].
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Check the configuration for values the server cannot run with.
    ///
    /// Returns an empty list when everything is fine.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.server.max_message_bytes == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.max_message_bytes".into(),
                message: "max_message_bytes must be greater than 0".into(),
            });
        }

        if self.server.cors.allowed_origins.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "no origins allowed, browsers on other origins cannot connect".into(),
            });
        }

        if self.chat.greeting.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "chat.greeting".into(),
                message: "greeting is empty".into(),
            });
        }

        if self.chat.fallback.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "chat.fallback".into(),
                message: "fallback reply is empty".into(),
            });
        }

        if let Some(path) = &self.chat.answers_path {
            if !path.exists() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "chat.answers_path".into(),
                    message: format!("{} does not exist", path.display()),
                });
            }
        }

        errors
    }
}
