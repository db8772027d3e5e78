use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::answers::{AnswerTable, FALLBACK_TEXT};
use crate::error::Result;

/// Greeting sent to every client right after it connects.
pub const GREETING_TEXT: &str = "'-help'로 명령어를 확인해 보세요.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat behaviour
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "d_greeting")]
    pub greeting: String,
    #[serde(default = "d_fallback")]
    pub fallback: String,
    /// JSON answer table to load at startup instead of the builtin one.
    #[serde(default)]
    pub answers_path: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: d_greeting(),
            fallback: d_fallback(),
            answers_path: None,
        }
    }
}

impl ChatConfig {
    /// Load the configured answer table, or the builtin one.
    pub fn answer_table(&self) -> Result<AnswerTable> {
        match &self.answers_path {
            Some(path) => AnswerTable::load(path),
            None => Ok(AnswerTable::builtin()),
        }
    }
}

fn d_greeting() -> String {
    GREETING_TEXT.into()
}
fn d_fallback() -> String {
    FALLBACK_TEXT.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_texts() {
        let cfg: ChatConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.greeting, "'-help'로 명령어를 확인해 보세요.");
        assert_eq!(cfg.fallback, "올바르지 않은 키워드입니다.");
        assert!(cfg.answers_path.is_none());
    }

    #[test]
    fn answer_table_falls_back_to_builtin() {
        let table = ChatConfig::default().answer_table().unwrap();
        assert!(table.lookup("-help").is_some());
    }

    #[test]
    fn answer_table_reads_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, r#"[{"question":"q","answer":"a"}]"#).unwrap();

        let cfg = ChatConfig {
            answers_path: Some(path),
            ..Default::default()
        };
        let table = cfg.answer_table().unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_configured_path_is_io_error() {
        let cfg = ChatConfig {
            answers_path: Some("/no/such/answers.json".into()),
            ..Default::default()
        };
        assert!(matches!(cfg.answer_table(), Err(crate::Error::Io(_))));
    }
}
