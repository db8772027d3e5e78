use std::sync::Arc;

use bc_domain::config::Config;
use bc_domain::{AnswerTable, Responder};

use crate::session::registry::SessionRegistry;
use crate::session::UtteranceHandler;

/// Shared application state passed to all API handlers.
///
/// The answer table is loaded once here and never mutated afterwards;
/// every session reads it through the same `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub answers: Arc<AnswerTable>,
    pub handler: Arc<dyn UtteranceHandler>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Build state from config, loading the answer table it points at.
    pub fn new(config: Arc<Config>) -> bc_domain::Result<Self> {
        let answers = Arc::new(config.chat.answer_table()?);
        let responder =
            Responder::new(answers.clone()).with_fallback(config.chat.fallback.clone());

        for finding in answers.lint() {
            tracing::warn!(%finding, "answer table entry will never be returned");
        }
        tracing::info!(entries = answers.len(), "answer table ready");

        Ok(Self::with_handler(config, answers, Arc::new(responder)))
    }

    pub fn with_handler(
        config: Arc<Config>,
        answers: Arc<AnswerTable>,
        handler: Arc<dyn UtteranceHandler>,
    ) -> Self {
        Self {
            config,
            answers,
            handler,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}
