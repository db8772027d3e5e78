//! Static answer table and the responder that looks utterances up in it.
//!
//! Matching is exact equality between the lowercased utterance and an
//! entry's `question`. The first matching entry wins.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::ChatMessage;

/// Reply text when no entry matches.
pub const FALLBACK_TEXT: &str = "올바르지 않은 키워드입니다.";

const BUILTIN_TABLE: &str = include_str!("../answers.json");

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question: String,
    pub answer: String,
}

impl AnswerEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Ordered, read-only list of question/answer pairs.
#[derive(Debug, Clone, Default)]
pub struct AnswerTable {
    entries: Vec<AnswerEntry>,
}

impl AnswerTable {
    pub fn new(entries: Vec<AnswerEntry>) -> Self {
        Self { entries }
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_TABLE).expect("builtin answers.json must be a valid answer table")
    }

    /// Parse a JSON array of `{ "question", "answer" }` records.
    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<AnswerEntry> = serde_json::from_str(raw)?;
        Ok(Self { entries })
    }

    /// Read a table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let table = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            "answer table loaded"
        );
        Ok(table)
    }

    /// First entry whose question equals `normalized` exactly.
    pub fn lookup(&self, normalized: &str) -> Option<&AnswerEntry> {
        self.entries.iter().find(|e| e.question == normalized)
    }

    pub fn entries(&self) -> &[AnswerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Report entries that can never be returned by [`Responder::respond`].
    pub fn lint(&self) -> Vec<AnswerLint> {
        let mut findings = Vec::new();

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.question.is_empty() {
                findings.push(AnswerLint::Empty { index });
                continue;
            }

            // Utterances are lowercased before lookup.
            if normalize(&entry.question) != entry.question {
                findings.push(AnswerLint::Unreachable {
                    index,
                    question: entry.question.clone(),
                });
                continue;
            }

            if let Some(first) = self.entries[..index]
                .iter()
                .position(|e| e.question == entry.question)
            {
                findings.push(AnswerLint::Duplicate {
                    index,
                    first,
                    question: entry.question.clone(),
                });
            }
        }

        findings
    }
}

/// A problem found by [`AnswerTable::lint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerLint {
    /// The question is empty.
    Empty { index: usize },
    /// The question contains characters that lowercasing changes.
    Unreachable { index: usize, question: String },
    /// An earlier entry already answers the same question.
    Duplicate {
        index: usize,
        first: usize,
        question: String,
    },
}

impl fmt::Display for AnswerLint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerLint::Empty { index } => write!(f, "entry {index}: empty question"),
            AnswerLint::Unreachable { index, question } => write!(
                f,
                "entry {index}: question {question:?} is not lowercase and can never match"
            ),
            AnswerLint::Duplicate {
                index,
                first,
                question,
            } => write!(
                f,
                "entry {index}: question {question:?} is shadowed by entry {first}"
            ),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Responder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lowercase only. Whitespace and punctuation are kept as typed.
pub fn normalize(utterance: &str) -> String {
    utterance.to_lowercase()
}

/// Turns user utterances into bot replies.
#[derive(Debug, Clone)]
pub struct Responder {
    table: Arc<AnswerTable>,
    fallback: String,
}

impl Responder {
    pub fn new(table: Arc<AnswerTable>) -> Self {
        Self {
            table,
            fallback: FALLBACK_TEXT.to_string(),
        }
    }

    /// Override the reply used when nothing matches.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn table(&self) -> &AnswerTable {
        &self.table
    }

    pub fn respond(&self, utterance: &str) -> ChatMessage {
        match self.table.lookup(&normalize(utterance)) {
            Some(entry) => ChatMessage::bot(entry.answer.as_str()),
            None => ChatMessage::bot(self.fallback.as_str()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
