//! In-memory registry of live chat sessions.
//!
//! Entries exist only while their connection is open; nothing about a
//! session outlives its socket.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// A live session.
struct LiveSession {
    connected_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    requests: u64,
}

/// Summary info returned by list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub connected_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub requests: u64,
}

/// Thread-safe registry of all live sessions.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, LiveSession>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, session_id: &str) {
        let now = Utc::now();
        self.sessions.write().insert(
            session_id.to_string(),
            LiveSession {
                connected_at: now,
                last_seen: now,
                requests: 0,
            },
        );
        tracing::debug!(session_id = %session_id, "session registered");
    }

    /// Remove a session (on disconnect).
    pub fn remove(&self, session_id: &str) {
        if self.sessions.write().remove(session_id).is_some() {
            tracing::debug!(session_id = %session_id, "session removed");
        }
    }

    /// Update the last_seen timestamp (called on any inbound frame).
    pub fn touch(&self, session_id: &str) {
        if let Some(session) = self.sessions.write().get_mut(session_id) {
            session.last_seen = Utc::now();
        }
    }

    /// Count one received utterance.
    pub fn record_request(&self, session_id: &str) {
        if let Some(session) = self.sessions.write().get_mut(session_id) {
            session.requests += 1;
        }
    }

    /// List all live sessions, oldest first.
    pub fn list(&self) -> Vec<SessionInfo> {
        let mut list: Vec<SessionInfo> = self
            .sessions
            .read()
            .iter()
            .map(|(id, s)| SessionInfo {
                session_id: id.clone(),
                connected_at: s.connected_at,
                last_seen: s.last_seen,
                requests: s.requests,
            })
            .collect();
        list.sort_by(|a, b| a.connected_at.cmp(&b.connected_at));
        list
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
