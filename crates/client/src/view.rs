//! Chat view state: transcript, draft text, and connection indicator.
//!
//! The view owns its transcript exclusively. Messages are only ever
//! appended, except for the greeting, which starts a fresh transcript.

use bc_domain::ChatMessage;

/// Live/offline badge shown above the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionIndicator {
    Live,
    Offline,
}

impl ConnectionIndicator {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionIndicator::Live => "Live",
            ConnectionIndicator::Offline => "---",
        }
    }
}

#[derive(Debug, Default)]
pub struct ChatView {
    transcript: Vec<ChatMessage>,
    draft: String,
    connected: bool,
    /// Index of the newest entry not yet scrolled into view.
    scroll_target: Option<usize>,
    /// Bumped every time a greeting starts a fresh transcript.
    generation: u64,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn indicator(&self) -> ConnectionIndicator {
        if self.connected {
            ConnectionIndicator::Live
        } else {
            ConnectionIndicator::Offline
        }
    }

    pub fn on_channel_open(&mut self) {
        self.connected = true;
    }

    pub fn on_channel_closed(&mut self) {
        self.connected = false;
    }

    /// The greeting replaces whatever the transcript held.
    pub fn on_greeting_received(&mut self, msg: ChatMessage) {
        self.transcript.clear();
        self.generation += 1;
        self.push(msg);
    }

    /// Changes whenever the transcript is restarted by a greeting.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn on_draft_change(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Echo the draft into the transcript and hand back the utterance to
    /// send. Returns `None` (and changes nothing) when the draft is empty.
    pub fn submit(&mut self) -> Option<String> {
        if self.draft.is_empty() {
            return None;
        }
        let utterance = std::mem::take(&mut self.draft);
        self.push(ChatMessage::user(utterance.as_str()));
        Some(utterance)
    }

    pub fn on_reply_received(&mut self, msg: ChatMessage) {
        self.push(msg);
    }

    /// Index of the newest entry, once per new entry.
    ///
    /// A caller that scrolls (or prints) on every `Some` brings each new
    /// entry into view exactly once.
    pub fn take_scroll_target(&mut self) -> Option<usize> {
        self.scroll_target.take()
    }

    fn push(&mut self, msg: ChatMessage) {
        self.transcript.push(msg);
        self.scroll_target = Some(self.transcript.len() - 1);
    }
}
