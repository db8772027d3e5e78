//! Rendering rules for transcript entries.
//!
//! A message whose text contains `http` anywhere is shown as a link to the
//! whole text; everything else is plain text. Bot messages sit on the
//! leading edge, user messages on the trailing edge.

use bc_domain::{ChatMessage, SenderKind};

use crate::view::ChatView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageBody<'a> {
    Link { href: &'a str, text: &'a str },
    Plain(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    End,
}

pub fn body(msg: &ChatMessage) -> MessageBody<'_> {
    let text = msg.text();
    if text.contains("http") {
        MessageBody::Link { href: text, text }
    } else {
        MessageBody::Plain(text)
    }
}

pub fn alignment(sender: SenderKind) -> Alignment {
    match sender {
        SenderKind::Bot => Alignment::Start,
        SenderKind::User => Alignment::End,
    }
}

/// One terminal line for a message. Links use the OSC 8 hyperlink escape.
pub fn terminal_line(msg: &ChatMessage) -> String {
    let prefix = match alignment(msg.sender()) {
        Alignment::Start => "bot> ",
        Alignment::End => "you> ",
    };
    match body(msg) {
        MessageBody::Link { href, text } => {
            format!("{prefix}\x1B]8;;{href}\x1B\\{text}\x1B]8;;\x1B\\")
        }
        MessageBody::Plain(text) => format!("{prefix}{text}"),
    }
}

/// Prints transcript entries as they scroll into view.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    printed: usize,
    generation: u64,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for every entry up to the view's scroll target that has not
    /// been printed yet. A greeting that restarts the transcript restarts
    /// printing from the top, even if more entries followed it.
    pub fn drain(&mut self, view: &mut ChatView) -> Vec<String> {
        let Some(newest) = view.take_scroll_target() else {
            return Vec::new();
        };
        if view.generation() != self.generation {
            self.generation = view.generation();
            self.printed = 0;
        }
        let lines = view.transcript()[self.printed..=newest]
            .iter()
            .map(terminal_line)
            .collect();
        self.printed = newest + 1;
        lines
    }
}
