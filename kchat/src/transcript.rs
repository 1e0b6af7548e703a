//! Append-only message log with a single in-progress assistant slot.
//!
//! Only the open placeholder may change in place, and it is always the last
//! message: appending any other message seals it first.
//!
//! ```rust
//! use kchat::{ChatMessage, Transcript};
//!
//! let mut transcript = Transcript::default();
//! transcript.push(ChatMessage::user("hi", None));
//! transcript.append_delta("Hel");
//! transcript.append_delta("lo");
//! assert!(transcript.in_progress());
//!
//! transcript.seal();
//! assert_eq!(transcript.messages()[1].content, "Hello");
//! assert!(!transcript.in_progress());
//! ```

use crate::ChatMessage;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    placeholder_open: bool,
}

impl Transcript {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn in_progress(&self) -> bool {
        self.placeholder_open
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.seal();
        self.messages.push(message);
    }

    /// Appends an empty assistant message that later deltas extend.
    pub fn begin_placeholder(&mut self) {
        self.push(ChatMessage::assistant(String::new()));
        self.placeholder_open = true;
    }

    /// Extends the open placeholder, opening a fresh one if none is open.
    pub fn append_delta(&mut self, delta: &str) {
        if !self.placeholder_open {
            self.begin_placeholder();
        }

        if let Some(last) = self.messages.last_mut() {
            last.content.push_str(delta);
        }
    }

    pub fn seal(&mut self) {
        self.placeholder_open = false;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.placeholder_open = false;
    }
}
