//! Append-only, timestamp-ordered message log.
//!
//! `MessageStore` is the source of truth for rendering and for request
//! construction. Entries are never edited or reordered; the only ways to
//! change the log are appending one message or clearing everything.

use std::collections::HashSet;

use palaver_types::message::Message;
use tracing::warn;
use uuid::Uuid;

/// In-memory ordered sequence of conversation messages.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
    ids: HashSet<Uuid>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted sequence.
    ///
    /// Duplicate ids keep their first occurrence; timestamps are clamped so
    /// they never decrease along the sequence.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut store = Self::new();
        for message in messages {
            store.append(message);
        }
        store
    }

    /// Add a message to the end of the log.
    ///
    /// Returns the stored entry, or `None` if a message with the same id is
    /// already present (the log is left untouched).
    pub fn append(&mut self, message: Message) -> Option<&Message> {
        if !self.ids.insert(message.id) {
            warn!(message_id = %message.id, "Rejected duplicate message id");
            return None;
        }

        let message = match self.messages.last() {
            Some(prev) => message.not_before(prev.timestamp),
            None => message,
        };
        self.messages.push(message);
        self.messages.last()
    }

    /// The full ordered sequence.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// An owned copy of the full ordered sequence.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Remove every message.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }
}
