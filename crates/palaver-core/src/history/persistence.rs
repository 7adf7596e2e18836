//! Persistence adapter for conversation history.
//!
//! Serializes the message log into a single history slot (full snapshot on
//! every save) and keeps the remembered user name in its own slot. Every
//! failure here is logged and swallowed: persistence is best-effort and must
//! never block or fail the in-memory conversation.

use palaver_types::message::Message;
use tracing::{debug, warn};

use crate::storage::kv_store::KvStore;

/// Slot holding the JSON array of messages.
pub const HISTORY_SLOT: &str = "chat_history";

/// Slot holding the remembered user name as plain text.
pub const NAME_SLOT: &str = "user_name";

/// Reads and writes conversation state through a [`KvStore`].
pub struct HistoryPersistence<K: KvStore> {
    store: K,
}

impl<K: KvStore> HistoryPersistence<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Access the underlying key-value store.
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Load the last saved history.
    ///
    /// Returns an empty sequence when nothing was saved, the slot cannot be
    /// read, or its payload is malformed. Entries that parse but break the
    /// message invariants are dropped.
    pub async fn load(&self) -> Vec<Message> {
        let raw = match self.store.get(HISTORY_SLOT).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read chat history, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(messages) => {
                let messages: Vec<Message> = messages
                    .into_iter()
                    .filter(|m| match m.validate() {
                        Ok(()) => true,
                        Err(reason) => {
                            warn!(message_id = %m.id, reason, "Dropping invalid stored message");
                            false
                        }
                    })
                    .collect();
                debug!(count = messages.len(), "Loaded chat history");
                messages
            }
            Err(e) => {
                warn!(error = %e, "Stored chat history is malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the history slot with the full current sequence.
    pub async fn save(&self, messages: &[Message]) {
        let payload = match serde_json::to_string(messages) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize chat history");
                return;
            }
        };

        if let Err(e) = self.store.set(HISTORY_SLOT, &payload).await {
            warn!(error = %e, count = messages.len(), "Failed to save chat history");
        }
    }

    /// Remove the history slot and the remembered-name slot.
    pub async fn clear(&self) {
        for slot in [HISTORY_SLOT, NAME_SLOT] {
            if let Err(e) = self.store.delete(slot).await {
                warn!(error = %e, slot, "Failed to clear persisted slot");
            }
        }
    }

    /// The remembered user name, if one was saved.
    pub async fn load_name(&self) -> Option<String> {
        match self.store.get(NAME_SLOT).await {
            Ok(name) => name.filter(|n| !n.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read remembered name");
                None
            }
        }
    }

    pub async fn save_name(&self, name: &str) {
        if let Err(e) = self.store.set(NAME_SLOT, name).await {
            warn!(error = %e, "Failed to save remembered name");
        }
    }
}
