//! Self-introduction name extraction.
//!
//! Scans user-authored messages for "I'm <name>" and remembers the name in
//! its own persisted slot so it can be folded into the developer instruction.
//! The name is never stored on messages; it is recomputed for every request
//! from the current history and the previously persisted value.

use std::sync::LazyLock;

use palaver_types::message::Message;
use regex::Regex;
use tracing::debug;

use crate::history::persistence::HistoryPersistence;
use crate::storage::kv_store::KvStore;

/// Name used when the user never introduced themselves.
pub const DEFAULT_NAME: &str = "User";

/// "I'm Alex", "im alex", "I’m Alex", "I`m Alex", "I m Alex".
static INTRODUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bi['’`]?\s?m\s([a-z]+)").expect("introduction pattern is valid")
});

/// Extracts the user's self-introduced name from conversation history.
pub struct NameExtractor;

impl NameExtractor {
    /// Name from the first user message that introduces the user.
    ///
    /// Later introductions are ignored; candidates are never merged.
    pub fn extract(history: &[Message]) -> Option<String> {
        history
            .iter()
            .filter(|m| m.is_user())
            .find_map(|m| INTRODUCTION.captures(&m.content))
            .and_then(|caps| caps.get(1))
            .map(|name| name.as_str().to_string())
    }

    /// Name to use for the next request.
    ///
    /// A name found in `history` is persisted and returned. Otherwise the
    /// previously persisted name is used, falling back to [`DEFAULT_NAME`].
    pub async fn remembered_name<K: KvStore>(
        history: &[Message],
        persistence: &HistoryPersistence<K>,
    ) -> String {
        if let Some(name) = Self::extract(history) {
            debug!(name = %name, "Found self-introduction in history");
            persistence.save_name(&name).await;
            return name;
        }

        persistence
            .load_name()
            .await
            .unwrap_or_else(|| DEFAULT_NAME.to_string())
    }
}
