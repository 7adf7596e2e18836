//! Application state wiring the session together.
//!
//! `SessionController` is generic over its store and provider; `AppState`
//! pins it to the concrete infra implementations. The store is either the
//! SQLite database in the data directory or, with `--ephemeral`, an
//! in-memory store that disappears on exit.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use palaver_core::chat::SessionController;
use palaver_core::history::persistence::HistoryPersistence;
use palaver_core::llm::client::CompletionClient;
use palaver_core::storage::kv_store::KvStore;
use palaver_core::storage::memory::MemoryKvStore;
use palaver_infra::config::load_chat_config;
use palaver_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use palaver_infra::llm::create_provider;
use palaver_infra::llm::openai_compat::OpenAiCompatibleProvider;
use palaver_infra::secret::EnvCredentialSource;
use palaver_infra::sqlite::kv::SqliteKvStore;
use palaver_infra::sqlite::pool::DatabasePool;
use palaver_types::config::ChatConfig;
use palaver_types::error::RepositoryError;

/// The slot store backing this run.
#[derive(Clone)]
pub enum AppKvStore {
    Sqlite(SqliteKvStore),
    Memory(Arc<MemoryKvStore>),
}

impl KvStore for AppKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        match self {
            AppKvStore::Sqlite(store) => store.get(key).await,
            AppKvStore::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        match self {
            AppKvStore::Sqlite(store) => store.set(key, value).await,
            AppKvStore::Memory(store) => store.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        match self {
            AppKvStore::Sqlite(store) => store.delete(key).await,
            AppKvStore::Memory(store) => store.delete(key).await,
        }
    }
}

pub type ConcreteController = SessionController<AppKvStore, OpenAiCompatibleProvider>;

/// Shared application state used by every command.
pub struct AppState {
    pub controller: ConcreteController,
    pub data_dir: PathBuf,
    pub ephemeral: bool,
    /// Environment variable the credential was read from, if any.
    pub credential_source: Option<String>,
}

impl AppState {
    /// Resolve configuration, open the store and restore the session.
    pub async fn init(ephemeral: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_chat_config(&data_dir).await;

        let store = if ephemeral {
            AppKvStore::Memory(Arc::new(MemoryKvStore::new()))
        } else {
            ensure_data_dir(&data_dir)
                .await
                .with_context(|| format!("failed to create {}", data_dir.display()))?;
            let pool = DatabasePool::open(&data_dir)
                .await
                .with_context(|| format!("failed to open database in {}", data_dir.display()))?;
            AppKvStore::Sqlite(SqliteKvStore::new(pool))
        };

        let credentials = EnvCredentialSource::new();
        let (api_key, credential_source) = match credentials.resolve() {
            Some((secret, from)) => (Some(secret), Some(from.to_string())),
            None => (None, None),
        };

        let provider = create_provider(&config, api_key);
        let state = Self::with_parts(
            store,
            provider,
            config,
            data_dir,
            ephemeral,
            credential_source,
        )
        .await;
        Ok(state)
    }

    /// Assemble state from already-built parts.
    pub async fn with_parts(
        store: AppKvStore,
        provider: OpenAiCompatibleProvider,
        config: ChatConfig,
        data_dir: PathBuf,
        ephemeral: bool,
        credential_source: Option<String>,
    ) -> Self {
        let controller = SessionController::open(
            HistoryPersistence::new(store),
            CompletionClient::new(provider),
            config,
        )
        .await;

        Self {
            controller,
            data_dir,
            ephemeral,
            credential_source,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        self.controller.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::history::persistence::HISTORY_SLOT;
    use palaver_types::message::Message;

    #[tokio::test]
    async fn test_memory_store_variant_delegates() {
        let inner = Arc::new(MemoryKvStore::new());
        let store = AppKvStore::Memory(inner.clone());
        store.set("k", "v").await.unwrap();
        assert_eq!(inner.raw("k").as_deref(), Some("v"));
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.delete("k").await.unwrap();
        assert!(!inner.contains("k"));
    }

    #[tokio::test]
    async fn test_sqlite_store_variant_restores_history() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(dir.path()).await.unwrap();
        let store = AppKvStore::Sqlite(SqliteKvStore::new(pool));

        let saved = vec![Message::user("hello")];
        store
            .set(HISTORY_SLOT, &serde_json::to_string(&saved).unwrap())
            .await
            .unwrap();

        let state = AppState::with_parts(
            store,
            OpenAiCompatibleProvider::openai(None),
            ChatConfig::default(),
            dir.path().to_path_buf(),
            false,
            None,
        )
        .await;
        assert_eq!(state.controller.messages().await, saved);
    }
}
