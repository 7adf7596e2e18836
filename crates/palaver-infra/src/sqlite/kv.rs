//! SQLite key-value slot store.
//!
//! Implements `KvStore` from `palaver-core` on the `kv_slots` table. Each
//! `set` is a single-row upsert, so a slot is always replaced whole.

use chrono::Utc;
use palaver_core::storage::kv_store::KvStore;
use palaver_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM kv_slots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO kv_slots (key, value, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM kv_slots WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::history::persistence::{HISTORY_SLOT, HistoryPersistence, NAME_SLOT};
    use palaver_types::message::Message;

    async fn test_store() -> (tempfile::TempDir, SqliteKvStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(dir.path()).await.unwrap();
        (dir, SqliteKvStore::new(pool))
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let (_dir, store) = test_store().await;
        store.set("user_name", "Alex").await.unwrap();
        assert_eq!(store.get("user_name").await.unwrap().as_deref(), Some("Alex"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let (_dir, store) = test_store().await;
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_replaces_whole_value() {
        let (_dir, store) = test_store().await;
        store.set("chat_history", "[1,2,3]").await.unwrap();
        store.set("chat_history", "[]").await.unwrap();

        assert_eq!(store.get("chat_history").await.unwrap().as_deref(), Some("[]"));
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_slots")
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_delete_and_delete_missing() {
        let (_dir, store) = test_store().await;
        store.set("temp", "value").await.unwrap();
        store.delete("temp").await.unwrap();
        assert!(store.get("temp").await.unwrap().is_none());

        // Deleting an absent slot is a no-op.
        store.delete("temp").await.unwrap();
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let messages = vec![Message::user("I'm Alex"), Message::bot_error("Sorry")];

        {
            let store = SqliteKvStore::new(DatabasePool::open(dir.path()).await.unwrap());
            let persistence = HistoryPersistence::new(store);
            persistence.save(&messages).await;
            persistence.save_name("Alex").await;
        }

        let store = SqliteKvStore::new(DatabasePool::open(dir.path()).await.unwrap());
        let persistence = HistoryPersistence::new(store.clone());
        assert_eq!(persistence.load().await, messages);
        assert_eq!(persistence.load_name().await.as_deref(), Some("Alex"));

        persistence.clear().await;
        assert!(store.get(HISTORY_SLOT).await.unwrap().is_none());
        assert!(store.get(NAME_SLOT).await.unwrap().is_none());
    }
}
