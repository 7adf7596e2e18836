//! Key-value slot trait.
//!
//! Defines the interface for the local persistence medium: a flat set of
//! named slots holding opaque text. Implementations live in palaver-infra
//! (SQLite) and in [`super::memory`] (in-memory, for tests and ephemeral runs).

use std::sync::Arc;

use palaver_types::error::RepositoryError;

/// Trait for slot-keyed persistent storage.
///
/// Every `set` replaces the whole value of a slot; there is no partial
/// update. Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a slot's value. Returns None if the slot does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Overwrite a slot (upsert).
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove a slot. No-op if the slot does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

impl<K: KvStore> KvStore for Arc<K> {
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        (**self).set(key, value)
    }

    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        (**self).delete(key)
    }
}
