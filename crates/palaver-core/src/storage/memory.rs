//! In-memory key-value store.
//!
//! Backs `--ephemeral` sessions and the unit tests of everything that
//! persists. Writes can be switched to fail so the best-effort persistence
//! policy can be exercised.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use palaver_types::error::RepositoryError;

use super::kv_store::KvStore;

/// Process-local [`KvStore`] backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    slots: DashMap<String, String>,
    fail_writes: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`delete` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Whether a slot currently exists.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Raw slot value, bypassing the async trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.get(key).map(|v| v.value().clone())
    }

    /// Seed a slot directly, bypassing failure injection.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.slots.insert(key.to_string(), value.to_string());
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        self.check_writable()?;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.check_writable()?;
        self.slots.remove(key);
        Ok(())
    }
}
