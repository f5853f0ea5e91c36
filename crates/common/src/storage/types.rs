//! Storage trait definitions

use std::sync::Arc;

use super::error::StorageResult;

/// Synchronous string key/value store.
///
/// Every operation reports failure through [`StorageResult`]. Callers on a
/// best-effort path (cache tiers, token mirroring) are expected to inspect
/// and discard the error themselves.
///
/// Calls may block on disk or a connection pool. Async callers run them with
/// `tokio::task::spawn_blocking` and never while holding a lock other tasks
/// wait on.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
