//! Session token store
//!
//! Holds the active bearer token in memory and mirrors it to the persistent
//! store under a fixed key. The in-memory value is authoritative for the life
//! of the process; persistent writes are best effort.
//!
//! Mutations swap the in-memory value under its lock and then schedule a
//! mirror write on the blocking pool. Each mirror write persists whatever is
//! current when it runs, serialized by a separate lock, so the store always
//! converges on the latest token. [`TokenStore::flush`] waits for that.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use portico_common::KeyValueStore;
use portico_domain::{PorticoError, Result};
use tracing::{debug, info, warn};

struct Shared {
    current: RwLock<Option<String>>,
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    mirror_lock: Mutex<()>,
}

impl Shared {
    fn mirror(&self) {
        let _serial = self.mirror_lock.lock();
        let snapshot = self.current.read().clone();
        let result = match snapshot {
            Some(token) => self.store.set(&self.storage_key, &token),
            None => self.store.remove(&self.storage_key),
        };
        if let Err(err) = result {
            debug!(error = %err, "session token not persisted, keeping it in memory");
        }
    }
}

pub struct TokenStore {
    shared: Arc<Shared>,
}

impl TokenStore {
    /// Create a store and restore any token persisted under `storage_key`.
    ///
    /// Reads the store on the calling thread; async callers use
    /// [`open`](Self::open).
    pub fn new(store: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let restored = match store.get(&storage_key) {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(err) => {
                warn!(error = %err, "could not read persisted session token");
                None
            }
        };
        if restored.is_some() {
            info!("restored persisted session token");
        }

        Self {
            shared: Arc::new(Shared {
                current: RwLock::new(restored),
                store,
                storage_key,
                mirror_lock: Mutex::new(()),
            }),
        }
    }

    /// [`new`](Self::new) with the restore read on the blocking pool.
    ///
    /// # Errors
    /// `PorticoError::Internal` if the blocking task does not complete.
    pub async fn open(store: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Result<Self> {
        let storage_key = storage_key.into();
        tokio::task::spawn_blocking(move || Self::new(store, storage_key))
            .await
            .map_err(|err| PorticoError::Internal(format!("token store restore failed: {err}")))
    }

    pub fn get(&self) -> Option<String> {
        self.shared.current.read().clone()
    }

    pub fn is_present(&self) -> bool {
        self.shared.current.read().is_some()
    }

    /// Replace the token. An empty token clears the session.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            self.clear();
            return;
        }

        *self.shared.current.write() = Some(token);
        self.schedule_mirror();
    }

    pub fn clear(&self) {
        *self.shared.current.write() = None;
        self.schedule_mirror();
    }

    /// Replace `expected` with `token` only if `expected` is still current.
    ///
    /// Returns whether the swap happened. An empty `token` clears instead.
    pub fn replace_if_current(&self, expected: &str, token: impl Into<String>) -> bool {
        let token = token.into();
        {
            let mut current = self.shared.current.write();
            if current.as_deref() != Some(expected) {
                return false;
            }
            *current = if token.is_empty() { None } else { Some(token) };
        }
        self.schedule_mirror();
        true
    }

    /// Clear the session only if `expected` is still current.
    pub fn clear_if_current(&self, expected: &str) -> bool {
        {
            let mut current = self.shared.current.write();
            if current.as_deref() != Some(expected) {
                return false;
            }
            *current = None;
        }
        self.schedule_mirror();
        true
    }

    /// Wait until the persistent store holds the current token.
    pub async fn flush(&self) {
        let shared = Arc::clone(&self.shared);
        if let Err(err) = tokio::task::spawn_blocking(move || shared.mirror()).await {
            debug!(error = %err, "session token flush did not complete");
        }
    }

    /// Mirror on the blocking pool inside a runtime, inline outside one.
    fn schedule_mirror(&self) {
        let shared = Arc::clone(&self.shared);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || shared.mirror());
            }
            Err(_) => shared.mirror(),
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.is_present())
            .field("storage_key", &self.shared.storage_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use portico_common::testing::{FailingStore, GatedStore};
    use portico_common::MemoryStore;

    use super::*;

    const KEY: &str = "portfolio_auth_token";

    #[test]
    fn set_and_clear_write_through() {
        let backing = Arc::new(MemoryStore::new());
        let tokens = TokenStore::new(backing.clone(), KEY);

        tokens.set("abc");
        assert_eq!(tokens.get().as_deref(), Some("abc"));
        assert_eq!(backing.get(KEY).unwrap().as_deref(), Some("abc"));

        tokens.clear();
        assert_eq!(tokens.get(), None);
        assert_eq!(backing.get(KEY).unwrap(), None);
    }

    #[test]
    fn empty_token_clears() {
        let backing = Arc::new(MemoryStore::new());
        let tokens = TokenStore::new(backing.clone(), KEY);
        tokens.set("abc");

        tokens.set("");

        assert!(!tokens.is_present());
        assert!(backing.is_empty());
    }

    #[test]
    fn restores_persisted_token() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(KEY, "persisted").unwrap();

        let tokens = TokenStore::new(backing, KEY);

        assert_eq!(tokens.get().as_deref(), Some("persisted"));
    }

    #[test]
    fn compare_and_swap_respects_newer_token() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()), KEY);
        tokens.set("old");

        assert!(tokens.replace_if_current("old", "new"));
        assert!(!tokens.replace_if_current("old", "newer"));
        assert!(!tokens.clear_if_current("old"));
        assert_eq!(tokens.get().as_deref(), Some("new"));

        assert!(tokens.clear_if_current("new"));
        assert!(!tokens.is_present());
    }

    #[test]
    fn storage_failure_keeps_memory_value() {
        let backing = Arc::new(FailingStore::new());
        let tokens = TokenStore::new(backing, KEY);

        tokens.set("abc");

        assert_eq!(tokens.get().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn parked_write_does_not_block_callers() {
        let backing = Arc::new(GatedStore::new());
        let tokens = TokenStore::new(backing.clone(), KEY);
        backing.close();

        tokens.set("abc");
        while backing.writes_started() < 1 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert_eq!(tokens.get().as_deref(), Some("abc"));
        assert!(tokens.replace_if_current("abc", "def"));
        assert_eq!(tokens.get().as_deref(), Some("def"));

        backing.open();
        tokens.flush().await;
        assert_eq!(backing.get(KEY).unwrap().as_deref(), Some("def"));
    }

    #[tokio::test]
    async fn open_restores_on_blocking_pool() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(KEY, "persisted").unwrap();

        let tokens = TokenStore::open(backing, KEY).await.unwrap();

        assert_eq!(tokens.get().as_deref(), Some("persisted"));
    }
}
