//! Two-tier public response cache
//!
//! Lookup order for [`PublicCache::get`]:
//! 1. fresh entry in the in-process map
//! 2. a fetch already in flight for the key (joined, not repeated)
//! 3. a new fetch task, which first tries a fresh entry in the persistent
//!    store (promoted into the map) and only then calls the fetcher
//!
//! When a fetch fails and the call allows it, any cached entry for the key is
//! returned regardless of age. The in-flight entry is removed in the same
//! critical section that records the outcome, so the next caller either sees
//! the new entry or starts a new fetch.
//!
//! The lock guards only the in-process map and the in-flight registry.
//! Persistent reads and writes run on the blocking pool with no lock held,
//! and are best effort: a store that errors or holds unreadable data
//! degrades the cache to memory only.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use portico_common::{Clock, KeyValueStore, StorageError, StorageResult, SystemClock};
use portico_domain::{PorticoError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::entry::{CacheEntry, CacheOptions, CacheSettings};

type SharedFetch = Shared<BoxFuture<'static, Result<Value>>>;

#[derive(Default)]
struct CacheState {
    memory: HashMap<String, CacheEntry<Value>>,
    inflight: HashMap<String, SharedFetch>,
}

struct CacheInner<C: Clock> {
    state: Mutex<CacheState>,
    store: Arc<dyn KeyValueStore>,
    clock: C,
    settings: CacheSettings,
}

/// Cache for read-mostly public endpoints.
///
/// Cloning is cheap and every clone shares the same tiers and in-flight
/// registry. Values are held as JSON so the persistent tier stores exactly
/// what the backend returned.
pub struct PublicCache<C: Clock = SystemClock> {
    inner: Arc<CacheInner<C>>,
}

impl<C: Clock> Clone for PublicCache<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: Clock> fmt::Debug for PublicCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PublicCache")
            .field("entries", &state.memory.len())
            .field("in_flight", &state.inflight.len())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

impl PublicCache<SystemClock> {
    pub fn new(store: Arc<dyn KeyValueStore>, settings: CacheSettings) -> Self {
        Self::with_clock(store, SystemClock, settings)
    }
}

impl<C: Clock> PublicCache<C> {
    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: C, settings: CacheSettings) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                state: Mutex::new(CacheState::default()),
                store,
                clock,
                settings,
            }),
        }
    }

    /// Return the cached value for `key` or fetch it.
    ///
    /// The fetch runs on its own task: it completes and populates the cache
    /// even if every caller waiting on it is dropped. Concurrent callers for
    /// the same key share one fetch and its outcome; the options of the
    /// caller that started the fetch apply.
    ///
    /// # Errors
    /// The fetcher's error, unless a stale entry could be served instead.
    /// `PorticoError::Decode` when the cached JSON does not fit `T`.
    pub async fn get<T, F, Fut>(&self, key: &str, fetcher: F, options: CacheOptions) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let value = self
            .get_value(
                key,
                move || async move {
                    let fetched = fetcher().await?;
                    serde_json::to_value(fetched).map_err(|err| {
                        PorticoError::Internal(format!("cache value is not serializable: {err}"))
                    })
                },
                options,
            )
            .await?;

        serde_json::from_value(value).map_err(|err| {
            PorticoError::Decode(format!("cached value for '{key}' has unexpected shape: {err}"))
        })
    }

    /// Untyped form of [`get`](Self::get).
    #[instrument(skip(self, fetcher, options), fields(key = %key))]
    pub async fn get_value<F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: CacheOptions,
    ) -> Result<Value>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let pending = {
            let mut state = self.inner.state.lock();
            let now = self.inner.clock.millis_since_epoch();

            if let Some(entry) = state.memory.get(key).filter(|entry| entry.is_fresh(now)) {
                debug!(tier = "memory", "cache hit");
                return Ok(entry.value.clone());
            }

            match state.inflight.get(key) {
                Some(pending) => {
                    debug!("joining in-flight fetch");
                    pending.clone()
                }
                None => {
                    let pending = self.start_fetch(key, fetcher, options);
                    state.inflight.insert(key.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Remove `keys` from both tiers.
    ///
    /// A fetch already in flight for one of the keys is not aborted and
    /// stores its result when it settles.
    pub async fn invalidate<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let storage_keys: Vec<String> = {
            let mut state = self.inner.state.lock();
            keys.into_iter()
                .map(|key| {
                    let key = key.as_ref();
                    state.memory.remove(key);
                    debug!(key, "cache entry invalidated");
                    self.inner.storage_key(key)
                })
                .collect()
        };

        let removed = run_blocking(&self.inner.store, move |store| {
            for storage_key in &storage_keys {
                store.remove(storage_key)?;
            }
            Ok(())
        })
        .await;
        if let Err(err) = removed {
            debug!(error = %err, "persistent cache removal failed");
        }
    }

    /// In-memory entry for `key`, fresh or not.
    pub fn peek(&self, key: &str) -> Option<CacheEntry<Value>> {
        self.inner.state.lock().memory.get(key).cloned()
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.inner.state.lock().inflight.contains_key(key)
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.inner.settings
    }

    fn start_fetch<F, Fut>(&self, key: &str, fetcher: F, options: CacheOptions) -> SharedFetch
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let ttl = options.ttl.unwrap_or(self.inner.settings.default_ttl);
        let allow_stale = options.allow_stale_on_error;
        debug!(ttl_ms = ttl.as_millis() as u64, allow_stale, "cache miss, starting fetch");

        let task_inner = Arc::clone(&self.inner);
        let task_key = key.to_string();
        let handle = tokio::spawn(async move {
            let persisted = task_inner.read_persistent(&task_key).await;
            let now = task_inner.clock.millis_since_epoch();
            if let Some(entry) = persisted.filter(|entry| entry.is_fresh(now)) {
                debug!(key = %task_key, tier = "persistent", "cache hit, promoting to memory");
                return Ok(task_inner.record(&task_key, entry));
            }

            let outcome = fetcher().await;
            task_inner.settle(&task_key, outcome, ttl, allow_stale).await
        });

        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        async move {
            match handle.await {
                Ok(result) => result,
                Err(err) => {
                    inner.state.lock().inflight.remove(&key);
                    Err(PorticoError::Internal(format!(
                        "cache fetch for '{key}' did not complete: {err}"
                    )))
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl<C: Clock> CacheInner<C> {
    async fn settle(
        &self,
        key: &str,
        outcome: Result<Value>,
        ttl: Duration,
        allow_stale: bool,
    ) -> Result<Value> {
        match outcome {
            Ok(value) => {
                let expires_at =
                    self.clock.millis_since_epoch().saturating_add(ttl.as_millis() as u64);
                let entry = CacheEntry::new(value, expires_at);
                self.write_persistent(key, &entry).await;
                debug!(key, expires_at, "cache entry stored");
                Ok(self.record(key, entry))
            }
            Err(err) if allow_stale => {
                let in_memory = self.state.lock().memory.contains_key(key);
                let persisted =
                    if in_memory { None } else { self.read_persistent(key).await };

                let mut state = self.state.lock();
                state.inflight.remove(key);
                let stale = match state.memory.get(key) {
                    Some(entry) => Some(entry.value.clone()),
                    None => persisted.map(|entry| {
                        let value = entry.value.clone();
                        state.memory.insert(key.to_string(), entry);
                        value
                    }),
                };
                match stale {
                    Some(value) => {
                        warn!(key, error = %err, "fetch failed, serving stale cache entry");
                        Ok(value)
                    }
                    None => Err(err),
                }
            }
            Err(err) => {
                self.state.lock().inflight.remove(key);
                Err(err)
            }
        }
    }

    /// Store `entry` in memory and retire the in-flight fetch for `key`.
    fn record(&self, key: &str, entry: CacheEntry<Value>) -> Value {
        let value = entry.value.clone();
        let mut state = self.state.lock();
        state.inflight.remove(key);
        state.memory.insert(key.to_string(), entry);
        value
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.settings.storage_prefix, key)
    }

    async fn read_persistent(&self, key: &str) -> Option<CacheEntry<Value>> {
        let storage_key = self.storage_key(key);
        let raw = match run_blocking(&self.store, move |store| store.get(&storage_key)).await {
            Ok(raw) => raw?,
            Err(err) => {
                debug!(key, error = %err, "persistent cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(key, error = %err, "ignoring unreadable persistent cache entry");
                None
            }
        }
    }

    async fn write_persistent(&self, key: &str, entry: &CacheEntry<Value>) {
        let raw = match serde_json::to_string(entry) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(key, error = %err, "cache entry not serializable, memory only");
                return;
            }
        };

        let storage_key = self.storage_key(key);
        if let Err(err) = run_blocking(&self.store, move |store| store.set(&storage_key, &raw)).await
        {
            debug!(key, error = %err, "persistent cache write failed, memory only");
        }
    }
}

/// Run a store call on the blocking pool.
async fn run_blocking<T, F>(store: &Arc<dyn KeyValueStore>, op: F) -> StorageResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn KeyValueStore) -> StorageResult<T> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|err| StorageError::Unavailable(format!("storage task failed: {err}")))?
}
