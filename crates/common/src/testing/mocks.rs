//! Mock implementations of common traits

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::signal::{AuthEvent, SessionSignal, Subscription};
use crate::storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};

/// Store that can be switched between working and failing.
///
/// Starts failing; call [`FailingStore::recover`] to let operations through
/// to the inner memory store.
#[derive(Debug)]
pub struct FailingStore {
    failing: AtomicBool,
    attempts: AtomicUsize,
    inner: MemoryStore,
}

impl FailingStore {
    pub fn new() -> Self {
        Self { failing: AtomicBool::new(true), attempts: AtomicUsize::new(0), inner: MemoryStore::new() }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// Number of operations attempted, failed or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn check(&self) -> StorageResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("storage disabled for test".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.check()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.remove(key)
    }
}

/// Store whose writes park while the gate is closed.
///
/// Reads and removals pass straight through. Lets tests hold a persistent
/// write in progress and check what other callers can still do.
#[derive(Debug, Default)]
pub struct GatedStore {
    closed: Mutex<bool>,
    opened: Condvar,
    writes_started: AtomicUsize,
    inner: MemoryStore,
}

impl GatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        *self.closed.lock() = true;
    }

    pub fn open(&self) {
        *self.closed.lock() = false;
        self.opened.notify_all();
    }

    /// Number of `set` calls that have started, parked or not.
    pub fn writes_started(&self) -> usize {
        self.writes_started.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for GatedStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.writes_started.fetch_add(1, Ordering::SeqCst);
        let mut closed = self.closed.lock();
        while *closed {
            self.opened.wait(&mut closed);
        }
        drop(closed);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key)
    }
}

/// Counts events observed on a [`SessionSignal`].
pub struct EventCounter {
    count: Arc<AtomicUsize>,
    _subscription: Subscription,
}

impl EventCounter {
    pub fn attach(signal: &SessionSignal) -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&count);
        let subscription = signal.subscribe(move |event| {
            if event == AuthEvent::Expired {
                observed.fetch_add(1, Ordering::SeqCst);
            }
        });
        Self { count, _subscription: subscription }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
