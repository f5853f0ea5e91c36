//! Process-wide session signal
//!
//! The request layer publishes [`AuthEvent::Expired`] when the backend
//! answers 401; the session manager (and anyone else) subscribes. Delivery is
//! synchronous: `emit` returns after every listener has run, so listeners
//! observe the event before the failing call returns its error.
//!
//! Fire-and-forget semantics: listeners return nothing and `emit` only
//! reports how many listeners were called.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

/// Events published on the session signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEvent {
    /// The backend rejected the current bearer token (`auth:expired`).
    Expired,
}

impl AuthEvent {
    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            Self::Expired => "auth:expired",
        }
    }
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Listener = Arc<dyn Fn(AuthEvent) + Send + Sync>;

struct SignalInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

/// Observer list shared between publishers and subscribers.
///
/// Cheap to clone; every clone refers to the same listener list.
#[derive(Clone)]
pub struct SessionSignal {
    inner: Arc<SignalInner>,
}

impl SessionSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(AuthEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        trace!(listener_id = id, "session signal listener registered");
        Subscription { id, signal: Arc::downgrade(&self.inner) }
    }

    /// Deliver `event` to every registered listener, in registration order.
    ///
    /// The listener list is snapshotted first, so a listener may subscribe
    /// or unsubscribe while being called.
    pub fn emit(&self, event: AuthEvent) -> usize {
        let listeners: Vec<Listener> =
            self.inner.listeners.lock().iter().map(|(_, listener)| Arc::clone(listener)).collect();

        debug!(event = %event, listeners = listeners.len(), "emitting session signal");
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSignal").field("listeners", &self.listener_count()).finish()
    }
}

/// Handle that unregisters its listener on drop.
pub struct Subscription {
    id: u64,
    signal: Weak<SignalInner>,
}

impl Subscription {
    /// Unregister now. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
            trace!(listener_id = self.id, "session signal listener removed");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn emit_reaches_every_listener_once() {
        let signal = SessionSignal::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&first);
        let _sub_a = signal.subscribe(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        });
        let b = Arc::clone(&second);
        let _sub_b = signal.subscribe(move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(signal.emit(AuthEvent::Expired), 2);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let signal = SessionSignal::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let sub = signal.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(signal.listener_count(), 1);

        drop(sub);
        assert_eq!(signal.emit(AuthEvent::Expired), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listener_may_unsubscribe_during_emit() {
        let signal = SessionSignal::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let inner_slot = Arc::clone(&slot);
        let sub = signal.subscribe(move |_| {
            inner_slot.lock().take();
        });
        *slot.lock() = Some(sub);

        assert_eq!(signal.emit(AuthEvent::Expired), 1);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn clones_share_listeners() {
        let signal = SessionSignal::new();
        let publisher = signal.clone();
        let _sub = signal.subscribe(|_| {});
        assert_eq!(publisher.emit(AuthEvent::Expired), 1);
        assert_eq!(AuthEvent::Expired.to_string(), "auth:expired");
    }
}
