//! Integration tests for the session signal bus.

#![cfg(feature = "test-utils")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use portico_common::testing::EventCounter;
use portico_common::{AuthEvent, SessionSignal};

/// Every counter registered before the emit observes exactly one event.
#[test]
fn test_counters_observe_each_emit() {
    let signal = SessionSignal::new();
    let first = EventCounter::attach(&signal);
    let second = EventCounter::attach(&signal);

    signal.emit(AuthEvent::Expired);

    assert_eq!(first.count(), 1);
    assert_eq!(second.count(), 1);

    drop(first);
    signal.emit(AuthEvent::Expired);
    assert_eq!(second.count(), 2);
    assert_eq!(signal.listener_count(), 1);
}

/// Listeners registered after an emit do not see it.
#[test]
fn test_late_listener_misses_earlier_event() {
    let signal = SessionSignal::new();
    signal.emit(AuthEvent::Expired);

    let counter = EventCounter::attach(&signal);
    assert_eq!(counter.count(), 0);
}

/// Delivery completes before `emit` returns, across threads.
#[test]
fn test_emit_is_synchronous_across_threads() {
    let signal = SessionSignal::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&hits);
    let _sub = signal.subscribe(move |_| {
        observed.fetch_add(1, Ordering::SeqCst);
    });

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let publisher = signal.clone();
            std::thread::spawn(move || publisher.emit(AuthEvent::Expired))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }

    assert_eq!(hits.load(Ordering::SeqCst), 4);
}
