//! Session signal benchmarks
//!
//! Measures emit cost as the listener list grows.
//!
//! Run with: `cargo bench --bench signal_bench -p portico-common --features
//! runtime`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use portico_common::{AuthEvent, SessionSignal};

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_emit");

    for listeners in [1usize, 8, 64] {
        let signal = SessionSignal::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let subscriptions: Vec<_> = (0..listeners)
            .map(|_| {
                let hits = Arc::clone(&hits);
                signal.subscribe(move |_| {
                    hits.fetch_add(1, Ordering::Relaxed);
                })
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(listeners), &listeners, |b, _| {
            b.iter(|| black_box(signal.emit(AuthEvent::Expired)));
        });

        drop(subscriptions);
    }

    group.finish();
}

criterion_group!(benches, bench_emit);
criterion_main!(benches);
