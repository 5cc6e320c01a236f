//! Criterion benchmarks for the sliding-window limiter: hot key, many keys, rejection path.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tokio::runtime::Runtime;
use warden_limiter::SlidingWindowLimiter;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime")
}

fn bench_hot_key(c: &mut Criterion) {
    let rt = runtime();
    let limiter = SlidingWindowLimiter::new(usize::MAX, Duration::from_millis(1)).unwrap();
    let mut g = c.benchmark_group("is_allowed");
    g.throughput(Throughput::Elements(1));
    g.bench_function("hot_key", |b| {
        b.to_async(&rt).iter(|| async { black_box(limiter.is_allowed("hot").await) });
    });
    g.finish();
}

fn bench_many_keys(c: &mut Criterion) {
    let rt = runtime();
    let limiter = SlidingWindowLimiter::new(10, Duration::from_secs(60)).unwrap();
    let keys: Vec<String> = (0..10_000).map(|i| format!("client:{i}")).collect();
    let (keys, limiter) = (&keys, &limiter);
    let mut g = c.benchmark_group("is_allowed");
    g.throughput(Throughput::Elements(1));
    g.bench_function("many_keys", |b| {
        let mut i = 0usize;
        b.to_async(&rt).iter(move || {
            i = (i + 1) % keys.len();
            let key = &keys[i];
            async move { black_box(limiter.is_allowed(key).await) }
        });
    });
    g.finish();
}

fn bench_rejection(c: &mut Criterion) {
    let rt = runtime();
    let limiter = SlidingWindowLimiter::new(100, Duration::from_secs(3600)).unwrap();
    rt.block_on(async {
        for _ in 0..100 {
            limiter.is_allowed("full").await;
        }
    });
    let mut g = c.benchmark_group("is_allowed");
    g.throughput(Throughput::Elements(1));
    g.bench_function("rejected_full_window", |b| {
        b.to_async(&rt).iter(|| async { black_box(limiter.is_allowed("full").await) });
    });
    g.finish();
}

criterion_group!(benches, bench_hot_key, bench_many_keys, bench_rejection);
criterion_main!(benches);
