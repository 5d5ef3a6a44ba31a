//! Sticky pool benchmarks.
//!
//! Measures the held-connection fast path and the uncontended reserve cycle.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use sticky_pool::pool::mock::MockPool;
use sticky_pool::pool::{Pooler, StickyConnPool};

fn bench_get_held(c: &mut Criterion) {
    let mut group = c.benchmark_group("sticky_get");
    group.throughput(Throughput::Elements(1));

    let pool = StickyConnPool::new(Arc::new(MockPool::new()), true);
    let _ = pool.get();

    group.bench_function("held", |b| {
        b.iter(|| {
            let (conn, _) = pool.get().unwrap();
            pool.put(black_box(&conn)).unwrap();
        })
    });

    group.finish();
}

fn bench_reserve_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("sticky_cycle");
    group.throughput(Throughput::Elements(1));

    let shared = Arc::new(MockPool::new());
    group.bench_function("new_get_close", |b| {
        b.iter(|| {
            let pool = StickyConnPool::new(Arc::clone(&shared), true);
            let (conn, _) = pool.get().unwrap();
            black_box(&conn);
            pool.close().unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_held, bench_reserve_cycle);
criterion_main!(benches);
