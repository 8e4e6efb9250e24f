//! Throughput Benchmark for Durin
//!
//! This benchmark measures the parser, the router and the store under
//! the workloads a client typically sends: long runs of `set` and `get`.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use durin::commands::Router;
use durin::protocol::parse;
use durin::storage::{snapshot, Store};
use std::sync::Arc;
use std::time::Duration;

/// Benchmark request line parsing
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set", |b| {
        b.iter(|| black_box(parse(black_box("set user:1001 some value here\n"))));
    });

    group.bench_function("get", |b| {
        b.iter(|| black_box(parse(black_box("get user:1001\n"))));
    });

    group.bench_function("keys_with_spaces", |b| {
        b.iter(|| black_box(parse(black_box("keys us er:\n"))));
    });

    group.finish();
}

/// Benchmark full request lines through the router
fn bench_execute(c: &mut Criterion) {
    let router = Router::new(Arc::new(Store::new()));

    let mut group = c.benchmark_group("execute");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_10k", |b| {
        b.iter(|| {
            for i in 0..10_000 {
                black_box(router.execute(&format!("set {} bar\n", i)));
            }
        });
    });

    group.bench_function("get_10k", |b| {
        b.iter(|| {
            for i in 0..10_000 {
                black_box(router.execute(&format!("get {}\n", i)));
            }
        });
    });

    group.finish();
}

/// Benchmark mixed workload (80% reads, 20% writes)
fn bench_mixed(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    // Pre-populate
    for i in 0..10_000 {
        store.set(format!("key:{}", i), format!("value:{}", i));
    }

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    group.bench_function("80_read_20_write", |b| {
        let mut i = 0u64;
        b.iter(|| {
            if i % 5 == 0 {
                // 20% writes
                store.set(format!("new:{}", i), "value");
            } else {
                // 80% reads
                black_box(store.get(&format!("key:{}", i % 10_000)));
            }
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent access through the single lock
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let store = Arc::new(Store::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let key = format!("key:{}:{}", t, i);
                            store.set(key.clone(), "value");
                            store.get(&key);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(store.len());
        });
    });

    group.finish();
}

/// Benchmark prefix listing and the persister's compare step
fn bench_scan(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    for i in 0..1_000 {
        store.set(format!("user:{}", i), "user_data");
        store.set(format!("session:{}", i), "session_data");
        store.set(format!("cache:{}", i), "cache_data");
    }
    let on_disk = store.snapshot();

    let mut group = c.benchmark_group("scan");

    group.bench_function("keys_prefix", |b| {
        b.iter(|| black_box(store.list("user:")));
    });

    group.bench_function("json_prefix", |b| {
        b.iter(|| black_box(store.list_as_json("session:")));
    });

    group.bench_function("diff_unchanged", |b| {
        b.iter(|| black_box(store.diff_snapshot(&on_disk)));
    });

    group.bench_function("encode_snapshot", |b| {
        b.iter(|| black_box(snapshot::encode(&on_disk)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_execute,
    bench_mixed,
    bench_concurrent,
    bench_scan,
);

criterion_main!(benches);
