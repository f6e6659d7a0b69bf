use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fleetwatch_core::{StatusFilter, StatusStore};
use fleetwatch_types::{Status, StatusTree};
use std::sync::Arc;
use std::thread;

/// Build a fleet of `namespaces` x 4 alarms x 8 hosts x 2 tags.
fn fleet(namespaces: usize) -> StatusTree {
    let mut tree = StatusTree::new();
    for n in 0..namespaces {
        for a in 0..4 {
            for h in 0..8 {
                for t in 0..2 {
                    let level = if (n + a + h + t) % 17 == 0 { "CRITICAL" } else { "OK" };
                    tree.insert(
                        format!("svc{n}.prod"),
                        format!("alarm-{a}"),
                        format!("host-{h}"),
                        format!("tag-{t}"),
                        Status::new(level, 0),
                    );
                }
            }
        }
    }
    tree
}

/// Benchmark single-threaded query cost as the tree grows
fn bench_queries_by_tree_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries_by_tree_size");

    for namespaces in [10, 100, 1000].iter() {
        let store = StatusStore::from_tree(fleet(*namespaces));
        group.throughput(Throughput::Elements(*namespaces as u64 * 64));

        group.bench_with_input(BenchmarkId::new("namespace_health", namespaces), &store, |b, store| {
            b.iter(|| black_box(store.namespace_health()))
        });
        group.bench_with_input(BenchmarkId::new("failing_hosts", namespaces), &store, |b, store| {
            b.iter(|| black_box(store.failing_hosts()))
        });
        group.bench_with_input(BenchmarkId::new("status_list_critical", namespaces), &store, |b, store| {
            let filter = StatusFilter::new().level("CRITICAL");
            b.iter(|| black_box(store.status_list(&filter)))
        });
    }
    group.finish();
}

/// Benchmark concurrent readers against a static tree
fn bench_concurrent_readers(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_readers");
    let store = Arc::new(StatusStore::from_tree(fleet(100)));

    for thread_count in [1, 2, 4, 8].iter() {
        group.throughput(Throughput::Elements(*thread_count as u64 * 100));
        group.bench_with_input(
            BenchmarkId::new("threads", thread_count),
            thread_count,
            |b, &thread_count| {
                b.iter(|| {
                    let handles: Vec<_> = (0..thread_count)
                        .map(|_| {
                            let store = Arc::clone(&store);
                            thread::spawn(move || {
                                for _ in 0..100 {
                                    black_box(store.namespace_health());
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

/// Benchmark readers racing a single writer (lock contention)
fn bench_readers_with_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("readers_with_writer");

    for reader_count in [2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(reader_count),
            reader_count,
            |b, &reader_count| {
                b.iter(|| {
                    let store = Arc::new(StatusStore::from_tree(fleet(50)));

                    let writer = {
                        let store = Arc::clone(&store);
                        thread::spawn(move || {
                            for i in 0..200 {
                                let level = if i % 2 == 0 { "CRITICAL" } else { "OK" };
                                store.set_status("svc0.prod", "alarm-0", "host-0", "tag-0", Status::new(level, 0));
                            }
                        })
                    };

                    let readers: Vec<_> = (0..reader_count)
                        .map(|_| {
                            let store = Arc::clone(&store);
                            thread::spawn(move || {
                                for _ in 0..50 {
                                    black_box(store.alarm_health());
                                }
                            })
                        })
                        .collect();

                    writer.join().unwrap();
                    for reader in readers {
                        reader.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_queries_by_tree_size,
    bench_concurrent_readers,
    bench_readers_with_writer
);
criterion_main!(benches);
