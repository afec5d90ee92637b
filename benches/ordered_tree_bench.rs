//! Benchmark for ordered trees vs standard BTreeMap.

use bpptree::{Identity, Ordered, OrderedMap, Persistent, SearchMode};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;

// =============================================================================
// insert_or_assign Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("OrderedMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = OrderedMap::new();
                for index in 0..size {
                    map = map.insert_or_assign((black_box(index), black_box(index * 2)));
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = BTreeMap::new();
                for index in 0..size {
                    map.insert(black_box(index), black_box(index * 2));
                }
                black_box(map)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [1_000, 100_000] {
        let map: OrderedMap<i32, i32> = (0..size).map(|index| (index, index)).collect();
        let standard: BTreeMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(BenchmarkId::new("OrderedMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                for key in (0..size).step_by(7) {
                    black_box(map.get(black_box(&key)));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                for key in (0..size).step_by(7) {
                    black_box(standard.get(black_box(&key)));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Search Mode Benchmark
// =============================================================================

fn benchmark_search_mode(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("search_mode");

    for search in [SearchMode::Linear, SearchMode::Binary] {
        let mut builder = Persistent::<u64, Ordered<Identity>>::with_policy(Ordered::new().with_search(search))
            .transient();
        builder.extend(0..100_000);
        let set = builder.persistent();

        group.bench_function(BenchmarkId::new("lower_bound", format!("{search:?}")), |bencher| {
            bencher.iter(|| {
                for key in (0..100_000).step_by(13) {
                    black_box(set.lower_bound(black_box(&key)));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// erase_key Benchmark
// =============================================================================

fn benchmark_erase(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("erase");

    for size in [1_000, 10_000] {
        let map: OrderedMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(BenchmarkId::new("OrderedMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut current = map.clone();
                for key in (0..size).step_by(3) {
                    current = current.erase_key(black_box(&key));
                }
                black_box(current)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_search_mode,
    benchmark_erase,
);

criterion_main!(benches);
