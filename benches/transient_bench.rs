//! Benchmark for transient trees.
//!
//! Compares batch updates through transient handles against the same
//! updates applied one persistent version at a time.

use bpptree::{IndexedTree, OrderedMap, TransientIndexedTree, TransientOrderedMap};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

// =============================================================================
// Indexed Benchmarks
// =============================================================================

fn benchmark_transient_emplace_back(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("transient_emplace_back");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("TransientIndexedTree", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut transient = TransientIndexedTree::new();
                    for index in 0..size {
                        transient.emplace_back(black_box(index));
                    }
                    black_box(transient.persistent())
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("IndexedTree", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut tree = IndexedTree::new();
                for index in 0..size {
                    tree = tree.emplace_back(black_box(index));
                }
                black_box(tree)
            });
        });
    }

    group.finish();
}

fn benchmark_transient_assign(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("transient_assign");

    for size in [1_000, 10_000, 100_000] {
        let tree: IndexedTree<i32> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("TransientIndexedTree", size),
            &size,
            |bencher, &size| {
                bencher.iter_batched(
                    || tree.clone().transient(),
                    |mut transient| {
                        for index in (0..size as usize).step_by(10) {
                            transient.assign_index(black_box(index), black_box(999));
                        }
                        black_box(transient.persistent())
                    },
                    BatchSize::SmallInput,
                );
            },
        );

        group.bench_with_input(BenchmarkId::new("IndexedTree", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut current = tree.clone();
                for index in (0..size as usize).step_by(10) {
                    current = current.assign_index(black_box(index), black_box(999));
                }
                black_box(current)
            });
        });
    }

    group.finish();
}

fn benchmark_roundtrip(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("transient_roundtrip");

    for size in [1_000, 100_000] {
        let tree: IndexedTree<i32> = (0..size).collect();

        // persistent -> transient -> persistent
        group.bench_with_input(BenchmarkId::new("roundtrip", size), &size, |bencher, _| {
            bencher.iter(|| black_box(tree.clone().transient().persistent()));
        });
    }

    group.finish();
}

// =============================================================================
// Ordered Benchmarks
// =============================================================================

fn benchmark_transient_map_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("transient_map_insert");

    for size in [1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("TransientOrderedMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut transient = TransientOrderedMap::new();
                    for index in 0..size {
                        transient.insert_or_assign((black_box(index), index));
                    }
                    black_box(transient.persistent())
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("OrderedMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = OrderedMap::new();
                for index in 0..size {
                    map = map.insert_or_assign((black_box(index), index));
                }
                black_box(map)
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
    benchmark_transient_emplace_back,
    benchmark_transient_assign,
    benchmark_roundtrip,
    benchmark_transient_map_insert,
);

criterion_main!(benches);
