//! R-Tree benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use spatial_index::{read_tree, write_tree, Entry, Envelope, QuadraticSplit, RTree, RTreeConfig};
use std::hint::black_box;

fn grid_entry(i: u64) -> Entry {
    let x = (i % 100) as f64;
    let y = (i / 100) as f64;
    Entry::new(Envelope::new_2d(x, y, x + 1.0, y + 1.0).unwrap(), i)
}

fn filled(config: RTreeConfig, size: u64) -> RTree {
    let mut tree = RTree::with_config(config).unwrap();
    for i in 0..size {
        tree.insert(grid_entry(i)).unwrap();
    }
    tree
}

fn bench_rtree_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("RTree Insert");

    for size in [100u64, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("star", size), size, |b, &size| {
            b.iter(|| black_box(filled(RTreeConfig::new(2), size).len()));
        });
        group.bench_with_input(BenchmarkId::new("quadratic", size), size, |b, &size| {
            b.iter(|| {
                let config = RTreeConfig::new(2).with_split_strategy(QuadraticSplit);
                black_box(filled(config, size).len())
            });
        });
    }

    group.finish();
}

fn bench_rtree_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("RTree Search");

    let tree = filled(RTreeConfig::new(2), 10000);

    group.bench_function("search_10k", |b| {
        b.iter(|| {
            let query = Envelope::new_2d(25.0, 25.0, 75.0, 75.0).unwrap();
            black_box(tree.search_collect(&query).unwrap())
        });
    });

    group.bench_function("nearest_10_of_10k", |b| {
        b.iter(|| black_box(tree.nearest(&[50.5, 50.5], 10, None).unwrap()));
    });

    group.finish();
}

fn bench_rtree_remove(c: &mut Criterion) {
    c.bench_function("remove_1k_of_10k", |b| {
        b.iter_with_setup(
            || filled(RTreeConfig::new(2), 10000),
            |mut tree| {
                for i in (0..10000).step_by(10) {
                    tree.remove_entry(&grid_entry(i)).unwrap();
                }
                black_box(tree.len())
            },
        );
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("Snapshot");
    let tree = filled(RTreeConfig::new(2), 10000);
    let mut bytes = Vec::new();
    write_tree(&tree, &mut bytes).unwrap();

    group.bench_function("write_10k", |b| {
        b.iter(|| {
            let mut sink = Vec::with_capacity(bytes.len());
            write_tree(&tree, &mut sink).unwrap();
            black_box(sink.len())
        });
    });

    group.bench_function("read_10k", |b| {
        b.iter(|| black_box(read_tree(bytes.as_slice()).unwrap().len()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_rtree_insert,
    bench_rtree_search,
    bench_rtree_remove,
    bench_snapshot
);
criterion_main!(benches);
