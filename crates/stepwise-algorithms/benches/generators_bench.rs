//! Benchmarks for step generation
//!
//! Measures performance of:
//! - Sorts over reversed input
//! - AVL builds (rotation heavy)
//! - Graph traversals on the sample graph

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stepwise_algorithms::{sort, Avl, Graph, SortAlgorithm};

fn bench_sorts(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");

    for &len in &[16usize, 64, 256] {
        let values: Vec<i64> = (0..len as i64).rev().collect();
        group.throughput(Throughput::Elements(len as u64));
        for algorithm in SortAlgorithm::ALL {
            group.bench_with_input(
                BenchmarkId::new(algorithm.name(), len),
                &values,
                |b, values| b.iter(|| sort(algorithm, black_box(values))),
            );
        }
    }
    group.finish();
}

fn bench_avl_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("avl_build");

    for &len in &[32i64, 256, 1024] {
        let values: Vec<i64> = (0..len).collect();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &values, |b, values| {
            b.iter(|| Avl::build(black_box(values)))
        });
    }
    group.finish();
}

fn bench_traversals(c: &mut Criterion) {
    let graph = Graph::sample();

    c.bench_function("bfs_sample", |b| b.iter(|| graph.bfs(black_box("A"), None)));
    c.bench_function("dfs_sample", |b| b.iter(|| graph.dfs(black_box("A"), None)));
    c.bench_function("dijkstra_sample", |b| {
        b.iter(|| graph.dijkstra(black_box("A"), Some("F")))
    });
}

criterion_group!(benches, bench_sorts, bench_avl_build, bench_traversals);
criterion_main!(benches);
