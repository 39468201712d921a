//! Criterion benchmarks for graph construction and archive round-trips
//!
//! The archive path sits on the dataloading hot loop: a pipeline reloads
//! the container once per worker process, so load dominates.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use muestra_graph::{ArchiveReader, ArchiveWriter, CscSamplingGraph, IntTensor};

/// Generate CSC buffers for a graph with roughly `edges_per_node` incoming
/// edges per node (simple LCG for reproducibility).
fn generate_csc(num_nodes: usize, edges_per_node: usize) -> (Vec<i64>, Vec<i64>) {
    let mut rng_state = 12345_u64;
    let mut indptr = Vec::with_capacity(num_nodes + 1);
    indptr.push(0_i64);
    let mut indices = Vec::with_capacity(num_nodes * edges_per_node);

    for _ in 0..num_nodes {
        for _ in 0..edges_per_node {
            rng_state = rng_state.wrapping_mul(1103515245).wrapping_add(12345);
            indices.push((rng_state % num_nodes as u64) as i64);
        }
        indptr.push(indices.len() as i64);
    }

    (indptr, indices)
}

fn build_graph(num_nodes: usize) -> std::sync::Arc<CscSamplingGraph> {
    let (indptr, indices) = generate_csc(num_nodes, 4);
    CscSamplingGraph::from_csc(
        IntTensor::from_vec(indptr),
        IntTensor::from_vec(indices),
        None,
        None,
    )
    .unwrap()
}

/// Benchmark: validated construction from raw buffers
fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for size in [100, 1000, 10000].iter() {
        let (indptr, indices) = generate_csc(*size, 4);

        group.bench_with_input(
            BenchmarkId::new("from_csc", size),
            &(indptr, indices),
            |b, (indptr, indices)| {
                b.iter(|| {
                    let graph = CscSamplingGraph::from_csc(
                        IntTensor::from_vec(black_box(indptr.clone())),
                        IntTensor::from_vec(black_box(indices.clone())),
                        None,
                        None,
                    )
                    .unwrap();
                    black_box(graph);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: archive serialization to an in-memory sink
fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save");

    for size in [100, 1000, 10000].iter() {
        let graph = build_graph(*size);

        group.bench_with_input(BenchmarkId::new("archive", size), &graph, |b, graph| {
            b.iter(|| {
                let mut writer = ArchiveWriter::new(Vec::new());
                graph.save(black_box(&mut writer)).unwrap();
                black_box(writer.into_inner());
            });
        });
    }

    group.finish();
}

/// Benchmark: archive deserialization from in-memory bytes
fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for size in [100, 1000, 10000].iter() {
        let graph = build_graph(*size);
        let mut writer = ArchiveWriter::new(Vec::new());
        graph.save(&mut writer).unwrap();
        let bytes = writer.into_inner();

        group.bench_with_input(BenchmarkId::new("archive", size), &bytes, |b, bytes| {
            b.iter(|| {
                let loaded =
                    CscSamplingGraph::load(&mut ArchiveReader::new(black_box(bytes.as_slice())))
                        .unwrap();
                black_box(loaded);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_construction, bench_save, bench_load);
criterion_main!(benches);
