//! # Cairn Subsystem Benchmarks
//!
//! | Subsystem | Measures |
//! |-----------|----------|
//! | cn-02 Block Store | content id hashing, put, cached and datastore get |
//! | cn-03 Graph | file add with chunking, path resolution by depth |

use criterion::{criterion_group, criterion_main, Criterion};

use cn_tests::benchmarks::{block_store, graph};

fn bench_block_store(c: &mut Criterion) {
    block_store::register_benchmarks(c);
}

fn bench_graph(c: &mut Criterion) {
    graph::register_benchmarks(c);
}

criterion_group!(benches, bench_block_store, bench_graph);
criterion_main!(benches);
