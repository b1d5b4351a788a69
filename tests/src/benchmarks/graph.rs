//! # CN-03 Graph Benchmarks
//!
//! - Chunking and adding files of increasing size
//! - Resolving paths through a deep directory chain

use std::sync::Arc;

use cn_03_graph::{AddEntry, FileLayout, GraphResolver};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};

use super::{bench_runtime, open_store, random_payload};

pub fn add_files(c: &mut Criterion) {
    let rt = bench_runtime();
    let mut group = c.benchmark_group("cn-03/add");
    group.sample_size(20);

    for size in [64 * 1024, 1024 * 1024, 4 * 1024 * 1024] {
        let layout = FileLayout::new(open_store(&rt, None));
        let data = random_payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| rt.block_on(layout.add_bytes(black_box(data))))
        });
    }

    group.finish();
}

pub fn resolve_paths(c: &mut Criterion) {
    let rt = bench_runtime();
    let mut group = c.benchmark_group("cn-03/resolve");

    for depth in [1usize, 8, 32] {
        let blocks = open_store(&rt, None);
        let layout = FileLayout::new(Arc::clone(&blocks));
        let resolver = GraphResolver::new(blocks);

        let segments: Vec<String> = (0..depth).map(|i| format!("d{i}")).collect();
        let file = format!("{}/leaf.txt", segments.join("/"));
        let added = rt
            .block_on(layout.add(vec![AddEntry::file(file, b"leaf".to_vec())]))
            .expect("add directory chain");
        let root = added.last().expect("root entry");
        let rest = segments[1..]
            .iter()
            .map(String::as_str)
            .chain(["leaf.txt"])
            .collect::<Vec<_>>()
            .join("/");
        let path = format!("/ipfs/{}/{}", root.cid, rest);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &path, |b, path| {
            b.iter(|| rt.block_on(resolver.resolve(black_box(path))))
        });
    }

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    add_files(c);
    resolve_paths(c);
}
