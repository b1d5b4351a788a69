//! # CN-02 Block Store Benchmarks
//!
//! - Content id hashing across payload sizes
//! - `put` of fresh blocks into an in-memory repository
//! - `get` served from the cache and from the datastore

use std::time::Duration;

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use shared_types::{Block, Codec, ContentId};

use super::{bench_runtime, open_store, random_payload};

const SIZES: [usize; 4] = [256, 4 * 1024, 64 * 1024, 256 * 1024];

pub fn content_id_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("cn-02/content_id");

    for size in SIZES {
        let data = random_payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(ContentId::for_data(Codec::Raw, data)))
        });
    }

    group.finish();
}

pub fn put_blocks(c: &mut Criterion) {
    let rt = bench_runtime();
    let mut group = c.benchmark_group("cn-02/put");
    group.measurement_time(Duration::from_secs(5));

    for size in SIZES {
        let store = open_store(&rt, None);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter_batched(
                || Block::new(random_payload(size)),
                |block| rt.block_on(store.put(block)),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

pub fn get_blocks(c: &mut Criterion) {
    let rt = bench_runtime();
    let mut group = c.benchmark_group("cn-02/get");

    let store = open_store(&rt, Some(64));
    let cids: Vec<ContentId> = rt.block_on(async {
        let mut cids = Vec::new();
        for _ in 0..1_000 {
            let cid = store
                .put(Block::new(random_payload(1024)))
                .await
                .expect("put into open store");
            cids.push(cid);
        }
        cids
    });

    let hot = cids[0];
    group.bench_function("cached", |b| {
        b.iter(|| rt.block_on(store.get_local(black_box(&hot))))
    });

    let mut next = 0usize;
    group.bench_function("datastore", |b| {
        b.iter(|| {
            store.clear_cache();
            next = (next + 1) % cids.len();
            rt.block_on(store.get_local(black_box(&cids[next])))
        })
    });

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    content_id_hashing(c);
    put_blocks(c);
    get_blocks(c);
}
