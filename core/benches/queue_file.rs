//! Benchmarks for read-ahead and write-behind throughput over memory files.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use queue_file::file::{KFile, MemFile};
use queue_file::queue_file::{make_read_ahead, make_write_behind};

const TOTAL: usize = 4 * 1024 * 1024;

fn bench_read_ahead(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_ahead");
    group.throughput(Throughput::Bytes(TOTAL as u64));
    let data = vec![0xA5u8; TOTAL];

    for block_size in [4096usize, 65_536, 1 << 20] {
        group.bench_with_input(BenchmarkId::from_parameter(block_size), &block_size, |b, &bs| {
            b.iter(|| {
                let source = MemFile::from_vec(data.clone());
                let mut f = make_read_ahead(0, source, 8 * bs, bs, 0).unwrap();
                let mut buf = vec![0u8; 32 * 1024];
                let mut pos = 0u64;
                loop {
                    let n = f.read_at(pos, &mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    pos += n as u64;
                }
                f.close().unwrap();
                black_box(pos)
            });
        });
    }
    group.finish();
}

fn bench_write_behind(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_behind");
    group.throughput(Throughput::Bytes(TOTAL as u64));
    let chunk = vec![0x5Au8; 32 * 1024];

    for block_size in [4096usize, 65_536, 1 << 20] {
        group.bench_with_input(BenchmarkId::from_parameter(block_size), &block_size, |b, &bs| {
            b.iter(|| {
                let dest = MemFile::new();
                let mut f = make_write_behind(dest.clone(), 8 * bs, bs, 0).unwrap();
                let mut pos = 0u64;
                while (pos as usize) < TOTAL {
                    pos += f.write_at(pos, &chunk).unwrap() as u64;
                }
                f.close().unwrap();
                black_box(dest.len())
            });
        });
    }
    group.finish();
}

/// Baseline: the same copy without a queue in between.
fn bench_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct");
    group.throughput(Throughput::Bytes(TOTAL as u64));
    let data = vec![0xA5u8; TOTAL];

    group.bench_function("mem_read", |b| {
        b.iter(|| {
            let mut f = MemFile::from_vec(data.clone());
            let mut buf = vec![0u8; 32 * 1024];
            let mut pos = 0u64;
            loop {
                let n = f.read_at(pos, &mut buf).unwrap();
                if n == 0 {
                    break;
                }
                pos += n as u64;
            }
            black_box(pos)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_read_ahead, bench_write_behind, bench_direct);
criterion_main!(benches);
