//! Performance benchmarks for the bit I/O primitives
//!
//! This benchmark suite evaluates:
//! - Word-based MSB-first write throughput (Huffman code emission path)
//! - Word-based MSB-first read throughput (Huffman walker path)
//! - Reverse-stream read/write throughput (CRILAYLA path)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxirom_core::bitstream::{BitReader, BitWriter, ReverseBitReader, ReverseBitWriter};
use std::hint::black_box;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Random data - varied byte values
    pub fn random(size: usize) -> Vec<u8> {
        // Simple PRNG for reproducible random data
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            // Linear congruential generator
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }
}

/// Standard data sizes for benchmarking
mod data_sizes {
    pub const SMALL: usize = 256; // 256 B
    pub const MEDIUM: usize = 4 * 1024; // 4 KB
    pub const LARGE: usize = 64 * 1024; // 64 KB
}

/// Benchmark word-based bit writing across data sizes
fn bench_word_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("word_writer");

    let sizes = [
        ("256B", data_sizes::SMALL),
        ("4KB", data_sizes::MEDIUM),
        ("64KB", data_sizes::LARGE),
    ];

    for (size_name, size) in sizes {
        let data = test_data::random(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| {
                let mut writer = BitWriter::new();
                for &byte in data {
                    writer.write_bits(byte as u16, 8);
                }
                black_box(writer.finish());
            });
        });
    }

    group.finish();
}

/// Benchmark word-based single-bit reads across data sizes
fn bench_word_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("word_reader");

    let sizes = [
        ("256B", data_sizes::SMALL),
        ("4KB", data_sizes::MEDIUM),
        ("64KB", data_sizes::LARGE),
    ];

    for (size_name, size) in sizes {
        // Size rounded to whole words so the reader never hits EOF.
        let size = size & !3;
        let data = test_data::random(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| {
                let mut reader = BitReader::new(black_box(data));
                let mut acc = 0u32;
                for _ in 0..data.len() * 8 {
                    acc ^= reader.read_bit().unwrap() as u32;
                }
                black_box(acc);
            });
        });
    }

    group.finish();
}

/// Benchmark reverse-stream bit I/O (13-bit fields, the CRILAYLA hot path)
fn bench_reverse_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("reverse_stream");

    let size = data_sizes::MEDIUM;
    let fields = size * 8 / 13;
    let data = test_data::random(size);

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter("write"), &fields, |b, &fields| {
        b.iter(|| {
            let mut writer = ReverseBitWriter::new();
            for i in 0..fields {
                writer.write_bits((i & 0x1FFF) as u16, 13);
            }
            black_box(writer.finish());
        });
    });

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter("read"), &data, |b, data| {
        b.iter(|| {
            let mut reader = ReverseBitReader::new(black_box(data));
            let mut acc = 0u16;
            for _ in 0..fields {
                acc ^= reader.read_bits(13).unwrap();
            }
            black_box(acc);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_word_writer,
    bench_word_reader,
    bench_reverse_stream,
);
criterion_main!(benches);
