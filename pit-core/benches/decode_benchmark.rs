//! Benchmarks for pit.bin decoder performance.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pit_core::{decode, decode_reader};

/// Largest log the header can describe, with every field populated.
fn synthetic_log() -> Vec<u8> {
    let count = u16::MAX;
    let mut data = vec![0u8; 0x18];
    data[0x08..0x0A].copy_from_slice(&count.to_le_bytes());

    for i in 0..count as u32 {
        let flags = ((i & 0x7F) << 11) | ((i & 0x3) << 18);
        data.extend_from_slice(&(i + 1).to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&flags.to_le_bytes());
    }
    data
}

fn decode_buffer_benchmark(c: &mut Criterion) {
    let data = synthetic_log();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("buffer_65535_records", |b| {
        b.iter(|| {
            let events = decode(black_box(&data)).unwrap();
            black_box(events.len())
        })
    });

    group.bench_function("reader_65535_records", |b| {
        b.iter(|| {
            let result = decode_reader(black_box(data.as_slice())).unwrap();
            black_box(result.events.len())
        })
    });

    group.finish();
}

criterion_group!(benches, decode_buffer_benchmark);
criterion_main!(benches);
