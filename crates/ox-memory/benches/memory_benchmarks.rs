//! Benchmarks for region access patterns

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ox_memory::{MemoryId, MemoryMap};

fn bench_sequential_read_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_access");

    for size in [1024usize, 8192, 65536].iter() {
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("write_u32", size), size, |b, &size| {
            let mut map = MemoryMap::new();
            map.map(MemoryId::SystemRam, size, "System RAM").unwrap();

            b.iter(|| {
                for offset in (0..size).step_by(4) {
                    map.write_u32(MemoryId::SystemRam, offset, black_box(0xDEADBEEF)).unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("read_u32", size), size, |b, &size| {
            let mut map = MemoryMap::new();
            map.map(MemoryId::SystemRam, size, "System RAM").unwrap();

            b.iter(|| {
                let mut sum = 0u64;
                for offset in (0..size).step_by(4) {
                    sum = sum.wrapping_add(map.read_u32(MemoryId::SystemRam, offset).unwrap() as u64);
                }
                black_box(sum);
            });
        });

        group.bench_with_input(BenchmarkId::new("direct_span", size), size, |b, &size| {
            let mut map = MemoryMap::new();
            map.map(MemoryId::SystemRam, size, "System RAM").unwrap();

            b.iter(|| {
                let data = map.data_mut(MemoryId::SystemRam).unwrap();
                for byte in data.iter_mut() {
                    *byte = byte.wrapping_add(1);
                }
                black_box(data[0]);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sequential_read_write);
criterion_main!(benches);
