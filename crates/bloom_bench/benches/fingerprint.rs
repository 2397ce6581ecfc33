use bloom_core::{fnv1a_32, fnv1a_64, insert_bloom32, insert_bloom64};
use bloom_index::{Fingerprinter, IndexConfig};
use criterion::{criterion_group, criterion_main, black_box, Criterion, Throughput};
use rand::RngCore;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::rng().fill_bytes(&mut buf);
    buf
}

fn bench_hash(c: &mut Criterion) {
    let sample = random_bytes(1 << 14);
    let mut g = c.benchmark_group("hash");
    g.throughput(Throughput::Bytes(sample.len() as u64));
    g.bench_function("fnv1a_32", |b| b.iter(|| black_box(fnv1a_32(&sample))));
    g.bench_function("fnv1a_64", |b| b.iter(|| black_box(fnv1a_64(&sample))));
    g.finish();
}

fn bench_insert(c: &mut Criterion) {
    let data = random_bytes(1 << 12);
    let mut array = vec![0u8; 1 << 16];
    let mut g = c.benchmark_group("insert_bloom");
    g.throughput(Throughput::Bytes(data.len() as u64));
    g.bench_function("fnv1a_32_w4", |b| b.iter(|| insert_bloom32(&mut array, black_box(&data), 4)));
    g.bench_function("fnv1a_64_w4", |b| b.iter(|| insert_bloom64(&mut array, black_box(&data), 4)));
    g.finish();
}

fn bench_file_array(c: &mut Criterion) {
    let text: Vec<u8> = (0..2000)
        .flat_map(|i| format!("2024-01-01T00:00:{:02} worker-{i} handled request id={}\n", i % 60, i * 7).into_bytes())
        .collect();
    let fp = Fingerprinter::new(IndexConfig::default()).unwrap();
    let mut g = c.benchmark_group("file_array");
    g.throughput(Throughput::Bytes(text.len() as u64));
    g.bench_function("default_config", |b| b.iter(|| black_box(fp.file_array(&text[..]).unwrap())));
    g.finish();
}

criterion_group!(benches, bench_hash, bench_insert, bench_file_array);
criterion_main!(benches);
