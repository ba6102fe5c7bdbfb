use ale_engine::constants::RAM_BYTES;
use ale_engine::features::FeatureExtractor;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn bench_extract(c: &mut Criterion) {
    let extractor = FeatureExtractor::new();
    let ram: Vec<u8> = (0..RAM_BYTES).map(|i| (i * 37 + 11) as u8).collect();

    c.bench_function("feature_extraction/extract_dense_ram", |b| {
        b.iter_batched(
            Vec::new,
            |mut out| {
                extractor.extract(black_box(&ram), &mut out);
                out
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
