use ale_engine::constants::FEATURE_CAPACITY;
use ale_engine::lfa::LinearApproximator;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn bench_compute_values(c: &mut Criterion) {
    let lfa = LinearApproximator::new(18, FEATURE_CAPACITY, 0.1, true);
    let features: Vec<usize> = (0..40).map(|i| i * 13 % FEATURE_CAPACITY).collect();

    c.bench_function("lfa/compute_values", |b| {
        b.iter_batched(
            Vec::new,
            |mut out| {
                lfa.compute_values(black_box(&features), &mut out);
                out
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_update(c: &mut Criterion) {
    let features: Vec<usize> = (0..40).map(|i| i * 13 % FEATURE_CAPACITY).collect();

    c.bench_function("lfa/update", |b| {
        b.iter_batched(
            || LinearApproximator::new(18, FEATURE_CAPACITY, 0.1, true),
            |mut lfa| {
                lfa.update(black_box(0.37), 3, &features);
                lfa
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_compute_values, bench_update);
criterion_main!(benches);
