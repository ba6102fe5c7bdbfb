use ale_engine::constants::FEATURE_CAPACITY;
use ale_engine::sarsa::{Sarsa, SarsaConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_sarsa() -> Sarsa {
    Sarsa::new(SarsaConfig {
        num_actions: 18,
        num_features: FEATURE_CAPACITY,
        alpha: 0.1,
        epsilon: 0.05,
        gamma: 0.9,
        lambda: 0.0,
        normalize: true,
        policy_frozen: false,
        optimistic: false,
        export_path: None,
    })
}

fn bench_episode_step(c: &mut Criterion) {
    let features: Vec<usize> = (0..40).map(|i| i * 13 % FEATURE_CAPACITY).collect();

    c.bench_function("sarsa/episode_step", |b| {
        b.iter_batched(
            || (make_sarsa(), StdRng::seed_from_u64(99)),
            |(mut sarsa, mut rng)| {
                sarsa.episode_start(&mut rng, &features);
                let _ = sarsa.episode_step(&mut rng, black_box(1.0), &features);
                sarsa
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_episode_step);
criterion_main!(benches);
