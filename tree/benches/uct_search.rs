use ale_engine::simulator::Simulator;
use ale_engine::test_support::ToySimulator;
use ale_tree::search::{SelectionCriteria, UctConfig, UctSearch};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn config() -> UctConfig {
    UctConfig {
        explore_multiplier: 1.41,
        sims_per_decision: 50,
        selection_criteria: SelectionCriteria::RobustChild,
        rollout_frames: 10,
        rave_param: None,
        discount_factor: None,
        frame_skip: 1,
        scale_rewards: false,
    }
}

fn bench_search(c: &mut Criterion) {
    c.bench_function("uct_search/search", |b| {
        b.iter_batched(
            || {
                let sim = ToySimulator::with_terminal_frame(1_000);
                let mut search = UctSearch::<ToySimulator>::new(config());
                let state = sim.clone_state();
                search.initialize(&sim, state, false);
                (sim, search, StdRng::seed_from_u64(7))
            },
            |(mut sim, mut search, mut rng)| {
                black_box(search.search(&mut sim, &mut rng));
                (sim, search)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
