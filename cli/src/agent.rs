use rand::Rng;

use ale_engine::actuate::apply_action;
use ale_engine::dyna::DynaMemories;
use ale_engine::error::Result;
use ale_engine::features::FeatureExtractor;
use ale_engine::sarsa::Sarsa;
use ale_engine::simulator::Simulator;
use ale_tree::search::UctSearch;

/// The tagged-variant agent family: one case per `player_agent` setting,
/// dispatching to the shared `start`/`step`/`end` operations every shell
/// decision calls. Every variant returns an index into the live game's
/// legal-action set, never a raw action code.
pub enum Agent<S: Simulator> {
    Random,
    SingleAction {
        action: usize,
        epsilon: f64,
    },
    Sarsa {
        sarsa: Sarsa,
        extractor: FeatureExtractor,
        features: Vec<usize>,
    },
    Search {
        uct: UctSearch<S>,
    },
    Dyna {
        dyna: DynaMemories,
        uct: UctSearch<S>,
        extractor: FeatureExtractor,
        features: Vec<usize>,
        max_frames_search: u64,
        max_search_iterations: u32,
        frame_skip: u32,
        scale_rewards: bool,
    },
}

impl<S: Simulator> Agent<S> {
    pub fn start(&mut self, sim: &mut S, legal_count: usize, rng: &mut impl Rng) -> usize {
        match self {
            Agent::Random => rng.gen_range(0..legal_count),
            Agent::SingleAction { action, epsilon } => {
                single_action_choice(rng, *epsilon, *action, legal_count)
            }
            Agent::Sarsa {
                sarsa,
                extractor,
                features,
            } => {
                extractor.extract(sim.ram(), features);
                sarsa.episode_start(rng, features)
            }
            Agent::Search { uct } => search_decision(uct, sim, rng),
            Agent::Dyna {
                dyna,
                uct,
                extractor,
                features,
                max_frames_search,
                max_search_iterations,
                frame_skip,
                scale_rewards,
            } => {
                dyna.clear_transient();
                run_dyna_search(
                    uct,
                    dyna,
                    extractor,
                    features,
                    sim,
                    rng,
                    *max_search_iterations,
                    *max_frames_search,
                    *frame_skip,
                    *scale_rewards,
                );
                extractor.extract(sim.ram(), features);
                dyna.episode_start(rng, features)
            }
        }
    }

    pub fn step(
        &mut self,
        sim: &mut S,
        legal_count: usize,
        rng: &mut impl Rng,
        reward: f64,
    ) -> Result<usize> {
        match self {
            Agent::Random => Ok(rng.gen_range(0..legal_count)),
            Agent::SingleAction { action, epsilon } => {
                Ok(single_action_choice(rng, *epsilon, *action, legal_count))
            }
            Agent::Sarsa {
                sarsa,
                extractor,
                features,
            } => {
                extractor.extract(sim.ram(), features);
                sarsa.episode_step(rng, reward, features)
            }
            Agent::Search { uct } => Ok(search_decision(uct, sim, rng)),
            Agent::Dyna {
                dyna,
                uct,
                extractor,
                features,
                max_frames_search,
                max_search_iterations,
                frame_skip,
                scale_rewards,
            } => {
                dyna.clear_transient();
                run_dyna_search(
                    uct,
                    dyna,
                    extractor,
                    features,
                    sim,
                    rng,
                    *max_search_iterations,
                    *max_frames_search,
                    *frame_skip,
                    *scale_rewards,
                );
                extractor.extract(sim.ram(), features);
                dyna.episode_step(rng, reward, features)
            }
        }
    }

    pub fn end(&mut self, reward: f64, frames_remaining: i64) -> Result<()> {
        match self {
            Agent::Random | Agent::SingleAction { .. } | Agent::Search { .. } => Ok(()),
            Agent::Sarsa { sarsa, .. } => sarsa.episode_end(reward, frames_remaining),
            Agent::Dyna { dyna, .. } => dyna.episode_end(reward, frames_remaining),
        }
    }
}

fn single_action_choice(
    rng: &mut impl Rng,
    epsilon: f64,
    action: usize,
    legal_count: usize,
) -> usize {
    // With probability epsilon pick a random legal action, otherwise the
    // configured one — matches SingleActionAgent::getNextAction.
    if epsilon > 0.0 && rng.gen::<f64>() <= epsilon {
        rng.gen_range(0..legal_count)
    } else {
        action
    }
}

/// Shared by `Agent::Search`'s `start` and `step`: clone the live state,
/// (re)initialize the tree if its root has gone stale, run one search,
/// restore the pre-search state, and return the chosen action index.
fn search_decision<S: Simulator>(
    uct: &mut UctSearch<S>,
    sim: &mut S,
    rng: &mut impl Rng,
) -> usize {
    let state = sim.clone_state();
    let is_terminal = sim.game_over();
    if uct.root_state() != Some(&state) {
        uct.initialize(&*sim, state.clone(), is_terminal);
    }
    let action = uct.search(sim, rng);
    sim.restore_state(&state);
    action
}

/// Runs `max_search_iterations` independent search-and-rollout passes
/// (`DynaAgent::search` in the source): each reinitializes the tree at the
/// pre-decision state, searches once to pick a first action, then steps
/// the *real* simulator forward under repeated UCT searches (re-rooting
/// keeps the tree in sync with the live state without reinitializing)
/// while training the transient memory on each simulated transition, and
/// finally rewinds the simulator back to the pre-decision state.
#[allow(clippy::too_many_arguments)]
fn run_dyna_search<S: Simulator>(
    uct: &mut UctSearch<S>,
    dyna: &mut DynaMemories,
    extractor: &FeatureExtractor,
    features: &mut Vec<usize>,
    sim: &mut S,
    rng: &mut impl Rng,
    max_search_iterations: u32,
    max_frames_search: u64,
    frame_skip: u32,
    scale_rewards: bool,
) {
    let init_state = sim.clone_state();
    let is_terminal = sim.game_over();

    for _ in 0..max_search_iterations {
        let start_frame = sim.frame_number();

        uct.initialize(&*sim, init_state.clone(), is_terminal);
        let mut action = uct.search(sim, rng);
        sim.restore_state(&init_state);

        extractor.extract(sim.ram(), features);
        dyna.start_transient(action, features);

        while !sim.game_over() && sim.frame_number() - start_frame < max_frames_search {
            let legal_action = sim.legal_actions()[action];
            let reward = apply_action(sim, legal_action, frame_skip, scale_rewards);

            if sim.game_over() {
                break;
            }

            let prev_state = sim.clone_state();
            action = uct.search(sim, rng);
            sim.restore_state(&prev_state);

            extractor.extract(sim.ram(), features);
            dyna.update_transient(action, features, reward);
        }

        sim.restore_state(&init_state);
    }
}
