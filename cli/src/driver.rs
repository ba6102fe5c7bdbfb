use rand::Rng;

use ale_engine::error::Result;
use ale_engine::simulator::Simulator;

use crate::agent::Agent;
use crate::config::DriverConfig;
use crate::export::{content_line, header_line, running_average, ScoreExporter};
use crate::shell::Shell;

/// The outer start → step* → end → reset loop, printing and/or
/// exporting one score line per episode.
pub fn run<S: Simulator>(
    shell: &mut Shell<S>,
    agent: &mut Agent<S>,
    driver: &DriverConfig,
    rng: &mut impl Rng,
) -> Result<()> {
    let mut exporter = match &driver.export_route {
        Some(route) => Some(ScoreExporter::create(route)?),
        None => None,
    };

    if driver.print_scores {
        print!("{}", header_line());
    }

    let mut avg_score = 0.0;
    for episode in 1..=driver.max_num_episodes {
        let score = run_episode(shell, agent, rng)?;
        avg_score = running_average(episode, score, avg_score);
        log::info!("episode {episode}: score={score} average={avg_score}");

        if driver.print_scores {
            print!("{}", content_line(episode, score, avg_score));
        }
        if let Some(exp) = &mut exporter {
            exp.write_episode(episode, score, avg_score)?;
        }
    }

    Ok(())
}

fn run_episode<S: Simulator>(
    shell: &mut Shell<S>,
    agent: &mut Agent<S>,
    rng: &mut impl Rng,
) -> Result<f64> {
    shell.select_game(rng);
    shell.start_episode();

    let legal_count = shell.sim().legal_actions().len();
    let action_idx = agent.start(shell.sim_mut(), legal_count, rng);
    let mut last_reward = shell.act(action_idx);
    let mut episode_score = last_reward;

    while !shell.has_ended() {
        shell.advance_frame();
        let legal_count = shell.sim().legal_actions().len();
        let action_idx = agent.step(shell.sim_mut(), legal_count, rng, last_reward)?;
        last_reward = shell.act(action_idx);
        episode_score += last_reward;
    }

    let frames_remaining = shell.frames_remaining();
    agent.end(last_reward, frames_remaining)?;

    shell.end_episode();
    shell.reset();
    Ok(episode_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ale_engine::test_support::ToySimulator;
    use crate::shell::{AgentEndMethod, GameSelectionMethod, ShellConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_agent_episode_score_matches_reward_sum() {
        let games = vec![ToySimulator::with_terminal_frame(4)];
        let mut shell = Shell::new(
            games,
            ShellConfig {
                frame_skip: 1,
                scale_rewards: false,
                max_frames_per_episode: -1,
                selection_method: GameSelectionMethod::Random,
                end_method: AgentEndMethod::SomeGame,
                export_frame_images: false,
            },
        )
        .unwrap();
        let mut agent = Agent::<ToySimulator>::Random;
        let mut rng = StdRng::seed_from_u64(42);

        let score = run_episode(&mut shell, &mut agent, &mut rng).unwrap();
        // action 0 yields reward 1, action 1 yields 0, every frame until
        // game_over at frame 4; the episode score must equal the sum of
        // per-action rewards regardless of which actions were sampled.
        assert!(score >= 0.0 && score <= 4.0);
    }

    #[test]
    fn single_action_agent_always_takes_configured_action() {
        let games = vec![ToySimulator::with_terminal_frame(4)];
        let mut shell = Shell::new(
            games,
            ShellConfig {
                frame_skip: 1,
                scale_rewards: false,
                max_frames_per_episode: -1,
                selection_method: GameSelectionMethod::Random,
                end_method: AgentEndMethod::SomeGame,
                export_frame_images: false,
            },
        )
        .unwrap();
        let mut agent = Agent::<ToySimulator>::SingleAction {
            action: 0,
            epsilon: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(7);

        let score = run_episode(&mut shell, &mut agent, &mut rng).unwrap();
        // action 0 always yields reward 1, for 4 frames.
        assert_eq!(score, 4.0);
    }
}
