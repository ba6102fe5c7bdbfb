use std::path::PathBuf;

use ale_engine::constants::FEATURE_CAPACITY;
use ale_engine::dyna::{DynaConfig, DynaMemories};
use ale_engine::error::{AgentError, Result};
use ale_engine::features::FeatureExtractor;
use ale_engine::sarsa::{Sarsa, SarsaConfig};
use ale_engine::settings::Settings;
use ale_engine::simulator::Simulator;
use ale_tree::search::{SelectionCriteria, UctConfig, UctSearch};

use crate::agent::Agent;
use crate::shell::{AgentEndMethod, GameSelectionMethod, Shell, ShellConfig};

/// Everything read out of the settings file to drive the episode loop
/// itself, outside the agent's own knobs.
pub struct DriverConfig {
    pub max_num_episodes: u64,
    pub print_scores: bool,
    pub export_scores: bool,
    pub export_route: Option<String>,
}

pub fn shell_config(settings: &Settings) -> Result<ShellConfig> {
    Ok(ShellConfig {
        frame_skip: settings.get_int("frame_skip", false)?.max(1) as u32,
        scale_rewards: settings.get_bool("use_scaled_rewards", false)?,
        max_frames_per_episode: settings.get_int("max_num_frames_per_episode", false)?,
        selection_method: GameSelectionMethod::parse(
            &settings.get_string("game_selection_method", false)?,
        ),
        end_method: AgentEndMethod::parse(&settings.get_string("agent_end_method", false)?),
        export_frame_images: settings.get_bool("export_frame_images", false)?,
    })
}

pub fn rom_files(settings: &Settings) -> Result<Vec<String>> {
    let num_games = settings.get_int("num_games", true)?;
    if num_games < 1 {
        return Err(AgentError::MissingStrictSetting {
            key: "num_games".to_string(),
        });
    }
    (0..num_games)
        .map(|i| settings.get_string(&format!("rom_file_{i}"), true))
        .collect()
}

pub fn driver_config(settings: &Settings) -> Result<DriverConfig> {
    let export_scores = settings.get_bool("export_scores", false)?;
    let export_route = if export_scores {
        Some(settings.get_string("export_route", true)?)
    } else {
        None
    };
    Ok(DriverConfig {
        max_num_episodes: settings.get_int("max_num_episodes", true)?.max(0) as u64,
        print_scores: settings.get_bool("print_scores", false)?,
        export_scores,
        export_route,
    })
}

fn lfa_export_path(settings: &Settings, name: &str) -> Result<Option<PathBuf>> {
    if settings.get_bool("lfa_export_function", false)? {
        let route = settings.get_string("lfa_export_route", true)?;
        Ok(Some(PathBuf::from(route).join(name)))
    } else {
        Ok(None)
    }
}

fn maybe_import(settings: &Settings) -> Result<Option<PathBuf>> {
    if settings.get_bool("lfa_import_function", false)? {
        Ok(Some(PathBuf::from(settings.get_string(
            "lfa_import_route",
            true,
        )?)))
    } else {
        Ok(None)
    }
}

fn uct_config(settings: &Settings, frame_skip: u32, scale_rewards: bool) -> Result<UctConfig> {
    let selection_criteria = match settings
        .get_string("uct_best_child_selection_criteria", false)?
        .as_str()
    {
        "robust_child" => SelectionCriteria::RobustChild,
        _ => SelectionCriteria::MaxChild,
    };
    let use_amaf = settings.get_bool("uct_use_amaf_selection", false)?;
    let rave_param = if use_amaf {
        Some(settings.get_float("uct_rave_param", true)?)
    } else {
        None
    };
    let use_discount = settings.get_bool("uct_use_discount_factor", false)?;
    let discount_factor = if use_discount {
        Some(settings.get_float("uct_discount_factor", true)?)
    } else {
        None
    };
    Ok(UctConfig {
        explore_multiplier: settings.get_float("uct_explore_multiplier", true)?,
        sims_per_decision: settings.get_int("uct_simulations_per_node", true)?.max(0) as u32,
        selection_criteria,
        rollout_frames: settings.get_int("uct_num_simulated_frames", true)?.max(0) as u64,
        rave_param,
        discount_factor,
        frame_skip,
        scale_rewards,
    })
}

/// Builds the configured `Agent` variant per `player_agent`. `num_actions`
/// comes from the live simulator's legal action set; all loaded game
/// slots are assumed to share one.
pub fn build_agent<S: Simulator>(
    settings: &Settings,
    num_actions: usize,
    frame_skip: u32,
    scale_rewards: bool,
) -> Result<Agent<S>> {
    let player_agent = settings.get_string("player_agent", true)?;
    let normalize = settings.get_bool("lfa_normalize", true)?;
    let optimistic = settings.get_bool("lfa_optimistic_initialization", false)?;
    let policy_frozen = settings.get_bool("lfa_policy_frozen", false)?;
    log::info!("building agent: player_agent={player_agent}, num_actions={num_actions}");

    match player_agent.as_str() {
        "random_agent" => Ok(Agent::Random),
        "single_action_agent" => Ok(Agent::SingleAction {
            action: settings.get_int("agent_action", true)?.max(0) as usize,
            epsilon: settings.get_float("agent_epsilon", true)?,
        }),
        // group-masking is an explicit non-goal; this behaves exactly like
        // ram_agent, which is the trivial remainder of its contract.
        "ram_agent" | "ram_incremental_agent" => {
            let mut sarsa = Sarsa::new(SarsaConfig {
                num_actions,
                num_features: FEATURE_CAPACITY,
                alpha: settings.get_float("sarsa_alpha", true)?,
                epsilon: settings.get_float("sarsa_epsilon", true)?,
                gamma: settings.get_float("sarsa_gamma", true)?,
                lambda: settings.get_float("sarsa_lambda", false)?,
                normalize,
                policy_frozen,
                optimistic,
                export_path: lfa_export_path(settings, "sarsa")?,
            });
            if let Some(path) = maybe_import(settings)? {
                sarsa.load_weights(path)?;
            }
            Ok(Agent::Sarsa {
                sarsa,
                extractor: FeatureExtractor::new(),
                features: Vec::new(),
            })
        }
        "search_agent" => {
            let uct = UctSearch::new(uct_config(settings, frame_skip, scale_rewards)?);
            Ok(Agent::Search { uct })
        }
        "dyna_agent" => {
            let uct = UctSearch::new(uct_config(settings, frame_skip, scale_rewards)?);
            let mut dyna = DynaMemories::new(DynaConfig {
                num_actions,
                num_features: FEATURE_CAPACITY,
                p_alpha: settings.get_float("dyna_p_alpha", true)?,
                t_alpha: settings.get_float("dyna_t_alpha", true)?,
                p_epsilon: settings.get_float("dyna_p_epsilon", true)?,
                t_epsilon: settings.get_float("dyna_t_epsilon", true)?,
                p_lambda: settings.get_float("dyna_p_lambda", false)?,
                t_lambda: settings.get_float("dyna_t_lambda", false)?,
                normalize,
                optimistic,
                export_path: lfa_export_path(settings, "dyna_permanent")?,
            });
            if let Some(path) = maybe_import(settings)? {
                dyna.load_permanent_weights(path)?;
            }
            Ok(Agent::Dyna {
                dyna,
                uct,
                extractor: FeatureExtractor::new(),
                features: Vec::new(),
                max_frames_search: settings.get_int("dyna_max_frames_search", true)?.max(0) as u64,
                max_search_iterations: settings
                    .get_int("dyna_max_search_iterations", true)?
                    .max(0) as u32,
                frame_skip,
                scale_rewards,
            })
        }
        other => Err(AgentError::UnknownVariant {
            kind: "player_agent",
            value: other.to_string(),
        }),
    }
}

pub fn build_shell<S: Simulator>(games: Vec<S>, settings: &Settings) -> Result<Shell<S>> {
    Shell::new(games, shell_config(settings)?)
}
