use ale_engine::actuate::apply_action;
use ale_engine::error::{AgentError, Result};
use ale_engine::simulator::Simulator;
use rand::Rng;

/// How the next game is picked out of `games` when more than one is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSelectionMethod {
    Random,
    Ascending,
    Descending,
}

impl GameSelectionMethod {
    pub fn parse(value: &str) -> Self {
        match value {
            "ascending_order" => Self::Ascending,
            "descending_order" => Self::Descending,
            // the source defaults unrecognized selection methods to random
            _ => Self::Random,
        }
    }
}

/// When a decision is considered finished in multi-game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentEndMethod {
    SomeGame,
    AllGames,
}

impl AgentEndMethod {
    pub fn parse(value: &str) -> Self {
        match value {
            "all_games" => Self::AllGames,
            _ => Self::SomeGame,
        }
    }
}

/// Fields shared by every agent variant: the frame budget, frame skip,
/// reward scaling, the loaded game slots and their selection policy,
/// and episode/frame bookkeeping. Mirrors `PlayerAgent`'s base-class
/// fields, minus PNG frame export.
pub struct Shell<S: Simulator> {
    games: Vec<S>,
    selection_method: GameSelectionMethod,
    end_method: AgentEndMethod,
    frame_skip: u32,
    scale_rewards: bool,
    max_frames_per_episode: i64,
    current_index: usize,
    first_selection_done: bool,
    current_episode_frame: u64,
    current_episode: u64,
    export_frame_images: bool,
}

pub struct ShellConfig {
    pub frame_skip: u32,
    pub scale_rewards: bool,
    pub max_frames_per_episode: i64,
    pub selection_method: GameSelectionMethod,
    pub end_method: AgentEndMethod,
    pub export_frame_images: bool,
}

impl<S: Simulator> Shell<S> {
    pub fn new(games: Vec<S>, config: ShellConfig) -> Result<Self> {
        if games.is_empty() {
            return Err(AgentError::MissingStrictSetting {
                key: "num_games".to_string(),
            });
        }
        Ok(Self {
            games,
            selection_method: config.selection_method,
            end_method: config.end_method,
            frame_skip: config.frame_skip,
            scale_rewards: config.scale_rewards,
            max_frames_per_episode: config.max_frames_per_episode,
            current_index: 0,
            first_selection_done: false,
            current_episode_frame: 0,
            current_episode: 0,
            export_frame_images: config.export_frame_images,
        })
    }

    pub fn num_games(&self) -> usize {
        self.games.len()
    }

    pub fn frame_skip(&self) -> u32 {
        self.frame_skip
    }

    pub fn scale_rewards(&self) -> bool {
        self.scale_rewards
    }

    pub fn current_episode(&self) -> u64 {
        self.current_episode
    }

    pub fn current_episode_frame(&self) -> u64 {
        self.current_episode_frame
    }

    /// `max_num_frames_per_episode - current_episode_frame`, unclamped —
    /// used as the optimistic-initialization end transform's
    /// remaining-frames term. Matches the original's own unclamped
    /// subtraction: under an unbounded budget (`max_num_frames_per_episode`
    /// left at its typed default of `-1`) this goes increasingly negative
    /// as the episode runs, rather than collapsing to zero.
    pub fn frames_remaining(&self) -> i64 {
        self.max_frames_per_episode - self.current_episode_frame as i64
    }

    pub fn sim(&self) -> &S {
        &self.games[self.current_index]
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.games[self.current_index]
    }

    /// Picks which loaded game is live for the coming episode. A no-op for
    /// the common single-game case.
    pub fn select_game(&mut self, rng: &mut impl Rng) {
        if self.games.len() == 1 {
            self.current_index = 0;
            return;
        }
        self.current_index = match self.selection_method {
            GameSelectionMethod::Random => self.random_index(rng),
            GameSelectionMethod::Ascending => self.next_ascending(),
            GameSelectionMethod::Descending => self.next_descending(),
        };
        log::info!("selected game slot {}", self.current_index);
    }

    fn random_index(&self, rng: &mut impl Rng) -> usize {
        if self.end_method == AgentEndMethod::AllGames {
            let not_ended: Vec<usize> = (0..self.games.len())
                .filter(|&i| !self.games[i].game_over())
                .collect();
            if not_ended.is_empty() {
                return self.current_index;
            }
            return not_ended[rng.gen_range(0..not_ended.len())];
        }
        rng.gen_range(0..self.games.len())
    }

    fn next_ascending(&mut self) -> usize {
        if !self.first_selection_done {
            self.first_selection_done = true;
            return 0;
        }
        let mut idx = (self.current_index + 1) % self.games.len();
        while self.games[idx].game_over() && idx != self.current_index {
            idx = (idx + 1) % self.games.len();
        }
        idx
    }

    fn next_descending(&mut self) -> usize {
        if !self.first_selection_done {
            self.first_selection_done = true;
            return self.games.len() - 1;
        }
        let mut idx = (self.current_index + self.games.len() - 1) % self.games.len();
        while self.games[idx].game_over() && idx != self.current_index {
            idx = (idx + self.games.len() - 1) % self.games.len();
        }
        idx
    }

    /// Applies `action` (an index into the current game's legal actions)
    /// for `frame_skip` frames on the live game, returning the reward.
    pub fn act(&mut self, action_index: usize) -> f64 {
        let action = self.sim().legal_actions()[action_index];
        apply_action(self.sim_mut(), action, self.frame_skip, self.scale_rewards)
    }

    pub fn start_episode(&mut self) {
        self.current_episode_frame = 0;
    }

    pub fn advance_frame(&mut self) {
        self.current_episode_frame += self.frame_skip as u64;
    }

    pub fn end_episode(&mut self) {
        self.current_episode += 1;
    }

    pub fn reset(&mut self) {
        for g in &mut self.games {
            g.reset_game();
        }
    }

    pub fn has_ended(&self) -> bool {
        if self.max_frames_per_episode > 0
            && self.current_episode_frame >= self.max_frames_per_episode as u64
        {
            return true;
        }
        match self.end_method {
            AgentEndMethod::SomeGame => self.games.iter().any(Simulator::game_over),
            AgentEndMethod::AllGames => self.games.iter().all(Simulator::game_over),
        }
    }

    pub fn export_frame_images(&self) -> bool {
        self.export_frame_images
    }
}
