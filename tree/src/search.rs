use rand::Rng;

use ale_engine::actuate::apply_action;
use ale_engine::simulator::Simulator;

use crate::node::{NodeId, UctTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCriteria {
    MaxChild,
    RobustChild,
}

#[derive(Debug, Clone)]
pub struct UctConfig {
    pub explore_multiplier: f64,
    pub sims_per_decision: u32,
    pub selection_criteria: SelectionCriteria,
    pub rollout_frames: u64,
    pub rave_param: Option<f64>,
    pub discount_factor: Option<f64>,
    pub frame_skip: u32,
    pub scale_rewards: bool,
}

/// Monte Carlo Tree Search over a [`Simulator`]'s state space: UCB1 (with
/// optional AMAF blending) tree policy, one-step-simulation expansion,
/// uniform-random rollout, and discount-aware backup. Re-roots onto the
/// chosen action after every decision.
pub struct UctSearch<S: Simulator> {
    config: UctConfig,
    legal_actions: Vec<usize>,
    tree: Option<UctTree<S::State>>,
}

impl<S: Simulator> UctSearch<S> {
    pub fn new(config: UctConfig) -> Self {
        Self {
            config,
            legal_actions: Vec::new(),
            tree: None,
        }
    }

    pub fn root_state(&self) -> Option<&S::State> {
        self.tree.as_ref().map(UctTree::root_state)
    }

    /// Discards any existing tree and builds a fresh root at `state`.
    pub fn initialize(&mut self, sim: &S, state: S::State, is_terminal: bool) {
        self.legal_actions = sim.legal_actions().to_vec();
        self.tree = Some(UctTree::new(state, is_terminal, self.legal_actions.len()));
    }

    /// Runs `sims_per_decision` simulations from the current root, selects
    /// the best child, re-roots onto it, and returns that child's action
    /// (a position index into `legal_actions`, not a raw action code).
    pub fn search(&mut self, sim: &mut S, rng: &mut impl Rng) -> usize {
        for _ in 0..self.config.sims_per_decision {
            let leaf = self.tree_policy(sim, rng);
            let reward = self.default_policy(sim, rng, leaf);
            let use_amaf = self.config.rave_param.is_some();
            self.tree_mut()
                .backup(leaf, reward, self.config.discount_factor, use_amaf);
        }

        let root = self.tree().root_id();
        let chosen = match self.config.selection_criteria {
            SelectionCriteria::RobustChild => self.tree().select_robust_child(root),
            SelectionCriteria::MaxChild => {
                self.tree().select_max_child(root, 0.0, self.config.rave_param)
            }
        };
        let action = self
            .tree()
            .node(chosen)
            .action
            .expect("non-root child always has an action");
        log::debug!(
            "uct search: {} sims, root visits={}, chosen action={action}",
            self.config.sims_per_decision,
            self.tree().node(root).visits
        );
        self.tree_mut().re_root(chosen);
        action
    }

    fn tree(&self) -> &UctTree<S::State> {
        self.tree
            .as_ref()
            .expect("search() called before initialize()")
    }

    fn tree_mut(&mut self) -> &mut UctTree<S::State> {
        self.tree
            .as_mut()
            .expect("search() called before initialize()")
    }

    fn tree_policy(&mut self, sim: &mut S, rng: &mut impl Rng) -> NodeId {
        let mut current = self.tree().root_id();
        loop {
            if self.tree().node(current).is_terminal {
                break;
            }
            if self.tree().node(current).is_expandable() {
                let legal_actions = &self.legal_actions;
                let frame_skip = self.config.frame_skip;
                let scale_rewards = self.config.scale_rewards;
                current = self.tree_mut().expand(current, rng, |state, a| {
                    sim.restore_state(state);
                    let _ = apply_action(sim, legal_actions[a], frame_skip, scale_rewards);
                    (sim.clone_state(), sim.game_over())
                });
                break;
            } else {
                current = self.tree().select_max_child(
                    current,
                    self.config.explore_multiplier,
                    self.config.rave_param,
                );
            }
        }
        current
    }

    fn default_policy(&self, sim: &mut S, rng: &mut impl Rng, leaf: NodeId) -> f64 {
        let leaf_state = self.tree().node(leaf).state.clone();
        sim.restore_state(&leaf_state);
        let start_frame = sim.frame_number();
        let mut reward = 0.0;
        while !sim.game_over() && sim.frame_number() - start_frame < self.config.rollout_frames {
            let legal = sim.legal_actions();
            let action = legal[rng.gen_range(0..legal.len())];
            reward += apply_action(sim, action, self.config.frame_skip, self.config.scale_rewards);
        }
        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ale_engine::test_support::ToySimulator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> UctConfig {
        UctConfig {
            explore_multiplier: 1.0,
            sims_per_decision: 3,
            selection_criteria: SelectionCriteria::MaxChild,
            rollout_frames: 0,
            rave_param: None,
            discount_factor: None,
            frame_skip: 1,
            scale_rewards: false,
        }
    }

    #[test]
    fn prefers_the_higher_reward_action_with_zero_length_rollout() {
        let mut sim = ToySimulator::new();
        let mut search = UctSearch::<ToySimulator>::new(config());
        let mut rng = StdRng::seed_from_u64(11);

        let state = sim.clone_state();
        let is_terminal = sim.game_over();
        search.initialize(&sim, state, is_terminal);

        let action = search.search(&mut sim, &mut rng);
        assert_eq!(action, 0); // action 0 yields reward 1, action 1 yields 0

        let root = search.tree().root_id();
        assert_eq!(search.tree().node(root).visits, 3);
        for &child in &search.tree().node(root).children.clone() {
            // after re-rooting, only the chosen subtree remains; this loop
            // runs at most once since children.len() == 1 post re-root.
            assert!(search.tree().node(child).visits >= 0);
        }
    }

    #[test]
    fn re_roots_onto_the_state_the_chosen_action_reaches() {
        let mut sim = ToySimulator::new();
        let mut search = UctSearch::<ToySimulator>::new(config());
        let mut rng = StdRng::seed_from_u64(12);

        let state = sim.clone_state();
        let is_terminal = sim.game_over();
        search.initialize(&sim, state.clone(), is_terminal);
        let action = search.search(&mut sim, &mut rng);

        let mut expected_sim = ToySimulator::new();
        expected_sim.restore_state(&state);
        apply_action(&mut expected_sim, action, 1, false);
        assert_eq!(search.root_state(), Some(&expected_sim.clone_state()));
    }
}
