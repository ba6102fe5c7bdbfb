use std::path::PathBuf;

use rand::Rng;

use crate::error::{AgentError, Result};
use crate::lfa::{argmax, epsilon_greedy, LinearApproximator, OptimisticTracker};

/// Dyna-2's two-memory architecture: a permanent LFA trained across real
/// episodes and a transient LFA reset every real decision and trained
/// during that decision's search rollouts. Action selection composes
/// `Q_combined = Q_perm + Q_trans`.
pub struct DynaMemories {
    permanent: LinearApproximator,
    transient: LinearApproximator,
    p_epsilon: f64,
    /// Configured but not consulted: transient-side action choices during
    /// search are driven by UCT's tree policy, not epsilon-greedy.
    #[allow(dead_code)]
    t_epsilon: f64,
    #[allow(dead_code)]
    p_lambda: f64,
    #[allow(dead_code)]
    t_lambda: f64,
    optimistic: Option<OptimisticTracker>,
    export_path: Option<PathBuf>,
    episode_index: u64,

    last_action: usize,
    last_features: Vec<usize>,
    // `q_perm` is only ever written by `episode_start`/`episode_step`, so it
    // stays pinned to the value computed at the last real decision for the
    // whole of the following search phase — `start_transient`/
    // `update_transient` read it but never recompute it.
    q_perm: Vec<f64>,

    // The transient-only component left in place by the preceding search
    // sub-step, combined with the pinned `q_perm` above to form the value
    // the Dyna-2 transient update actually targets.
    trans_component: Vec<f64>,
    last_trans_action: usize,
    last_trans_features: Vec<usize>,
}

pub struct DynaConfig {
    pub num_actions: usize,
    pub num_features: usize,
    pub p_alpha: f64,
    pub t_alpha: f64,
    pub p_epsilon: f64,
    pub t_epsilon: f64,
    pub p_lambda: f64,
    pub t_lambda: f64,
    pub normalize: bool,
    pub optimistic: bool,
    pub export_path: Option<PathBuf>,
}

impl DynaMemories {
    pub fn new(config: DynaConfig) -> Self {
        let num_actions = config.num_actions;
        Self {
            permanent: LinearApproximator::new(
                num_actions,
                config.num_features,
                config.p_alpha,
                config.normalize,
            ),
            transient: LinearApproximator::new(
                num_actions,
                config.num_features,
                config.t_alpha,
                config.normalize,
            ),
            p_epsilon: config.p_epsilon,
            t_epsilon: config.t_epsilon,
            p_lambda: config.p_lambda,
            t_lambda: config.t_lambda,
            optimistic: config.optimistic.then(OptimisticTracker::new),
            export_path: config.export_path,
            episode_index: 0,
            last_action: 0,
            last_features: Vec::new(),
            q_perm: vec![0.0; num_actions],
            trans_component: vec![0.0; num_actions],
            last_trans_action: 0,
            last_trans_features: Vec::new(),
        }
    }

    pub fn load_permanent_weights(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.permanent.load(path)
    }

    fn combined(&self, perm: &[f64]) -> Vec<f64> {
        perm.iter()
            .zip(self.trans_component.iter())
            .map(|(p, t)| p + t)
            .collect()
    }

    pub fn episode_start(&mut self, rng: &mut impl Rng, features: &[usize]) -> usize {
        if let Some(o) = &mut self.optimistic {
            o.reset();
        }
        self.permanent.compute_values(features, &mut self.q_perm);
        let combined = self.combined(&self.q_perm);
        let action = epsilon_greedy(rng, self.p_epsilon, &combined);
        self.last_action = action;
        self.last_features = features.to_vec();
        action
    }

    pub fn episode_step(
        &mut self,
        rng: &mut impl Rng,
        reward: f64,
        features: &[usize],
    ) -> Result<usize> {
        const GAMMA: f64 = 1.0; // Dyna fixes gamma=1, unlike Sarsa's configured gamma.
        let transformed = match &mut self.optimistic {
            Some(o) => o.transform(GAMMA, reward),
            None => reward,
        };
        let mut delta = transformed - self.q_perm[self.last_action];

        let mut q_perm_next = Vec::new();
        self.permanent.compute_values(features, &mut q_perm_next);
        let next_action = epsilon_greedy(rng, self.p_epsilon, &q_perm_next);
        delta += q_perm_next[next_action];

        if !delta.is_finite() {
            return Err(AgentError::NumericFailure {
                detail: "dyna permanent TD error is non-finite".to_string(),
            });
        }

        self.permanent
            .update(delta, self.last_action, &self.last_features);
        self.last_features = features.to_vec();
        self.last_action = next_action;
        self.q_perm = q_perm_next;
        Ok(next_action)
    }

    pub fn episode_end(&mut self, reward: f64, frames_remaining: i64) -> Result<()> {
        const GAMMA: f64 = 1.0;
        let transformed = match &mut self.optimistic {
            Some(o) => o.transform_end(GAMMA, reward, frames_remaining),
            None => reward,
        };
        let delta = transformed - self.q_perm[self.last_action];
        if !delta.is_finite() {
            return Err(AgentError::NumericFailure {
                detail: "dyna permanent terminal TD error is non-finite".to_string(),
            });
        }
        self.permanent
            .update(delta, self.last_action, &self.last_features);
        if let Some(dir) = &self.export_path {
            let path = dir.join(format!("dyna_permanent_weights_{}.txt", self.episode_index));
            self.permanent.save(path)?;
        }
        self.episode_index += 1;
        Ok(())
    }

    /// Seeds the transient-memory update chain at the start of a search
    /// rollout. Only the transient component is computed here — the
    /// permanent half of the combined value stays pinned at whatever
    /// `episode_start`/`episode_step` last computed into `q_perm`, and is
    /// never recomputed during the search phase that follows.
    pub fn start_transient(&mut self, action: usize, features: &[usize]) {
        self.last_trans_action = action;
        self.last_trans_features = features.to_vec();
        self.transient.compute_values(features, &mut self.trans_component);
    }

    /// Trains the transient memory one step; the TD target is the combined
    /// (pinned-permanent + transient) value, so the gradient targets the
    /// value the search-side weights add on top of the learned policy.
    /// `q_perm` is read, never recomputed, across every sub-step of a
    /// search phase — it is refreshed only once per real decision.
    pub fn update_transient(&mut self, next_action: usize, features: &[usize], reward: f64) {
        let before = self.trans_component[self.last_trans_action] + self.q_perm[self.last_trans_action];
        let mut delta = reward - before;

        let mut trans_next = Vec::new();
        self.transient.compute_values(features, &mut trans_next);
        delta += trans_next[next_action] + self.q_perm[next_action];

        self.transient
            .update(delta, self.last_trans_action, &self.last_trans_features);

        self.last_trans_features = features.to_vec();
        self.last_trans_action = next_action;
        self.trans_component = trans_next;
    }

    pub fn clear_transient(&mut self) {
        self.transient.clear();
        self.trans_component = vec![0.0; self.transient.num_actions()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> DynaConfig {
        DynaConfig {
            num_actions: 2,
            num_features: 4,
            p_alpha: 1.0,
            t_alpha: 1.0,
            p_epsilon: 0.0,
            t_epsilon: 0.0,
            p_lambda: 0.0,
            t_lambda: 0.0,
            normalize: true,
            optimistic: false,
            export_path: None,
        }
    }

    #[test]
    fn zero_search_iterations_collapses_to_permanent_only() {
        let mut dyna = DynaMemories::new(config());
        let mut rng = StdRng::seed_from_u64(7);
        let features = vec![0usize, 1];
        dyna.clear_transient();
        let a0 = dyna.episode_start(&mut rng, &features);
        assert_eq!(a0, 0);
        assert_eq!(dyna.trans_component, vec![0.0, 0.0]);
        let combined = dyna.combined(&dyna.q_perm.clone());
        assert_eq!(combined, dyna.q_perm);
    }

    #[test]
    fn transient_update_targets_combined_value() {
        let mut dyna = DynaMemories::new(config());
        let features = vec![0usize, 1];
        dyna.clear_transient();
        dyna.start_transient(0, &features);
        dyna.update_transient(0, &features, 3.0);
        // delta = 3.0 - 0.0 (perm and trans both zero initially) = 3.0,
        // update applied with alpha=1 on a normalized 2-feature vector.
        let combined_after = dyna.transient.compute_value(0, &features)
            + dyna.permanent.compute_value(0, &features);
        assert!((combined_after - 3.0).abs() < 1e-9);
    }
}
