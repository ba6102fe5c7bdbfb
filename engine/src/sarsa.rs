use std::path::{Path, PathBuf};

use rand::Rng;

use crate::error::{AgentError, Result};
use crate::lfa::{argmax, epsilon_greedy, LinearApproximator, OptimisticTracker};

/// On-policy epsilon-greedy TD(0) control over an [`LinearApproximator`].
pub struct Sarsa {
    lfa: LinearApproximator,
    epsilon: f64,
    gamma: f64,
    #[allow(dead_code)]
    lambda: f64,
    policy_frozen: bool,
    optimistic: Option<OptimisticTracker>,
    export_path: Option<PathBuf>,
    episode_index: u64,
    last_action: usize,
    last_features: Vec<usize>,
    q: Vec<f64>,
}

pub struct SarsaConfig {
    pub num_actions: usize,
    pub num_features: usize,
    pub alpha: f64,
    pub epsilon: f64,
    pub gamma: f64,
    pub lambda: f64,
    pub normalize: bool,
    pub policy_frozen: bool,
    pub optimistic: bool,
    pub export_path: Option<PathBuf>,
}

impl Sarsa {
    pub fn new(config: SarsaConfig) -> Self {
        Self {
            lfa: LinearApproximator::new(
                config.num_actions,
                config.num_features,
                config.alpha,
                config.normalize,
            ),
            epsilon: config.epsilon,
            gamma: config.gamma,
            lambda: config.lambda,
            policy_frozen: config.policy_frozen,
            optimistic: config.optimistic.then(OptimisticTracker::new),
            export_path: config.export_path,
            episode_index: 0,
            last_action: 0,
            last_features: Vec::new(),
            q: Vec::new(),
        }
    }

    pub fn load_weights(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.lfa.load(path)
    }

    pub fn episode_start(&mut self, rng: &mut impl Rng, features: &[usize]) -> usize {
        if let Some(o) = &mut self.optimistic {
            o.reset();
        }
        self.lfa.compute_values(features, &mut self.q);
        let action = if self.policy_frozen {
            argmax(&self.q)
        } else {
            epsilon_greedy(rng, self.epsilon, &self.q)
        };
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
        if self.policy_frozen {
            self.lfa.compute_values(features, &mut self.q);
            let action = argmax(&self.q);
            self.last_action = action;
            self.last_features = features.to_vec();
            return Ok(action);
        }

        let transformed = match &mut self.optimistic {
            Some(o) => o.transform(self.gamma, reward),
            None => reward,
        };
        let mut delta = transformed - self.q[self.last_action];

        let mut q_next = Vec::new();
        self.lfa.compute_values(features, &mut q_next);
        let next_action = epsilon_greedy(rng, self.epsilon, &q_next);
        delta += self.gamma * q_next[next_action];

        if !delta.is_finite() {
            return Err(AgentError::NumericFailure {
                detail: "sarsa TD error is non-finite".to_string(),
            });
        }

        self.lfa.update(delta, self.last_action, &self.last_features);
        self.last_features = features.to_vec();
        self.last_action = next_action;
        self.q = q_next;
        Ok(next_action)
    }

    pub fn episode_end(&mut self, reward: f64, frames_remaining: i64) -> Result<()> {
        if !self.policy_frozen {
            let transformed = match &mut self.optimistic {
                Some(o) => o.transform_end(self.gamma, reward, frames_remaining),
                None => reward,
            };
            let delta = transformed - self.q[self.last_action];
            if !delta.is_finite() {
                return Err(AgentError::NumericFailure {
                    detail: "sarsa terminal TD error is non-finite".to_string(),
                });
            }
            self.lfa.update(delta, self.last_action, &self.last_features);
        }
        if let Some(dir) = &self.export_path {
            let path = dir.join(format!("sarsa_weights_{}.txt", self.episode_index));
            self.lfa.save(path)?;
        }
        self.episode_index += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(num_features: usize) -> SarsaConfig {
        SarsaConfig {
            num_actions: 2,
            num_features,
            alpha: 1.0,
            epsilon: 0.0,
            gamma: 0.0,
            lambda: 0.0,
            normalize: true,
            policy_frozen: false,
            optimistic: false,
            export_path: None,
        }
    }

    #[test]
    fn fixed_point_with_zero_gamma_unit_alpha() {
        let mut sarsa = Sarsa::new(config(4));
        let mut rng = StdRng::seed_from_u64(1);
        let features = vec![0usize, 1, 2];
        let a0 = sarsa.episode_start(&mut rng, &features);
        assert_eq!(a0, 0); // all-zero Q, argmax ties to action 0

        let a1 = sarsa.episode_step(&mut rng, 5.0, &features).unwrap();
        // gamma=0 so delta = reward - Q[a_last] = 5.0; update drives
        // Q[a0] on these same features straight to 5.0.
        assert_eq!(a1, 0);
        let q = sarsa.lfa.compute_value(0, &features);
        assert!((q - 5.0).abs() < 1e-9);
    }

    #[test]
    fn policy_frozen_never_updates_weights() {
        let mut config = config(4);
        config.policy_frozen = true;
        let mut sarsa = Sarsa::new(config);
        let mut rng = StdRng::seed_from_u64(2);
        let features = vec![0usize, 1];
        sarsa.episode_start(&mut rng, &features);
        sarsa.episode_step(&mut rng, 10.0, &features).unwrap();
        sarsa.episode_end(10.0, 0).unwrap();
        assert_eq!(sarsa.lfa.compute_value(0, &features), 0.0);
        assert_eq!(sarsa.lfa.compute_value(1, &features), 0.0);
    }
}
