use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use rand::Rng;

use crate::error::{AgentError, Result};

/// Per-action dense weight table `W[a][f]` with a dot-product `Q` cache,
/// a learning rate, and optional normalization by non-zero feature count.
#[derive(Debug, Clone)]
pub struct LinearApproximator {
    weights: Vec<Vec<f64>>,
    alpha: f64,
    normalize: bool,
}

impl LinearApproximator {
    pub fn new(num_actions: usize, num_features: usize, alpha: f64, normalize: bool) -> Self {
        Self {
            weights: vec![vec![0.0; num_features]; num_actions],
            alpha,
            normalize,
        }
    }

    pub fn num_actions(&self) -> usize {
        self.weights.len()
    }

    pub fn num_features(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    /// `Q[a] = (Σ_{f in features} W[a][f]) / n` when normalized, else the
    /// unnormalized sum. Writes into `out`, resizing it to `num_actions`.
    pub fn compute_values(&self, features: &[usize], out: &mut Vec<f64>) {
        out.clear();
        out.resize(self.num_actions(), 0.0);
        for a in 0..self.num_actions() {
            out[a] = self.compute_value(a, features);
        }
    }

    pub fn compute_value(&self, action: usize, features: &[usize]) -> f64 {
        let sum: f64 = features.iter().map(|&f| self.weights[action][f]).sum();
        if self.normalize && !features.is_empty() {
            sum / features.len() as f64
        } else {
            sum
        }
    }

    /// `W[a][f] += alpha * delta` for every feature index in `features`.
    pub fn update(&mut self, delta: f64, action: usize, features: &[usize]) {
        let incr = self.alpha * delta;
        for &f in features {
            self.weights[action][f] += incr;
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.weights {
            row.iter_mut().for_each(|w| *w = 0.0);
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        for row in &self.weights {
            for w in row {
                writeln!(file, "{w}")?;
            }
        }
        Ok(())
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut values = Vec::with_capacity(self.num_actions() * self.num_features());
        for line in reader.lines() {
            let line = line?;
            for token in line.split_whitespace() {
                let v: f64 = token.parse().map_err(|_| AgentError::NumericFailure {
                    detail: format!("invalid weight value: {token}"),
                })?;
                values.push(v);
            }
        }
        let expected = self.num_actions() * self.num_features();
        if values.len() != expected {
            return Err(AgentError::NumericFailure {
                detail: format!(
                    "weight file has {} values, expected {expected}",
                    values.len()
                ),
            });
        }
        let mut it = values.into_iter();
        for row in &mut self.weights {
            for w in row.iter_mut() {
                *w = it.next().expect("length checked above");
            }
        }
        Ok(())
    }
}

/// Tracks the optimistic-initialization transform: the first strictly
/// positive reward seen in an episode scales every subsequent reward.
#[derive(Debug, Clone, Default)]
pub struct OptimisticTracker {
    first_positive_reward: Option<f64>,
}

impl OptimisticTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.first_positive_reward = None;
    }

    fn note(&mut self, reward: f64) {
        if self.first_positive_reward.is_none() && reward > 0.0 {
            self.first_positive_reward = Some(reward.abs());
        }
    }

    /// Mid-episode transform: `r/r0 + (gamma - 1)` once `r0` is known, else
    /// `gamma - 1`.
    pub fn transform(&mut self, gamma: f64, reward: f64) -> f64 {
        self.note(reward);
        match self.first_positive_reward {
            Some(r0) => reward / r0 + (gamma - 1.0),
            None => gamma - 1.0,
        }
    }

    /// End-of-episode transform: the mid-episode transform further adjusted
    /// by `gamma^(frames_remaining+1) - 1`. `frames_remaining` is signed and
    /// left unclamped by the caller: under an unbounded frame budget it can
    /// go negative, which is what the original's own unclamped
    /// `maxFrames - currentFrame` subtraction produces.
    pub fn transform_end(&mut self, gamma: f64, reward: f64, frames_remaining: i64) -> f64 {
        let base = self.transform(gamma, reward);
        base - (gamma.powi(frames_remaining as i32 + 1) - 1.0)
    }
}

/// First-maximum-wins argmax: ties keep the lowest index.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// `epsilon`-greedy action choice over `values`; `rng` drives both the
/// explore/exploit coin flip and the uniform action pick on explore.
pub fn epsilon_greedy(rng: &mut impl Rng, epsilon: f64, values: &[f64]) -> usize {
    if epsilon > 0.0 && rng.gen::<f64>() < epsilon {
        rng.gen_range(0..values.len())
    } else {
        argmax(values)
    }
}
