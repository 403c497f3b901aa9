use rand::RngCore;

use crate::error::{Result, check_range};
use crate::policy::{Policy, sample_categorical};
use crate::state::AgentState;

/// Weights are rescaled by their maximum once the played weight leaves
/// `[WEIGHT_FLOOR, WEIGHT_CEILING]`.
const WEIGHT_CEILING: f64 = 1e100;
const WEIGHT_FLOOR: f64 = 1e-100;

/// Exp3 (exponential-weight algorithm for exploration and exploitation).
///
/// After the cold start the arm is drawn from
/// `p[i] = (1 - gamma) w[i] / sum(w) + gamma / K`. The played arm's weight
/// is multiplied by `exp(mean * gamma / K)` after every trial.
///
/// With `gamma = 1` the weights drop out and selection is uniform.
#[derive(Clone, Debug, PartialEq)]
pub struct Exp3 {
    gamma: f64,
    weights: Vec<f64>,
}

impl Exp3 {
    /// Creates an Exp3 policy with mixing rate `gamma` in `[0, 1]`.
    pub fn new(gamma: f64) -> Result<Self> {
        check_range("gamma", gamma, 0.0, 1.0)?;
        Ok(Self {
            gamma,
            weights: Vec::new(),
        })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Current per-arm weights. Only their ratios are meaningful.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Selection distribution implied by the current weights.
    pub fn probabilities(&self) -> Vec<f64> {
        let k = self.weights.len() as f64;
        let total: f64 = self.weights.iter().sum();
        self.weights
            .iter()
            .map(|w| (1.0 - self.gamma) * w / total + self.gamma / k)
            .collect()
    }

    fn rescale(&mut self) {
        let max = self.weights.iter().copied().fold(0.0, f64::max);
        if max.is_finite() && max > 0.0 {
            self.weights.iter_mut().for_each(|w| *w /= max);
        } else if max.is_infinite() {
            // An infinite weight dominates everything else.
            for w in &mut self.weights {
                *w = if w.is_infinite() { 1.0 } else { 0.0 };
            }
        } else {
            // Every weight collapsed to zero; their ratios are lost.
            self.weights.iter_mut().for_each(|w| *w = 1.0);
        }
    }
}

impl Default for Exp3 {
    fn default() -> Self {
        Self {
            gamma: 0.05,
            weights: Vec::new(),
        }
    }
}

impl Policy for Exp3 {
    fn name(&self) -> &'static str {
        "exp3"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.weights = vec![1.0; num_arms];
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }
        sample_categorical(&self.probabilities(), rng)
    }

    fn update(&mut self, state: &AgentState, arm: usize, _reward: f64) {
        let k = self.weights.len() as f64;
        self.weights[arm] *= (state.mean(arm) * self.gamma / k).exp();
        let weight = self.weights[arm];
        if !weight.is_finite() || weight > WEIGHT_CEILING || weight < WEIGHT_FLOOR {
            tracing::trace!(arm, weight, "rescaling exp3 weights");
            self.rescale();
        }
    }
}
