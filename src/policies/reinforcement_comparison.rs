use rand::RngCore;

use crate::error::{Result, check_non_negative, check_range};
use crate::policy::{Policy, sample_categorical, softmax};
use crate::state::AgentState;

/// Reinforcement comparison.
///
/// Each arm keeps a preference `pi` and a smoothed reference reward `r`.
/// A reward above the reference raises the played arm's preference, one
/// below lowers it. Arms are drawn from `softmax(pi)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReinforcementComparison {
    alpha: f64,
    beta: f64,
    preferences: Vec<f64>,
    references: Vec<f64>,
}

impl ReinforcementComparison {
    /// `alpha` in `[0, 1]` smooths the reference reward; `beta >= 0` is the
    /// preference learning rate.
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        check_range("alpha", alpha, 0.0, 1.0)?;
        check_non_negative("beta", beta)?;
        Ok(Self {
            alpha,
            beta,
            preferences: Vec::new(),
            references: Vec::new(),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn preferences(&self) -> &[f64] {
        &self.preferences
    }

    pub fn references(&self) -> &[f64] {
        &self.references
    }

    pub fn probabilities(&self) -> Vec<f64> {
        softmax(self.preferences.iter().copied())
    }
}

impl Default for ReinforcementComparison {
    fn default() -> Self {
        Self {
            alpha: 0.001,
            beta: 0.1,
            preferences: Vec::new(),
            references: Vec::new(),
        }
    }
}

impl Policy for ReinforcementComparison {
    fn name(&self) -> &'static str {
        "reinforcement-comparison"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.preferences = vec![0.0; num_arms];
        self.references = vec![0.0; num_arms];
        Ok(())
    }

    fn select(&self, _state: &AgentState, rng: &mut dyn RngCore) -> usize {
        sample_categorical(&self.probabilities(), rng)
    }

    fn update(&mut self, _state: &AgentState, arm: usize, reward: f64) {
        let reference = &mut self.references[arm];
        *reference = (1.0 - self.alpha) * *reference + self.alpha * reward;
        self.preferences[arm] += self.beta * (reward - *reference);
    }
}
