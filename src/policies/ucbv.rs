use rand::RngCore;

use crate::error::{Result, check_non_negative};
use crate::policy::{Policy, argmax_random_tie, safe_ln, score_or_mean};
use crate::state::AgentState;

/// UCB-V policy: a variance-aware upper confidence bound.
///
/// Score: `mean[i] + sqrt(2 var[i] ln(T) / n[i]) + b ln(T) / n[i]` with
/// `var[i] = S2[i] / n[i] - mean[i]^2`.
///
/// Reference: Audibert, Munos and Szepesvári, "Exploration-exploitation
/// trade-off using variance estimates in multi-armed bandits" (2009).
#[derive(Clone, Debug, PartialEq)]
pub struct UcbV {
    b: f64,
    sum_squares: Vec<f64>,
}

impl UcbV {
    /// Creates a UCB-V policy with exploration constant `b >= 0`.
    pub fn new(b: f64) -> Result<Self> {
        check_non_negative("b", b)?;
        Ok(Self {
            b,
            sum_squares: Vec::new(),
        })
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// Empirical variance of an arm's rewards, clamped at zero.
    pub fn variance(&self, state: &AgentState, arm: usize) -> f64 {
        let n = state.play_count(arm) as f64;
        let mean = state.mean(arm);
        (self.sum_squares[arm] / n - mean * mean).max(0.0)
    }
}

impl Default for UcbV {
    fn default() -> Self {
        Self {
            b: 3.0,
            sum_squares: Vec::new(),
        }
    }
}

impl Policy for UcbV {
    fn name(&self) -> &'static str {
        "ucb-v"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.sum_squares = vec![0.0; num_arms];
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }
        let log_t = safe_ln(state.total_trials() as f64);
        let scores: Vec<f64> = (0..state.num_arms())
            .map(|i| {
                let n = state.play_count(i) as f64;
                let bonus = (2.0 * self.variance(state, i) * log_t / n).sqrt()
                    + self.b * log_t / n;
                score_or_mean(state.mean(i), bonus)
            })
            .collect();
        argmax_random_tie(&scores, rng)
    }

    fn update(&mut self, _state: &AgentState, arm: usize, reward: f64) {
        self.sum_squares[arm] += reward * reward;
    }
}
