use rand::RngCore;

use crate::error::Result;
use crate::policy::{Policy, argmax_random_tie, safe_ln, score_or_mean};
use crate::state::AgentState;

/// MOSS (Minimax Optimal Strategy in the Stochastic case).
///
/// Score: `mean[i] + sqrt(max(0, ln(T / (K n[i]))) / n[i])`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moss;

impl Moss {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Policy for Moss {
    fn name(&self) -> &'static str {
        "moss"
    }

    fn init(&mut self, _num_arms: usize) -> Result<()> {
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }
        let total = state.total_trials() as f64;
        let k = state.num_arms() as f64;
        let scores: Vec<f64> = state
            .means()
            .iter()
            .zip(state.plays())
            .map(|(&mean, &n)| {
                let n = n as f64;
                let bonus = (safe_ln(total / (k * n)).max(0.0) / n).sqrt();
                score_or_mean(mean, bonus)
            })
            .collect();
        argmax_random_tie(&scores, rng)
    }
}
