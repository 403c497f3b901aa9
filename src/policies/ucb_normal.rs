use rand::{Rng, RngCore};

use crate::error::Result;
use crate::policy::{Policy, argmax_random_tie, safe_ln, score_or_mean};
use crate::state::AgentState;

/// UCB-Normal policy, for rewards that are roughly normally distributed.
///
/// Any arm played fewer than `ceil(8 ln T)` times is forced first (chosen
/// uniformly among such arms). Otherwise the score is
/// `mean[i] + sqrt(16 (S2[i] - n[i] mean[i]^2) / (n[i] - 1) * ln(T - 1) / n[i])`
/// where `S2[i]` is the sum of squared rewards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UcbNormal {
    sum_squares: Vec<f64>,
}

impl UcbNormal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of squared rewards observed for each arm.
    pub fn sum_squares(&self) -> &[f64] {
        &self.sum_squares
    }

    /// Minimum number of plays every arm must have after `total` trials.
    pub fn min_plays(total: usize) -> u64 {
        if total > 0 {
            (8.0 * (total as f64).ln()).ceil().max(0.0) as u64
        } else {
            1
        }
    }

    fn bonus(&self, state: &AgentState, arm: usize) -> f64 {
        let n = state.play_count(arm) as f64;
        let mean = state.mean(arm);
        let variance = (self.sum_squares[arm] - n * mean * mean) / (n - 1.0);
        // A slightly negative variance from rounding yields NaN here and the
        // caller falls back to the mean.
        (16.0 * variance * safe_ln(state.total_trials() as f64 - 1.0) / n).sqrt()
    }
}

impl Policy for UcbNormal {
    fn name(&self) -> &'static str {
        "ucb-normal"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.sum_squares = vec![0.0; num_arms];
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }

        let min_plays = Self::min_plays(state.total_trials());
        let under_played: Vec<usize> = state
            .plays()
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n < min_plays)
            .map(|(i, _)| i)
            .collect();
        if !under_played.is_empty() {
            return under_played[rng.random_range(0..under_played.len())];
        }

        let scores: Vec<f64> = (0..state.num_arms())
            .map(|i| {
                let mean = state.mean(i);
                if state.play_count(i) > 1 {
                    score_or_mean(mean, self.bonus(state, i))
                } else {
                    mean
                }
            })
            .collect();
        argmax_random_tie(&scores, rng)
    }

    fn update(&mut self, _state: &AgentState, arm: usize, reward: f64) {
        self.sum_squares[arm] += reward * reward;
    }
}
