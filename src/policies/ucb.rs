//! UCB1, UCB2 and UCB1-Tuned.
//!
//! All three play every arm once in index order before scoring, then pick the
//! arm with the largest upper confidence bound.

use rand::RngCore;

use crate::error::{Result, check_positive};
use crate::policy::{Policy, argmax_random_tie, safe_ln, score_or_mean};
use crate::state::AgentState;

/// Upper Confidence Bound (UCB1) policy.
///
/// Score: `mean[i] + sqrt(2 ln(T) / n[i])`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ucb1;

impl Ucb1 {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// UCB1 score of every arm. Requires every arm to have been played.
    pub fn scores(state: &AgentState) -> Vec<f64> {
        let log_t = safe_ln(state.total_trials() as f64);
        state
            .means()
            .iter()
            .zip(state.plays())
            .map(|(&mean, &n)| score_or_mean(mean, (2.0 * log_t / n as f64).sqrt()))
            .collect()
    }
}

impl Policy for Ucb1 {
    fn name(&self) -> &'static str {
        "ucb1"
    }

    fn init(&mut self, _num_arms: usize) -> Result<()> {
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }
        argmax_random_tie(&Self::scores(state), rng)
    }
}

/// UCB2 policy.
///
/// Score: `mean[i] + sqrt((1 + alpha) ln(e T / tau) / (2 tau))` with
/// `tau = ceil((1 + alpha)^n[i])`. The bonus is zero whenever the logarithm
/// is not positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ucb2 {
    alpha: f64,
}

impl Ucb2 {
    /// Creates a UCB2 policy; `alpha` must be positive.
    pub fn new(alpha: f64) -> Result<Self> {
        check_positive("alpha", alpha)?;
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Exploration bonus for an arm played `n` times after `total` trials.
    pub fn bonus(&self, n: u64, total: usize) -> f64 {
        let tau = (1.0 + self.alpha).powf(n as f64).ceil();
        // `tau` overflows to infinity for long-played arms; the ratio then
        // reaches zero and the bonus vanishes.
        let ratio = std::f64::consts::E * total as f64 / tau;
        if ratio > 1.0 {
            ((1.0 + self.alpha) * ratio.ln() / (2.0 * tau)).sqrt()
        } else {
            0.0
        }
    }
}

impl Default for Ucb2 {
    fn default() -> Self {
        Self { alpha: 0.1 }
    }
}

impl Policy for Ucb2 {
    fn name(&self) -> &'static str {
        "ucb2"
    }

    fn init(&mut self, _num_arms: usize) -> Result<()> {
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }
        let total = state.total_trials();
        let scores: Vec<f64> = state
            .means()
            .iter()
            .zip(state.plays())
            .map(|(&mean, &n)| score_or_mean(mean, self.bonus(n, total)))
            .collect();
        argmax_random_tie(&scores, rng)
    }
}

/// UCB1-Tuned policy.
///
/// Uses the empirical variance to shrink the UCB1 bonus:
/// `mean[i] + sqrt(ln(T) * min(1/4, V[i]))` where
/// `V[i] = mean2[i] - mean[i]^2 + sqrt(2 ln(T) / n[i])`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ucb1Tuned {
    /// Running mean of squared rewards per arm.
    mean_squares: Vec<f64>,
}

impl Ucb1Tuned {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Running mean of squared rewards for each arm.
    pub fn mean_squares(&self) -> &[f64] {
        &self.mean_squares
    }
}

impl Policy for Ucb1Tuned {
    fn name(&self) -> &'static str {
        "ucb1-tuned"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.mean_squares = vec![0.0; num_arms];
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }
        let log_t = safe_ln(state.total_trials() as f64);
        let scores: Vec<f64> = (0..state.num_arms())
            .map(|i| {
                let mean = state.mean(i);
                let n = state.play_count(i);
                let spread = if n == 0 {
                    (2.0 * log_t).sqrt()
                } else {
                    (2.0 * log_t / n as f64).sqrt()
                };
                let v = self.mean_squares[i] - mean * mean + spread;
                score_or_mean(mean, (log_t * v.min(0.25)).sqrt())
            })
            .collect();
        argmax_random_tie(&scores, rng)
    }

    fn update(&mut self, state: &AgentState, arm: usize, reward: f64) {
        let n = state.play_count(arm) as f64;
        self.mean_squares[arm] += (reward * reward - self.mean_squares[arm]) / n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Agent;
    use crate::arm::FixedArm;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn state_with(plays: &[(usize, f64)], num_arms: usize) -> AgentState {
        let mut state = AgentState::new(num_arms);
        for &(arm, reward) in plays {
            state.record(arm, reward);
        }
        state
    }

    #[test]
    fn test_ucb1_cold_start_in_index_order() {
        let policy = Ucb1::new();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut state = AgentState::new(4);

        for t in 0..4 {
            assert_eq!(policy.select(&state, &mut rng), t);
            state.record(t, 0.0);
        }
    }

    #[test]
    fn test_ucb1_scores() {
        let state = state_with(&[(0, 0.5), (0, 0.7), (1, 0.3)], 2);
        let scores = Ucb1::scores(&state);

        let log_t = 3.0_f64.ln();
        assert_abs_diff_eq!(scores[0], 0.6 + (2.0 * log_t / 2.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(scores[1], 0.3 + (2.0 * log_t).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_ucb1_prefers_less_explored_arm_with_similar_mean() {
        let state = state_with(
            &[(0, 0.5), (0, 0.5), (0, 0.5), (0, 0.5), (1, 0.5)],
            2,
        );
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        assert_eq!(Ucb1::new().select(&state, &mut rng), 1);
    }

    #[test]
    fn test_ucb1_is_deterministic_without_ties() {
        let state = state_with(&[(0, 0.1), (1, 0.5), (2, 0.9), (0, 0.2), (1, 0.6), (2, 0.8)], 3);
        let mut rng1 = rand::rngs::StdRng::seed_from_u64(1);
        let mut rng2 = rand::rngs::StdRng::seed_from_u64(999);

        let policy = Ucb1::new();
        assert_eq!(policy.select(&state, &mut rng1), policy.select(&state, &mut rng2));
    }

    #[test]
    fn test_ucb2_bonus() {
        let policy = Ucb2::new(0.1).unwrap();

        // tau = ceil(1.1) = 2
        let expected = (1.1 * (std::f64::consts::E * 10.0 / 2.0).ln() / 4.0).sqrt();
        assert_abs_diff_eq!(policy.bonus(1, 10), expected, epsilon = 1e-12);

        // Log term not positive: no bonus.
        assert_eq!(policy.bonus(100, 10), 0.0);

        // tau overflows: no bonus, never NaN.
        assert_eq!(policy.bonus(100_000, 10), 0.0);
    }

    #[test]
    fn test_ucb2_invalid_alpha() {
        assert!(Ucb2::new(0.0).is_err());
        assert!(Ucb2::new(-1.0).is_err());
        assert_eq!(Ucb2::default().alpha(), 0.1);
    }

    #[test]
    fn test_ucb1_tuned_tracks_mean_of_squares() {
        let mut agent = Agent::new(vec![FixedArm(2.0), FixedArm(1.0)], Ucb1Tuned::new()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        agent.run(10, &mut rng).unwrap();

        let squares = agent.policy().mean_squares();
        assert_abs_diff_eq!(squares[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(squares[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ucb1_tuned_never_plays_worse_fixed_arm_after_cold_start() {
        let mut agent = Agent::new(vec![FixedArm(1.0), FixedArm(0.0)], Ucb1Tuned::new()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        agent.run(100, &mut rng).unwrap();

        assert!(agent.history()[2..].iter().all(|t| t.arm == 0));
    }
}
