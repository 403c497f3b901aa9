use rand::RngCore;

use crate::error::{Result, check_non_negative, check_positive};
use crate::policy::{Policy, argmax_random_tie, safe_ln};
use crate::state::AgentState;

/// Clamp applied to probabilities inside [`kl_bernoulli`].
pub const KL_EPSILON: f64 = 1e-15;

/// Kullback-Leibler divergence between Bernoulli(p) and Bernoulli(q), scaled
/// by `n` trials.
///
/// Both probabilities are clamped to `[eps, 1 - eps]` so the result is always
/// finite.
///
/// ```
/// use mablane::policies::kl_bernoulli;
///
/// assert_eq!(kl_bernoulli(0.3, 0.3, 1.0), 0.0);
/// assert!(kl_bernoulli(0.3, 0.9, 1.0) > kl_bernoulli(0.3, 0.5, 1.0));
/// ```
pub fn kl_bernoulli(p: f64, q: f64, n: f64) -> f64 {
    let p = p.clamp(KL_EPSILON, 1.0 - KL_EPSILON);
    let q = q.clamp(KL_EPSILON, 1.0 - KL_EPSILON);
    n * (p * (p / q).ln() + (1.0 - p) * ((1.0 - p) / (1.0 - q)).ln())
}

/// KL-UCB policy.
///
/// After the cold start every arm is scored with
/// `kl_bernoulli(mean[i], d / n[i], n)` where `d = ln(T) + c ln(T + 1)`,
/// and the highest score is played.
///
/// Reference: Garivier and Cappé, "The KL-UCB Algorithm for Bounded
/// Stochastic Bandits and Beyond" (2011).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KlUcb {
    n: f64,
    c: f64,
}

impl KlUcb {
    /// Creates a KL-UCB policy. `n` (trials per observation) must be positive
    /// and `c` non-negative.
    pub fn new(n: f64, c: f64) -> Result<Self> {
        check_positive("n", n)?;
        check_non_negative("c", c)?;
        Ok(Self { n, c })
    }

    pub fn n(&self) -> f64 {
        self.n
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// Exploration budget `d = ln(T) + c ln(T + 1)`.
    pub fn exploration_budget(&self, total: usize) -> f64 {
        let t = total as f64;
        safe_ln(t) + self.c * safe_ln(t + 1.0)
    }
}

impl Default for KlUcb {
    fn default() -> Self {
        Self { n: 1.0, c: 0.0 }
    }
}

impl Policy for KlUcb {
    fn name(&self) -> &'static str {
        "kl-ucb"
    }

    fn init(&mut self, _num_arms: usize) -> Result<()> {
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }
        let d = self.exploration_budget(state.total_trials());
        let scores: Vec<f64> = state
            .means()
            .iter()
            .zip(state.plays())
            .map(|(&mean, &plays)| {
                let score = kl_bernoulli(mean, d / plays as f64, self.n);
                if score.is_nan() { mean } else { score }
            })
            .collect();
        argmax_random_tie(&scores, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn test_kl_is_zero_on_the_diagonal() {
        for p in [0.0, 1e-9, 0.1, 0.5, 0.73, 0.999, 1.0] {
            assert_abs_diff_eq!(kl_bernoulli(p, p, 1.0), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(kl_bernoulli(p, p, 7.0), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_kl_grows_with_distance() {
        let p = 0.4;
        let mut previous = 0.0;
        for q in [0.45, 0.5, 0.6, 0.7, 0.8, 0.9, 0.99] {
            let kl = kl_bernoulli(p, q, 1.0);
            assert!(kl > previous, "kl({p}, {q}) = {kl} not above {previous}");
            previous = kl;
        }

        let mut previous = 0.0;
        for q in [0.35, 0.3, 0.2, 0.1, 0.01] {
            let kl = kl_bernoulli(p, q, 1.0);
            assert!(kl > previous);
            previous = kl;
        }
    }

    #[test]
    fn test_kl_scales_with_n_and_stays_finite() {
        assert_abs_diff_eq!(
            kl_bernoulli(0.2, 0.6, 3.0),
            3.0 * kl_bernoulli(0.2, 0.6, 1.0),
            epsilon = 1e-12
        );
        assert!(kl_bernoulli(0.0, 1.0, 1.0).is_finite());
        assert!(kl_bernoulli(1.0, 0.0, 1.0).is_finite());
    }

    #[test]
    fn test_exploration_budget() {
        let policy = KlUcb::new(1.0, 2.0).unwrap();
        assert_abs_diff_eq!(
            policy.exploration_budget(10),
            10.0_f64.ln() + 2.0 * 11.0_f64.ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_selects_largest_divergence() {
        let mut state = AgentState::new(2);
        state.record(0, 0.5);
        state.record(1, 0.9);
        for _ in 0..8 {
            state.record(0, 0.5);
        }
        let policy = KlUcb::default();
        let d = policy.exploration_budget(state.total_trials());
        let expected = if kl_bernoulli(0.5, d / 9.0, 1.0) > kl_bernoulli(0.9, d, 1.0) {
            0
        } else {
            1
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        assert_eq!(policy.select(&state, &mut rng), expected);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(KlUcb::new(0.0, 0.0).is_err());
        assert!(KlUcb::new(1.0, -1.0).is_err());
    }
}
