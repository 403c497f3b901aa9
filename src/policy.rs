//! Policy trait definition for bandit strategies, plus the selection helpers
//! the strategies share.

use rand::{Rng, RngCore};

use crate::error::Result;
use crate::state::{AgentState, Exploration};

/// Smallest value a logarithm argument is clamped to.
pub const LOG_EPSILON: f64 = 1e-15;

/// An arm-selection strategy.
///
/// The [`Agent`](crate::Agent) owns the shared statistics in [`AgentState`]
/// and hands them to the policy by reference. A policy only owns its
/// hyperparameters and whatever auxiliary per-arm arrays it needs.
///
/// Randomness always comes from the `rng` argument, never from a global
/// generator, so seeded runs are reproducible. The trait is object-safe:
/// `Box<dyn Policy>` is itself a policy.
pub trait Policy {
    /// Human-readable strategy name.
    fn name(&self) -> &'static str;

    /// Sizes auxiliary arrays for `num_arms` arms and validates any per-arm
    /// configuration. Called once by the agent at construction.
    fn init(&mut self, num_arms: usize) -> Result<()>;

    /// Picks the next arm to play.
    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize;

    /// Post-trial hook, called after `state` already includes the new reward.
    fn update(&mut self, _state: &AgentState, _arm: usize, _reward: f64) {}

    /// Exploration schedule the agent should keep for this policy.
    fn exploration(&self) -> Option<Exploration> {
        None
    }

    /// Optional per-arm starting estimates for the running means.
    fn initial_estimates(&self) -> Option<&[f64]> {
        None
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        (**self).init(num_arms)
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        (**self).select(state, rng)
    }

    fn update(&mut self, state: &AgentState, arm: usize, reward: f64) {
        (**self).update(state, arm, reward)
    }

    fn exploration(&self) -> Option<Exploration> {
        (**self).exploration()
    }

    fn initial_estimates(&self) -> Option<&[f64]> {
        (**self).initial_estimates()
    }
}

/// Natural log with the argument clamped to [`LOG_EPSILON`].
pub fn safe_ln(x: f64) -> f64 {
    if x > LOG_EPSILON {
        x.ln()
    } else {
        LOG_EPSILON.ln()
    }
}

/// `mean + bonus`, or just `mean` when the bonus is NaN.
pub fn score_or_mean(mean: f64, bonus: f64) -> f64 {
    if bonus.is_nan() {
        tracing::trace!(mean, "NaN exploration bonus, falling back to the running mean");
        mean
    } else {
        mean + bonus
    }
}

/// Index of the largest score; ties are broken uniformly at random.
///
/// NaN scores never win. If every score is NaN the choice is uniform over all
/// indices.
pub fn argmax_random_tie(scores: &[f64], rng: &mut dyn RngCore) -> usize {
    debug_assert!(!scores.is_empty());
    let best = scores
        .iter()
        .copied()
        .filter(|s| !s.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);

    let ties: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == best)
        .map(|(i, _)| i)
        .collect();

    if ties.is_empty() {
        rng.random_range(0..scores.len())
    } else if ties.len() == 1 {
        ties[0]
    } else {
        ties[rng.random_range(0..ties.len())]
    }
}

/// Draws an index with probability proportional to `probs[i]`.
///
/// `probs` need not be normalised. When the weights are unusable (a negative
/// or non-finite entry, or a zero total) the draw is uniform.
pub fn sample_categorical(probs: &[f64], rng: &mut dyn RngCore) -> usize {
    debug_assert!(!probs.is_empty());
    let total: f64 = probs.iter().sum();
    if !total.is_finite() || total <= 0.0 || probs.iter().any(|p| !(p.is_finite() && *p >= 0.0)) {
        tracing::trace!(total, "unusable selection probabilities, drawing uniformly");
        return rng.random_range(0..probs.len());
    }

    let u = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cumulative += p;
        if cumulative > u {
            return i;
        }
    }
    // Rounding slack.
    probs.len() - 1
}

/// `exp(x_i) / sum_j exp(x_j)`, computed after shifting by the maximum so
/// large inputs cannot overflow.
pub fn softmax(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let values: Vec<f64> = values.into_iter().collect();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        let n = values.len() as f64;
        return vec![1.0 / n; values.len()];
    }
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Checks that a per-arm array matches the arm count.
pub(crate) fn check_len(what: &str, len: usize, num_arms: usize) -> Result<()> {
    if len == num_arms {
        Ok(())
    } else {
        Err(crate::BanditError::DimensionMismatch {
            message: format!("{what} has {len} entries but there are {num_arms} arms"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn test_argmax_unique() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        assert_eq!(argmax_random_tie(&[0.1, 0.9, 0.3], &mut rng), 1);
    }

    #[test]
    fn test_argmax_ties_are_uniform() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut counts = [0usize; 4];
        for _ in 0..8000 {
            counts[argmax_random_tie(&[1.0, 0.0, 1.0, 1.0], &mut rng)] += 1;
        }
        assert_eq!(counts[1], 0);
        for &c in &[counts[0], counts[2], counts[3]] {
            assert!((c as f64 / 8000.0 - 1.0 / 3.0).abs() < 0.03);
        }
    }

    #[test]
    fn test_argmax_ignores_nan() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        assert_eq!(argmax_random_tie(&[f64::NAN, 0.2, f64::NAN], &mut rng), 1);
        let all_nan = argmax_random_tie(&[f64::NAN, f64::NAN], &mut rng);
        assert!(all_nan < 2);
    }

    #[test]
    fn test_sample_categorical_degenerate() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_eq!(sample_categorical(&[0.0, 1.0, 0.0], &mut rng), 1);
        }
    }

    #[test]
    fn test_sample_categorical_frequencies() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(9);
        let probs = [0.2, 0.5, 0.3];
        let mut counts = [0usize; 3];
        let n = 20_000;
        for _ in 0..n {
            counts[sample_categorical(&probs, &mut rng)] += 1;
        }
        for (c, p) in counts.iter().zip(probs) {
            assert_abs_diff_eq!(*c as f64 / n as f64, p, epsilon = 0.02);
        }
    }

    #[test]
    fn test_sample_categorical_unusable_weights_are_uniform() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(13);
        for probs in [[f64::NAN, f64::NAN], [0.0, 0.0], [f64::INFINITY, 1.0]] {
            let mut counts = [0usize; 2];
            for _ in 0..10_000 {
                counts[sample_categorical(&probs, &mut rng)] += 1;
            }
            assert_abs_diff_eq!(counts[0] as f64 / 10_000.0, 0.5, epsilon = 0.03);
        }
    }

    #[test]
    fn test_sample_categorical_unnormalised_weights() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(21);
        let mut counts = [0usize; 2];
        for _ in 0..20_000 {
            counts[sample_categorical(&[3.0, 1.0], &mut rng)] += 1;
        }
        assert_abs_diff_eq!(counts[0] as f64 / 20_000.0, 0.75, epsilon = 0.02);
    }

    #[test]
    fn test_softmax_does_not_overflow() {
        let p = softmax([1000.0, 1000.0, 0.0]);
        assert_abs_diff_eq!(p[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_safe_ln_clamps() {
        assert!(safe_ln(0.0).is_finite());
        assert!(safe_ln(-3.0).is_finite());
        assert_abs_diff_eq!(safe_ln(std::f64::consts::E), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_score_or_mean() {
        assert_eq!(score_or_mean(0.5, f64::NAN), 0.5);
        assert_eq!(score_or_mean(0.5, 0.25), 0.75);
    }
}
