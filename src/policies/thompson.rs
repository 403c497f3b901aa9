use rand::RngCore;
use rand_distr::{Beta, Distribution};

use crate::error::{Result, check_non_negative, check_positive};
use crate::policy::{Policy, argmax_random_tie};
use crate::state::AgentState;
use crate::stats::beta_std;

/// Smallest value a Beta shape parameter is clamped to.
const MIN_SHAPE: f64 = 1e-12;

/// Per-arm Beta(alpha, beta) posteriors shared by the Bayesian policies.
///
/// Every arm starts at Beta(1, 1). A reward `x` out of `n` trials adds `x`
/// successes and `n - x` failures.
#[derive(Clone, Debug, PartialEq)]
struct BetaPosteriors {
    n: f64,
    alpha: Vec<f64>,
    beta: Vec<f64>,
}

impl BetaPosteriors {
    fn new(n: f64) -> Self {
        Self {
            n,
            alpha: Vec::new(),
            beta: Vec::new(),
        }
    }

    fn reset(&mut self, num_arms: usize) {
        self.alpha = vec![1.0; num_arms];
        self.beta = vec![1.0; num_arms];
    }

    fn observe(&mut self, arm: usize, reward: f64) {
        self.alpha[arm] += reward;
        self.beta[arm] += self.n - reward;
    }

    /// Shape parameters kept strictly positive, even when rewards fall
    /// outside `[0, n]`.
    fn shape(&self, arm: usize) -> (f64, f64) {
        (self.alpha[arm].max(MIN_SHAPE), self.beta[arm].max(MIN_SHAPE))
    }

    fn mean(&self, arm: usize) -> f64 {
        let (a, b) = self.shape(arm);
        a / (a + b)
    }

    fn sample(&self, arm: usize, rng: &mut dyn RngCore) -> f64 {
        let (a, b) = self.shape(arm);
        match Beta::new(a, b) {
            Ok(dist) => dist.sample(rng),
            Err(err) => {
                tracing::trace!(arm, alpha = a, beta = b, %err, "beta posterior unusable, using its mean");
                self.mean(arm)
            }
        }
    }
}

/// Thompson sampling with Beta-Bernoulli (or Beta-Binomial) posteriors.
///
/// Each trial draws one sample from every arm's posterior and plays the
/// largest. `n` is the number of trials behind each reward, so binomial arms
/// with `n` draws per pull are handled by setting it to that count.
#[derive(Clone, Debug, PartialEq)]
pub struct ThompsonSampling {
    posteriors: BetaPosteriors,
}

impl ThompsonSampling {
    /// Creates a Thompson sampler with `n > 0` trials per observation.
    pub fn new(n: f64) -> Result<Self> {
        check_positive("n", n)?;
        Ok(Self {
            posteriors: BetaPosteriors::new(n),
        })
    }

    pub fn n(&self) -> f64 {
        self.posteriors.n
    }

    pub fn alpha(&self) -> &[f64] {
        &self.posteriors.alpha
    }

    pub fn beta(&self) -> &[f64] {
        &self.posteriors.beta
    }

    /// Posterior mean `alpha / (alpha + beta)` of an arm.
    pub fn posterior_mean(&self, arm: usize) -> f64 {
        self.posteriors.mean(arm)
    }
}

impl Default for ThompsonSampling {
    fn default() -> Self {
        Self {
            posteriors: BetaPosteriors::new(1.0),
        }
    }
}

impl Policy for ThompsonSampling {
    fn name(&self) -> &'static str {
        "thompson-sampling"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.posteriors.reset(num_arms);
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        let samples: Vec<f64> = (0..state.num_arms())
            .map(|i| self.posteriors.sample(i, rng))
            .collect();
        argmax_random_tie(&samples, rng)
    }

    fn update(&mut self, _state: &AgentState, arm: usize, reward: f64) {
        self.posteriors.observe(arm, reward);
    }
}

/// Bayes-UCB: scores each arm with its running mean plus `gamma` posterior
/// standard deviations.
#[derive(Clone, Debug, PartialEq)]
pub struct BayesUcb {
    gamma: f64,
    posteriors: BetaPosteriors,
}

impl BayesUcb {
    /// `n > 0` trials per observation, `gamma >= 0` standard deviations.
    pub fn new(n: f64, gamma: f64) -> Result<Self> {
        check_positive("n", n)?;
        check_non_negative("gamma", gamma)?;
        Ok(Self {
            gamma,
            posteriors: BetaPosteriors::new(n),
        })
    }

    pub fn n(&self) -> f64 {
        self.posteriors.n
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn alpha(&self) -> &[f64] {
        &self.posteriors.alpha
    }

    pub fn beta(&self) -> &[f64] {
        &self.posteriors.beta
    }

    pub fn posterior_mean(&self, arm: usize) -> f64 {
        self.posteriors.mean(arm)
    }

    pub fn scores(&self, state: &AgentState) -> Vec<f64> {
        (0..state.num_arms())
            .map(|i| {
                let (a, b) = self.posteriors.shape(i);
                state.mean(i) + self.gamma * beta_std(a, b)
            })
            .collect()
    }
}

impl Default for BayesUcb {
    fn default() -> Self {
        Self {
            gamma: 3.0,
            posteriors: BetaPosteriors::new(1.0),
        }
    }
}

impl Policy for BayesUcb {
    fn name(&self) -> &'static str {
        "bayes-ucb"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.posteriors.reset(num_arms);
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        argmax_random_tie(&self.scores(state), rng)
    }

    fn update(&mut self, _state: &AgentState, arm: usize, reward: f64) {
        self.posteriors.observe(arm, reward);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    /// Three successes on arm 0, three failures on arm 1.
    fn observed<P: Policy>(policy: &mut P) -> AgentState {
        policy.init(2).unwrap();
        let mut state = AgentState::new(2);
        for _ in 0..3 {
            state.record(0, 1.0);
            policy.update(&state, 0, 1.0);
            state.record(1, 0.0);
            policy.update(&state, 1, 0.0);
        }
        state
    }

    #[test]
    fn test_posterior_update() {
        let mut policy = ThompsonSampling::default();
        observed(&mut policy);

        assert_eq!(policy.alpha(), &[4.0, 1.0]);
        assert_eq!(policy.beta(), &[1.0, 4.0]);
        assert_abs_diff_eq!(policy.posterior_mean(0), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(policy.posterior_mean(1), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_binomial_observations() {
        let mut policy = ThompsonSampling::new(10.0).unwrap();
        policy.init(1).unwrap();
        let state = AgentState::new(1);
        policy.update(&state, 0, 7.0);

        assert_eq!(policy.alpha(), &[8.0]);
        assert_eq!(policy.beta(), &[4.0]);
    }

    #[test]
    fn test_thompson_favors_successful_arm() {
        let mut policy = ThompsonSampling::default();
        let state = observed(&mut policy);

        let mut wins = 0;
        for seed in 0..1000 {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            if policy.select(&state, &mut rng) == 0 {
                wins += 1;
            }
        }
        // P(Beta(4, 1) > Beta(1, 4)) is about 0.98.
        assert!(wins > 930, "successful arm chosen {wins} times out of 1000");
    }

    #[test]
    fn test_negative_beta_is_clamped() {
        let mut policy = ThompsonSampling::default();
        policy.init(1).unwrap();
        let state = AgentState::new(1);
        policy.update(&state, 0, 5.0);

        assert!(policy.beta()[0] < 0.0);
        let (a, b) = policy.posteriors.shape(0);
        assert_eq!(a, 6.0);
        assert!(b > 0.0);
        assert_abs_diff_eq!(policy.posterior_mean(0), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bayes_ucb_scores() {
        let mut policy = BayesUcb::default();
        let state = observed(&mut policy);

        let scores = policy.scores(&state);
        assert_abs_diff_eq!(scores[0], 1.0 + 3.0 * beta_std(4.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(scores[1], 3.0 * beta_std(1.0, 4.0), epsilon = 1e-12);

        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(policy.select(&state, &mut rng), 0);
        }
    }

    #[test]
    fn test_bayes_ucb_explores_unseen_arms() {
        let mut policy = BayesUcb::default();
        policy.init(2).unwrap();
        let mut state = AgentState::new(2);
        for _ in 0..20 {
            state.record(0, 0.1);
            policy.update(&state, 0, 0.1);
        }
        // Arm 1 keeps the wide Beta(1, 1) prior.
        let scores = policy.scores(&state);
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(ThompsonSampling::new(0.0).is_err());
        assert!(BayesUcb::new(1.0, -1.0).is_err());
        assert!(BayesUcb::new(-1.0, 1.0).is_err());
    }
}
