use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{BanditError, Result, check_non_negative};
use crate::policy::{Policy, argmax_random_tie, safe_ln};
use crate::state::AgentState;
use crate::stats::{beta_quantile, normal_quantile};

/// Method used to build a binomial proportion confidence interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalMethod {
    /// Wald interval from the normal approximation, clipped to `[0, 1]`.
    Normal,
    /// Agresti-Coull adjusted Wald interval, clipped to `[0, 1]`.
    AgrestiCoull,
    /// Exact Clopper-Pearson interval from Beta quantiles.
    #[default]
    Beta,
    /// Wilson score interval.
    Wilson,
    /// Jeffreys interval: equal-tailed Beta(x + 1/2, n - x + 1/2) posterior.
    Jeffreys,
}

impl fmt::Display for IntervalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntervalMethod::Normal => "normal",
            IntervalMethod::AgrestiCoull => "agresti_coull",
            IntervalMethod::Beta => "beta",
            IntervalMethod::Wilson => "wilson",
            IntervalMethod::Jeffreys => "jeffreys",
        };
        f.write_str(name)
    }
}

impl FromStr for IntervalMethod {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(IntervalMethod::Normal),
            "agresti_coull" => Ok(IntervalMethod::AgrestiCoull),
            "beta" | "clopper_pearson" => Ok(IntervalMethod::Beta),
            "wilson" => Ok(IntervalMethod::Wilson),
            "jeffreys" => Ok(IntervalMethod::Jeffreys),
            other => Err(BanditError::Unknown {
                kind: "interval method",
                name: other.to_string(),
            }),
        }
    }
}

/// Two-sided `(1 - alpha)` confidence interval for a binomial proportion
/// with `count` successes out of `nobs` trials.
///
/// Returns `(lower, upper)`. The bounds are NaN when `nobs` is zero or when
/// `count` lies outside `[0, nobs]`.
pub fn proportion_interval(
    count: f64,
    nobs: f64,
    alpha: f64,
    method: IntervalMethod,
) -> (f64, f64) {
    if !(nobs > 0.0) || !(0.0..=nobs).contains(&count) {
        return (f64::NAN, f64::NAN);
    }

    let q = count / nobs;
    let z = normal_quantile(1.0 - alpha / 2.0);

    match method {
        IntervalMethod::Normal => {
            let half = z * (q * (1.0 - q) / nobs).sqrt();
            ((q - half).clamp(0.0, 1.0), (q + half).clamp(0.0, 1.0))
        }
        IntervalMethod::AgrestiCoull => {
            let z2 = z * z;
            let nobs_c = nobs + z2;
            let q_c = (count + z2 / 2.0) / nobs_c;
            let half = z * (q_c * (1.0 - q_c) / nobs_c).sqrt();
            ((q_c - half).clamp(0.0, 1.0), (q_c + half).clamp(0.0, 1.0))
        }
        IntervalMethod::Beta => {
            let lower = if count <= 0.0 {
                0.0
            } else {
                beta_quantile(alpha / 2.0, count, nobs - count + 1.0)
            };
            let upper = if count >= nobs {
                1.0
            } else {
                beta_quantile(1.0 - alpha / 2.0, count + 1.0, nobs - count)
            };
            (lower, upper)
        }
        IntervalMethod::Wilson => {
            let z2 = z * z;
            let denom = 1.0 + z2 / nobs;
            let center = (q + z2 / (2.0 * nobs)) / denom;
            let half = z * (q * (1.0 - q) / nobs + z2 / (4.0 * nobs * nobs)).sqrt() / denom;
            (center - half, center + half)
        }
        IntervalMethod::Jeffreys => {
            let a = count + 0.5;
            let b = nobs - count + 0.5;
            (
                beta_quantile(alpha / 2.0, a, b),
                beta_quantile(1.0 - alpha / 2.0, a, b),
            )
        }
    }
}

/// CP-UCB: plays the arm with the highest upper bound of a binomial
/// proportion confidence interval on its cumulative reward.
///
/// The interval has significance `1 / (T ln(T)^c)`, so it widens slowly as
/// the number of trials grows. Rewards are expected to lie in `[0, 1]`; arms
/// whose reward sum exceeds their play count are scored by their mean.
#[derive(Clone, Debug, PartialEq)]
pub struct CpUcb {
    c: f64,
    method: IntervalMethod,
    reward_sums: Vec<f64>,
}

impl CpUcb {
    /// Creates a CP-UCB policy; `c` must be non-negative.
    pub fn new(c: f64, method: IntervalMethod) -> Result<Self> {
        check_non_negative("c", c)?;
        Ok(Self {
            c,
            method,
            reward_sums: Vec::new(),
        })
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn method(&self) -> IntervalMethod {
        self.method
    }

    /// Cumulative reward of each arm.
    pub fn reward_sums(&self) -> &[f64] {
        &self.reward_sums
    }

    /// Interval significance after `total` trials, kept inside `(0, 1]`.
    pub fn significance(&self, total: usize) -> f64 {
        let t = total as f64;
        let alpha = 1.0 / (t * safe_ln(t).max(0.0).powf(self.c));
        if alpha.is_nan() {
            1.0
        } else {
            alpha.clamp(1e-12, 1.0)
        }
    }
}

impl Default for CpUcb {
    fn default() -> Self {
        Self {
            c: 1.0,
            method: IntervalMethod::Beta,
            reward_sums: Vec::new(),
        }
    }
}

impl Policy for CpUcb {
    fn name(&self) -> &'static str {
        "cp-ucb"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.reward_sums = vec![0.0; num_arms];
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }
        let alpha = self.significance(state.total_trials());
        let scores: Vec<f64> = (0..state.num_arms())
            .map(|i| {
                let nobs = state.play_count(i) as f64;
                let (_, upper) = proportion_interval(self.reward_sums[i], nobs, alpha, self.method);
                if upper.is_nan() {
                    state.mean(i)
                } else {
                    upper
                }
            })
            .collect();
        argmax_random_tie(&scores, rng)
    }

    fn update(&mut self, _state: &AgentState, arm: usize, reward: f64) {
        self.reward_sums[arm] += reward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Agent;
    use crate::arm::FixedArm;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    const METHODS: [IntervalMethod; 5] = [
        IntervalMethod::Normal,
        IntervalMethod::AgrestiCoull,
        IntervalMethod::Beta,
        IntervalMethod::Wilson,
        IntervalMethod::Jeffreys,
    ];

    #[test]
    fn test_intervals_contain_point_estimate() {
        for method in METHODS {
            for (count, nobs) in [(3.0, 10.0), (50.0, 100.0), (1.0, 4.0), (9.0, 12.0)] {
                let (lower, upper) = proportion_interval(count, nobs, 0.05, method);
                let q = count / nobs;
                assert!(lower <= q && q <= upper, "{method}: {lower} <= {q} <= {upper}");
                assert!(lower >= 0.0 && upper <= 1.0, "{method}: [{lower}, {upper}]");
            }
        }
    }

    #[test]
    fn test_clopper_pearson_reference_values() {
        // Zero successes: upper bound is 1 - (alpha / 2)^(1 / n).
        let (lower, upper) = proportion_interval(0.0, 10.0, 0.05, IntervalMethod::Beta);
        assert_eq!(lower, 0.0);
        assert_abs_diff_eq!(upper, 1.0 - 0.025_f64.powf(0.1), epsilon = 1e-9);

        // All successes: lower bound is (alpha / 2)^(1 / n).
        let (lower, upper) = proportion_interval(10.0, 10.0, 0.05, IntervalMethod::Beta);
        assert_abs_diff_eq!(lower, 0.025_f64.powf(0.1), epsilon = 1e-9);
        assert_eq!(upper, 1.0);
    }

    #[test]
    fn test_normal_interval() {
        let (lower, upper) = proportion_interval(50.0, 100.0, 0.05, IntervalMethod::Normal);
        let half = 1.959_963_985 * 0.05;
        assert_abs_diff_eq!(lower, 0.5 - half, epsilon = 1e-6);
        assert_abs_diff_eq!(upper, 0.5 + half, epsilon = 1e-6);
    }

    #[test]
    fn test_narrower_interval_with_more_data() {
        for method in METHODS {
            let (l1, u1) = proportion_interval(5.0, 10.0, 0.05, method);
            let (l2, u2) = proportion_interval(50.0, 100.0, 0.05, method);
            assert!(u2 - l2 < u1 - l1, "{method}");
        }
    }

    #[test]
    fn test_out_of_range_counts_are_nan() {
        let (lower, upper) = proportion_interval(3.0, 2.0, 0.05, IntervalMethod::Beta);
        assert!(lower.is_nan() && upper.is_nan());
        let (_, upper) = proportion_interval(0.0, 0.0, 0.05, IntervalMethod::Wilson);
        assert!(upper.is_nan());
    }

    #[test]
    fn test_significance_is_bounded() {
        let policy = CpUcb::default();
        assert_eq!(policy.significance(1), 1.0);
        assert_abs_diff_eq!(policy.significance(100), 1.0 / (100.0 * 100.0_f64.ln()), epsilon = 1e-15);
        assert!(policy.significance(1_000_000) > 0.0);
    }

    #[test]
    fn test_never_plays_zero_arm_after_cold_start() {
        let mut agent = Agent::new(vec![FixedArm(1.0), FixedArm(0.0)], CpUcb::default()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        agent.run(100, &mut rng).unwrap();

        assert!(agent.history()[2..].iter().all(|t| t.arm == 0));
        assert_eq!(agent.policy().reward_sums(), &[99.0, 0.0]);
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in METHODS {
            assert_eq!(method.to_string().parse::<IntervalMethod>().unwrap(), method);
        }
        assert!("bogus".parse::<IntervalMethod>().is_err());
    }
}
