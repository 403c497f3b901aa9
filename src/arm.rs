//! Reward sources for multi-armed bandits.
//!
//! An [`Arm`] yields one reward per pull. Strategies never look inside an arm;
//! the optional [`Arm::expected_reward`] exists only for diagnostics such as
//! regret.

use rand::RngCore;
use rand_distr::{Binomial, Distribution, Geometric};

use crate::error::{Result, check_range};

/// A reward-generating source that can be pulled repeatedly.
///
/// # Examples
///
/// ```
/// use mablane::arm::{Arm, BinomialArm};
/// use rand::SeedableRng;
///
/// let mut arm = BinomialArm::new(0.3, 1).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let reward = arm.pull(&mut rng);
/// assert!(reward == 0.0 || reward == 1.0);
/// assert_eq!(arm.expected_reward(), Some(0.3));
/// ```
pub trait Arm {
    /// Draws one reward sample.
    fn pull(&mut self, rng: &mut dyn RngCore) -> f64;

    /// True expected reward, if known.
    fn expected_reward(&self) -> Option<f64> {
        None
    }
}

impl<T: Arm + ?Sized> Arm for Box<T> {
    fn pull(&mut self, rng: &mut dyn RngCore) -> f64 {
        (**self).pull(rng)
    }

    fn expected_reward(&self) -> Option<f64> {
        (**self).expected_reward()
    }
}

/// Arm whose reward is the number of successes in `number` Bernoulli trials.
#[derive(Clone, Debug)]
pub struct BinomialArm {
    probability: f64,
    number: u64,
    dist: Binomial,
}

impl BinomialArm {
    /// Creates a binomial arm; `number = 1` gives a Bernoulli arm.
    pub fn new(probability: f64, number: u64) -> Result<Self> {
        check_range("probability", probability, 0.0, 1.0)?;
        if number == 0 {
            return Err(crate::BanditError::invalid("number must be at least 1"));
        }
        let dist = Binomial::new(number, probability)
            .map_err(|e| crate::BanditError::invalid(format!("binomial arm: {e}")))?;
        Ok(Self {
            probability,
            number,
            dist,
        })
    }

    /// Success probability of each trial.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Number of trials per pull.
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl Arm for BinomialArm {
    fn pull(&mut self, rng: &mut dyn RngCore) -> f64 {
        self.dist.sample(rng) as f64
    }

    fn expected_reward(&self) -> Option<f64> {
        Some(self.number as f64 * self.probability)
    }
}

/// Arm whose reward is the number of failures seen before `number` successes.
#[derive(Clone, Debug)]
pub struct NegativeBinomialArm {
    probability: f64,
    number: u64,
    dist: Geometric,
}

impl NegativeBinomialArm {
    /// Creates a negative binomial arm. `probability` must be in `(0, 1]`.
    pub fn new(probability: f64, number: u64) -> Result<Self> {
        check_range("probability", probability, 0.0, 1.0)?;
        if probability == 0.0 {
            return Err(crate::BanditError::invalid(
                "probability must be positive for a negative binomial arm",
            ));
        }
        if number == 0 {
            return Err(crate::BanditError::invalid("number must be at least 1"));
        }
        let dist = Geometric::new(probability)
            .map_err(|e| crate::BanditError::invalid(format!("negative binomial arm: {e}")))?;
        Ok(Self {
            probability,
            number,
            dist,
        })
    }

    /// Success probability of each trial.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Number of successes to wait for.
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl Arm for NegativeBinomialArm {
    fn pull(&mut self, rng: &mut dyn RngCore) -> f64 {
        // Sum of `number` independent geometric failure counts.
        (0..self.number)
            .map(|_| self.dist.sample(rng) as f64)
            .sum()
    }

    fn expected_reward(&self) -> Option<f64> {
        Some(self.number as f64 * (1.0 - self.probability) / self.probability)
    }
}

/// Arm that always pays the same reward. Handy for tests and baselines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedArm(pub f64);

impl Arm for FixedArm {
    fn pull(&mut self, _rng: &mut dyn RngCore) -> f64 {
        self.0
    }

    fn expected_reward(&self) -> Option<f64> {
        Some(self.0)
    }
}
