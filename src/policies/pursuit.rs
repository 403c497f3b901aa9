use rand::RngCore;

use crate::error::{Result, check_range};
use crate::policy::{Policy, sample_categorical};
use crate::state::AgentState;

/// Pursuit: keeps an explicit selection distribution and moves it toward
/// the arm with the highest running mean after every trial.
///
/// The update `p[best] += beta (1 - p[best])`, `p[other] -= beta p[other]`
/// preserves the total probability mass.
#[derive(Clone, Debug, PartialEq)]
pub struct Pursuit {
    beta: f64,
    probabilities: Vec<f64>,
}

impl Pursuit {
    /// Creates a pursuit policy with learning rate `beta` in `[0, 1]`.
    pub fn new(beta: f64) -> Result<Self> {
        check_range("beta", beta, 0.0, 1.0)?;
        Ok(Self {
            beta,
            probabilities: Vec::new(),
        })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

impl Default for Pursuit {
    fn default() -> Self {
        Self {
            beta: 0.01,
            probabilities: Vec::new(),
        }
    }
}

impl Policy for Pursuit {
    fn name(&self) -> &'static str {
        "pursuit"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        self.probabilities = vec![1.0 / num_arms as f64; num_arms];
        Ok(())
    }

    fn select(&self, _state: &AgentState, rng: &mut dyn RngCore) -> usize {
        sample_categorical(&self.probabilities, rng)
    }

    fn update(&mut self, state: &AgentState, _arm: usize, _reward: f64) {
        // Ties go to the lowest index.
        let best = state
            .means()
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv { (i, v) } else { (bi, bv) }
            })
            .0;

        for (i, p) in self.probabilities.iter_mut().enumerate() {
            if i == best {
                *p += self.beta * (1.0 - *p);
            } else {
                *p -= self.beta * *p;
            }
        }
    }
}
