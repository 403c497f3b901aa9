use rand::RngCore;

use crate::error::{Result, check_positive};
use crate::policy::{Policy, sample_categorical, softmax};
use crate::state::AgentState;

/// Boltzmann exploration: arm `i` is drawn with probability proportional to
/// `exp(mean[i] / tau)`.
///
/// Small temperatures approach greedy selection, large ones approach uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Softmax {
    tau: f64,
}

impl Softmax {
    /// Creates a softmax policy with temperature `tau > 0`.
    pub fn new(tau: f64) -> Result<Self> {
        check_positive("tau", tau)?;
        Ok(Self { tau })
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Selection distribution over the arms for the current means.
    pub fn probabilities(&self, state: &AgentState) -> Vec<f64> {
        softmax(state.means().iter().map(|m| m / self.tau))
    }
}

impl Default for Softmax {
    fn default() -> Self {
        Self { tau: 0.01 }
    }
}

impl Policy for Softmax {
    fn name(&self) -> &'static str {
        "softmax"
    }

    fn init(&mut self, _num_arms: usize) -> Result<()> {
        Ok(())
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        sample_categorical(&self.probabilities(state), rng)
    }
}
