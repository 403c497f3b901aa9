use rand::{Rng, RngCore};

use crate::error::{BanditError, Result, check_range};
use crate::policy::{Policy, argmax_random_tie, check_len};
use crate::state::{AgentState, Exploration};

/// Epsilon-greedy policy - explores with probability epsilon, exploits otherwise.
///
/// The exploration probability starts at `epsilon` and is multiplied by
/// `decay` after every selection. Exploitation picks uniformly among all arms
/// tied for the best running mean.
///
/// With [`EpsilonGreedy::with_initial_estimates`] every arm starts with one
/// pseudo-play at the given estimate and the exploration rate starts at zero,
/// so exploration comes purely from optimism.
#[derive(Clone, Debug, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
    decay: f64,
    initial: Option<Vec<f64>>,
}

impl EpsilonGreedy {
    /// Creates a new epsilon-greedy policy.
    ///
    /// Both `epsilon` and `decay` must be in `[0, 1]`.
    pub fn new(epsilon: f64, decay: f64) -> Result<Self> {
        check_range("epsilon", epsilon, 0.0, 1.0)?;
        check_range("decay", decay, 0.0, 1.0)?;
        Ok(Self {
            epsilon,
            decay,
            initial: None,
        })
    }

    /// Starts every arm from an optimistic estimate instead of zero.
    pub fn with_initial_estimates(mut self, initial: Vec<f64>) -> Result<Self> {
        if let Some(bad) = initial.iter().find(|v| !v.is_finite()) {
            return Err(BanditError::invalid(format!(
                "initial estimates must be finite, got {bad}"
            )));
        }
        self.initial = Some(initial);
        Ok(self)
    }

    /// Gets the configured starting epsilon.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Gets the per-selection decay factor.
    pub fn decay(&self) -> f64 {
        self.decay
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            epsilon: 0.05,
            decay: 1.0,
            initial: None,
        }
    }
}

impl Policy for EpsilonGreedy {
    fn name(&self) -> &'static str {
        "epsilon-greedy"
    }

    fn init(&mut self, num_arms: usize) -> Result<()> {
        match &self.initial {
            Some(initial) => check_len("initial estimates", initial.len(), num_arms),
            None => Ok(()),
        }
    }

    fn select(&self, state: &AgentState, rng: &mut dyn RngCore) -> usize {
        if let Some(arm) = state.cold_start_arm() {
            return arm;
        }

        let rate = state.exploration_rate().unwrap_or(self.epsilon);
        let r: f64 = rng.random_range(0.0..1.0);
        if r < rate {
            rng.random_range(0..state.num_arms())
        } else {
            argmax_random_tie(state.means(), rng)
        }
    }

    fn exploration(&self) -> Option<Exploration> {
        let start = if self.initial.is_some() {
            0.0
        } else {
            self.epsilon
        };
        Some(Exploration::new(start, self.decay))
    }

    fn initial_estimates(&self) -> Option<&[f64]> {
        self.initial.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Agent;
    use crate::arm::FixedArm;
    use rand::SeedableRng;

    fn played(num_arms: usize, plays: &[(usize, f64)]) -> AgentState {
        let mut state = AgentState::new(num_arms)
            .with_exploration(Some(Exploration::new(0.0, 1.0)));
        for &(arm, reward) in plays {
            state.record(arm, reward);
        }
        state
    }

    #[test]
    fn test_epsilon_greedy_pure_exploitation() {
        let policy = EpsilonGreedy::new(0.0, 1.0).unwrap();
        let state = played(3, &[(0, 0.5), (1, 1.0), (2, 0.3), (1, 0.8)]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        // Should always pick arm 1 (highest average reward)
        for _ in 0..10 {
            assert_eq!(policy.select(&state, &mut rng), 1);
        }
    }

    #[test]
    fn test_epsilon_greedy_pure_exploration() {
        let policy = EpsilonGreedy::new(1.0, 1.0).unwrap();
        let mut state = AgentState::new(3).with_exploration(policy.exploration());
        for arm in 0..3 {
            state.record(arm, arm as f64);
        }
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            counts[policy.select(&state, &mut rng)] += 1;
        }
        for c in counts {
            assert!((c as f64 / 3000.0 - 1.0 / 3.0).abs() < 0.05);
        }
    }

    #[test]
    fn test_epsilon_greedy_breaks_ties_randomly() {
        let policy = EpsilonGreedy::new(0.0, 1.0).unwrap();
        let state = played(3, &[(0, 1.0), (1, 1.0), (2, 0.0)]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        let mut seen = [false; 3];
        for _ in 0..100 {
            seen[policy.select(&state, &mut rng)] = true;
        }
        assert_eq!(seen, [true, true, false]);
    }

    #[test]
    fn test_initial_estimates_disable_epsilon() {
        let policy = EpsilonGreedy::new(0.5, 1.0)
            .unwrap()
            .with_initial_estimates(vec![5.0, 5.0])
            .unwrap();
        assert_eq!(policy.exploration().unwrap().rate(), 0.0);

        let mut agent = Agent::new(vec![FixedArm(1.0), FixedArm(0.0)], policy).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        agent.run(20, &mut rng).unwrap();

        // Optimism forces both arms to be tried, then the better one wins.
        assert!(agent.state().play_count(0) > agent.state().play_count(1));
        assert!(agent.state().play_count(1) >= 2);
    }

    #[test]
    fn test_initial_estimates_length_mismatch() {
        let policy = EpsilonGreedy::default()
            .with_initial_estimates(vec![1.0, 2.0, 3.0])
            .unwrap();
        let result = Agent::new(vec![FixedArm(1.0), FixedArm(2.0)], policy);
        assert!(matches!(
            result,
            Err(BanditError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(EpsilonGreedy::new(-0.1, 1.0).is_err());
        assert!(EpsilonGreedy::new(1.1, 1.0).is_err());
        assert!(EpsilonGreedy::new(0.1, 1.5).is_err());
        assert!(
            EpsilonGreedy::default()
                .with_initial_estimates(vec![f64::NAN])
                .is_err()
        );
    }

    #[test]
    fn test_getters() {
        let policy = EpsilonGreedy::new(0.3, 0.99).unwrap();
        assert_eq!(policy.epsilon(), 0.3);
        assert_eq!(policy.decay(), 0.99);
        assert_eq!(EpsilonGreedy::default().epsilon(), 0.05);
    }
}
