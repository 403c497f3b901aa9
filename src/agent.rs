use rand::RngCore;
use tracing::{debug, trace};

use crate::arm::Arm;
use crate::error::{BanditError, Result};
use crate::policies::EpsilonGreedy;
use crate::policy::{Policy, check_len};
use crate::state::{AgentState, Trial};

/// A bandit agent: a set of arms, a selection policy and the statistics the
/// policy learns from.
///
/// The agent drives the simulation loop. Each trial asks the policy for an
/// arm, pulls it, folds the reward into the shared [`AgentState`], runs the
/// policy's update hook and decays the exploration rate.
///
/// # Examples
///
/// ```
/// use mablane::Agent;
/// use mablane::arm::BinomialArm;
/// use mablane::policies::Ucb1;
/// use rand::SeedableRng;
///
/// let arms = vec![
///     BinomialArm::new(0.2, 1).unwrap(),
///     BinomialArm::new(0.8, 1).unwrap(),
/// ];
/// let mut agent = Agent::new(arms, Ucb1::new()).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
///
/// let average = agent.run(500, &mut rng).unwrap();
/// assert!(average > 0.5);
/// assert_eq!(agent.history().len(), 500);
/// ```
#[derive(Clone, Debug)]
pub struct Agent<P, A> {
    arms: Vec<A>,
    policy: P,
    state: AgentState,
}

impl<P, A> Agent<P, A>
where
    P: Policy,
    A: Arm,
{
    /// Creates an agent over the given arms.
    ///
    /// Fails when there are no arms, or when the policy rejects the arm
    /// count (for example initial estimates of the wrong length).
    pub fn new<I>(arms: I, mut policy: P) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
    {
        let arms: Vec<A> = arms.into_iter().collect();

        if arms.is_empty() {
            return Err(BanditError::NoArmsAvailable);
        }

        policy.init(arms.len())?;

        let mut state = AgentState::new(arms.len()).with_exploration(policy.exploration());
        if let Some(estimates) = policy.initial_estimates() {
            check_len("initial estimates", estimates.len(), arms.len())?;
            state = state.with_initial_estimates(estimates);
        }

        debug!(
            strategy = policy.name(),
            arms = arms.len(),
            "created bandit agent"
        );

        Ok(Self {
            arms,
            policy,
            state,
        })
    }

    /// Runs `episodes` trials and returns the average reward over the whole
    /// history, including trials from earlier calls.
    pub fn run(&mut self, episodes: usize, rng: &mut dyn RngCore) -> Result<f64> {
        if episodes == 0 {
            return Err(BanditError::invalid("episodes must be positive"));
        }

        for _ in 0..episodes {
            self.step(rng);
        }

        let average = self
            .state
            .average_reward()
            .ok_or_else(|| BanditError::invalid("no trials recorded"))?;
        debug!(
            strategy = self.policy.name(),
            episodes,
            total_trials = self.state.total_trials(),
            average,
            "run finished"
        );
        Ok(average)
    }

    /// Plays a single trial and returns it.
    pub fn step(&mut self, rng: &mut dyn RngCore) -> Trial {
        let arm = self.select(rng);
        let reward = self.arms[arm].pull(rng);

        self.state.record(arm, reward);
        self.policy.update(&self.state, arm, reward);

        trace!(
            trial = self.state.total_trials(),
            arm,
            reward,
            "trial played"
        );
        Trial { arm, reward }
    }

    /// Asks the policy for the next arm and decays the exploration rate.
    ///
    /// Does not pull the arm.
    pub fn select(&mut self, rng: &mut dyn RngCore) -> usize {
        let arm = self.policy.select(&self.state, rng);
        self.state.decay_exploration();
        arm
    }
}

impl<P, A> Agent<P, A> {
    /// Average of every reward seen so far, or `None` before the first trial.
    pub fn average_reward(&self) -> Option<f64> {
        self.state.average_reward()
    }

    /// Every trial in the order it was played.
    pub fn history(&self) -> &[Trial] {
        self.state.history()
    }

    /// Running average after each trial, ready for plotting.
    pub fn cumulative_average(&self) -> Vec<f64> {
        self.state
            .rewards()
            .scan(0.0, |sum, reward| {
                *sum += reward;
                Some(*sum)
            })
            .enumerate()
            .map(|(i, sum)| sum / (i + 1) as f64)
            .collect()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn arms(&self) -> &[A] {
        &self.arms
    }

    pub fn num_arms(&self) -> usize {
        self.arms.len()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<P, A: Arm> Agent<P, A> {
    /// Total expected regret of the trials played so far: the sum over trials
    /// of the best expected reward minus the expected reward of the arm played.
    ///
    /// `None` when any arm does not expose its expected reward.
    pub fn expected_regret(&self) -> Option<f64> {
        let expected: Vec<f64> = self
            .arms
            .iter()
            .map(|a| a.expected_reward())
            .collect::<Option<_>>()?;
        let best = expected.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(
            self.state
                .history()
                .iter()
                .map(|t| best - expected[t.arm])
                .sum(),
        )
    }
}

impl<A: Arm> Agent<EpsilonGreedy, A> {
    /// Creates an epsilon-greedy agent with no decay.
    pub fn epsilon_greedy<I>(arms: I, epsilon: f64) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
    {
        Self::new(arms, EpsilonGreedy::new(epsilon, 1.0)?)
    }
}
