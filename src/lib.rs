//! Mablane: a Rust library for simulating multi-armed bandit strategies.
//!
//! An [`Agent`] plays a fixed set of arms for a number of trials, asking a
//! [`Policy`] which arm to pull next and keeping running statistics for every
//! arm. Fifteen strategies are provided, from epsilon-greedy and the UCB
//! family to Exp3, softmax-style selection and Bayesian sampling.
//!
//! # Quick Start
//!
//! ```
//! use mablane::Agent;
//! use mablane::arm::BinomialArm;
//! use mablane::policies::ThompsonSampling;
//! use rand::SeedableRng;
//!
//! let arms = vec![
//!     BinomialArm::new(0.1, 1).unwrap(),
//!     BinomialArm::new(0.5, 1).unwrap(),
//!     BinomialArm::new(0.7, 1).unwrap(),
//! ];
//! let mut agent = Agent::new(arms, ThompsonSampling::default()).unwrap();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let average = agent.run(1_000, &mut rng).unwrap();
//!
//! assert!(average > 0.5);
//! assert_eq!(agent.state().plays().iter().sum::<u64>(), 1_000);
//! ```
//!
//! Strategies can also be picked at runtime from a serde configuration, see
//! [`config`].

pub mod agent;
pub mod arm;
pub mod config;
mod error;
pub mod policies;
mod policy;
pub mod simulation;
pub mod state;
pub mod stats;

// Re-export main types
pub use agent::Agent;
pub use error::{BanditError, Result};
pub use policy::{
    LOG_EPSILON, Policy, argmax_random_tie, safe_ln, sample_categorical, score_or_mean, softmax,
};
pub use state::{AgentState, Exploration, Trial};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use mablane::prelude::*;
///
/// let policy: Box<dyn Policy> = Box::new(Ucb1::new());
/// assert_eq!(policy.name(), "ucb1");
/// ```
pub mod prelude {
    pub use crate::arm::{Arm, BinomialArm, FixedArm, NegativeBinomialArm};
    pub use crate::config::{ArmConfig, SimulationConfig, StrategyConfig};
    pub use crate::policies::{
        BayesUcb, CpUcb, EpsilonGreedy, Exp3, IntervalMethod, KlUcb, Moss, Pursuit,
        ReinforcementComparison, Softmax, ThompsonSampling, Ucb1, Ucb1Tuned, Ucb2, UcbNormal, UcbV,
    };
    pub use crate::simulation::{StrategyReport, simulate};
    pub use crate::{Agent, AgentState, BanditError, Policy, Result, Trial};
}
