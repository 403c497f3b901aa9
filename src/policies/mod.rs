//! Arm-selection strategies.
//!
//! Every strategy implements [`Policy`](crate::Policy) and can be driven by
//! an [`Agent`](crate::Agent), either directly or boxed as `Box<dyn Policy>`.

mod cp_ucb;
mod epsilon_greedy;
mod exp3;
mod kl_ucb;
mod moss;
mod pursuit;
mod reinforcement_comparison;
mod softmax;
mod thompson;
mod ucb;
mod ucb_normal;
mod ucbv;

pub use cp_ucb::{CpUcb, IntervalMethod, proportion_interval};
pub use epsilon_greedy::EpsilonGreedy;
pub use exp3::Exp3;
pub use kl_ucb::{KL_EPSILON, KlUcb, kl_bernoulli};
pub use moss::Moss;
pub use pursuit::Pursuit;
pub use reinforcement_comparison::ReinforcementComparison;
pub use softmax::Softmax;
pub use thompson::{BayesUcb, ThompsonSampling};
pub use ucb::{Ucb1, Ucb1Tuned, Ucb2};
pub use ucb_normal::UcbNormal;
pub use ucbv::UcbV;
