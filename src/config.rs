//! Serde-driven configuration for strategies, arms and whole simulations.
//!
//! Every hyperparameter that is left out takes its documented default, so
//! `{"strategy": "ucb_v"}` is a complete strategy description.
//!
//! ```
//! use mablane::config::SimulationConfig;
//!
//! let config = SimulationConfig::from_json(
//!     r#"{
//!         "arms": [
//!             {"kind": "binomial", "probability": 0.2},
//!             {"kind": "binomial", "probability": 0.6}
//!         ],
//!         "strategies": [
//!             {"strategy": "epsilon_greedy", "epsilon": 0.1},
//!             {"strategy": "bayes_ucb"}
//!         ],
//!         "episodes": 200
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.strategies.len(), 2);
//! assert_eq!(config.repetitions, 1);
//! let policy = config.strategies[1].build().unwrap();
//! assert_eq!(policy.name(), "bayes-ucb");
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arm::{Arm, BinomialArm, FixedArm, NegativeBinomialArm};
use crate::error::{BanditError, Result};
use crate::policies::{
    BayesUcb, CpUcb, EpsilonGreedy, Exp3, IntervalMethod, KlUcb, Moss, Pursuit,
    ReinforcementComparison, Softmax, ThompsonSampling, Ucb1, Ucb1Tuned, Ucb2, UcbNormal, UcbV,
};
use crate::policy::Policy;

/// Configuration tag of every strategy, in presentation order.
pub const STRATEGY_NAMES: [&str; 15] = [
    "epsilon_greedy",
    "exp3",
    "ucb1",
    "ucb2",
    "ucb1_tuned",
    "ucb_normal",
    "ucb_v",
    "moss",
    "kl_ucb",
    "cp_ucb",
    "softmax",
    "pursuit",
    "reinforcement_comparison",
    "thompson_sampling",
    "bayes_ucb",
];

/// A strategy and its hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    EpsilonGreedy {
        #[serde(default = "default_epsilon")]
        epsilon: f64,
        #[serde(default = "default_one")]
        decay: f64,
        /// Optimistic starting estimates, one per arm.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial: Option<Vec<f64>>,
    },
    Exp3 {
        #[serde(default = "default_exp3_gamma")]
        gamma: f64,
    },
    Ucb1,
    Ucb2 {
        #[serde(default = "default_ucb2_alpha")]
        alpha: f64,
    },
    Ucb1Tuned,
    UcbNormal,
    UcbV {
        #[serde(default = "default_ucbv_b")]
        b: f64,
    },
    Moss,
    KlUcb {
        #[serde(default = "default_one")]
        n: f64,
        #[serde(default)]
        c: f64,
    },
    CpUcb {
        #[serde(default = "default_one")]
        c: f64,
        #[serde(default)]
        method: IntervalMethod,
    },
    Softmax {
        #[serde(default = "default_tau")]
        tau: f64,
    },
    Pursuit {
        #[serde(default = "default_pursuit_beta")]
        beta: f64,
    },
    ReinforcementComparison {
        #[serde(default = "default_rc_alpha")]
        alpha: f64,
        #[serde(default = "default_rc_beta")]
        beta: f64,
    },
    ThompsonSampling {
        #[serde(default = "default_one")]
        n: f64,
    },
    BayesUcb {
        #[serde(default = "default_one")]
        n: f64,
        #[serde(default = "default_bayes_gamma")]
        gamma: f64,
    },
}

fn default_one() -> f64 {
    1.0
}

fn default_epsilon() -> f64 {
    0.05
}

fn default_exp3_gamma() -> f64 {
    0.05
}

fn default_ucb2_alpha() -> f64 {
    0.1
}

fn default_ucbv_b() -> f64 {
    3.0
}

fn default_tau() -> f64 {
    0.01
}

fn default_pursuit_beta() -> f64 {
    0.01
}

fn default_rc_alpha() -> f64 {
    0.001
}

fn default_rc_beta() -> f64 {
    0.1
}

fn default_bayes_gamma() -> f64 {
    3.0
}

impl StrategyConfig {
    /// Default configuration of every strategy.
    pub fn all() -> Vec<StrategyConfig> {
        STRATEGY_NAMES
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }

    /// The configuration tag, e.g. `"kl_ucb"`.
    pub fn tag(&self) -> &'static str {
        match self {
            StrategyConfig::EpsilonGreedy { .. } => "epsilon_greedy",
            StrategyConfig::Exp3 { .. } => "exp3",
            StrategyConfig::Ucb1 => "ucb1",
            StrategyConfig::Ucb2 { .. } => "ucb2",
            StrategyConfig::Ucb1Tuned => "ucb1_tuned",
            StrategyConfig::UcbNormal => "ucb_normal",
            StrategyConfig::UcbV { .. } => "ucb_v",
            StrategyConfig::Moss => "moss",
            StrategyConfig::KlUcb { .. } => "kl_ucb",
            StrategyConfig::CpUcb { .. } => "cp_ucb",
            StrategyConfig::Softmax { .. } => "softmax",
            StrategyConfig::Pursuit { .. } => "pursuit",
            StrategyConfig::ReinforcementComparison { .. } => "reinforcement_comparison",
            StrategyConfig::ThompsonSampling { .. } => "thompson_sampling",
            StrategyConfig::BayesUcb { .. } => "bayes_ucb",
        }
    }

    /// Builds the policy, validating every hyperparameter.
    pub fn build(&self) -> Result<Box<dyn Policy>> {
        let policy: Box<dyn Policy> = match self {
            StrategyConfig::EpsilonGreedy {
                epsilon,
                decay,
                initial,
            } => {
                let policy = EpsilonGreedy::new(*epsilon, *decay)?;
                match initial {
                    Some(initial) => Box::new(policy.with_initial_estimates(initial.clone())?),
                    None => Box::new(policy),
                }
            }
            StrategyConfig::Exp3 { gamma } => Box::new(Exp3::new(*gamma)?),
            StrategyConfig::Ucb1 => Box::new(Ucb1::new()),
            StrategyConfig::Ucb2 { alpha } => Box::new(Ucb2::new(*alpha)?),
            StrategyConfig::Ucb1Tuned => Box::new(Ucb1Tuned::new()),
            StrategyConfig::UcbNormal => Box::new(UcbNormal::new()),
            StrategyConfig::UcbV { b } => Box::new(UcbV::new(*b)?),
            StrategyConfig::Moss => Box::new(Moss::new()),
            StrategyConfig::KlUcb { n, c } => Box::new(KlUcb::new(*n, *c)?),
            StrategyConfig::CpUcb { c, method } => Box::new(CpUcb::new(*c, *method)?),
            StrategyConfig::Softmax { tau } => Box::new(Softmax::new(*tau)?),
            StrategyConfig::Pursuit { beta } => Box::new(Pursuit::new(*beta)?),
            StrategyConfig::ReinforcementComparison { alpha, beta } => {
                Box::new(ReinforcementComparison::new(*alpha, *beta)?)
            }
            StrategyConfig::ThompsonSampling { n } => Box::new(ThompsonSampling::new(*n)?),
            StrategyConfig::BayesUcb { n, gamma } => Box::new(BayesUcb::new(*n, *gamma)?),
        };
        Ok(policy)
    }
}

impl FromStr for StrategyConfig {
    type Err = BanditError;

    /// Parses a strategy name into its default configuration. Hyphens and
    /// underscores are interchangeable, so policy names such as `"ucb1-tuned"`
    /// are accepted too.
    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase().replace('-', "_");
        serde_json::from_value(serde_json::json!({ "strategy": tag })).map_err(|_| {
            BanditError::Unknown {
                kind: "strategy",
                name: s.to_string(),
            }
        })
    }
}

/// A reward source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArmConfig {
    Binomial {
        probability: f64,
        #[serde(default = "default_number")]
        number: u64,
    },
    NegativeBinomial {
        probability: f64,
        #[serde(default = "default_number")]
        number: u64,
    },
    Fixed {
        reward: f64,
    },
}

fn default_number() -> u64 {
    1
}

impl ArmConfig {
    pub fn build(&self) -> Result<Box<dyn Arm>> {
        let arm: Box<dyn Arm> = match *self {
            ArmConfig::Binomial {
                probability,
                number,
            } => Box::new(BinomialArm::new(probability, number)?),
            ArmConfig::NegativeBinomial {
                probability,
                number,
            } => Box::new(NegativeBinomialArm::new(probability, number)?),
            ArmConfig::Fixed { reward } => Box::new(FixedArm(reward)),
        };
        Ok(arm)
    }
}

/// Arms, strategies and run lengths for a batch of simulations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub arms: Vec<ArmConfig>,
    /// Strategies to compare; every strategy with defaults when omitted.
    #[serde(default = "StrategyConfig::all")]
    pub strategies: Vec<StrategyConfig>,
    /// Trials per run.
    #[serde(default = "default_episodes")]
    pub episodes: usize,
    /// Independent runs per strategy, each with its own seed.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    /// Seed of the first repetition; repetition `r` uses `seed + r`.
    #[serde(default)]
    pub seed: u64,
}

fn default_episodes() -> usize {
    1_000
}

fn default_repetitions() -> usize {
    1
}

impl SimulationConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig =
            serde_json::from_str(json).map_err(|err| BanditError::Config {
                message: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks run lengths and arm presence, and that every arm and strategy
    /// can be built.
    pub fn validate(&self) -> Result<()> {
        if self.arms.is_empty() {
            return Err(BanditError::NoArmsAvailable);
        }
        if self.episodes == 0 {
            return Err(BanditError::invalid("episodes must be positive"));
        }
        if self.repetitions == 0 {
            return Err(BanditError::invalid("repetitions must be positive"));
        }
        if self.strategies.is_empty() {
            return Err(BanditError::Config {
                message: "no strategies configured".to_string(),
            });
        }
        for arm in &self.arms {
            arm.build()?;
        }
        for strategy in &self.strategies {
            strategy.build()?;
        }
        Ok(())
    }

    /// Fresh arms for one run.
    pub fn build_arms(&self) -> Result<Vec<Box<dyn Arm>>> {
        self.arms.iter().map(ArmConfig::build).collect()
    }
}
