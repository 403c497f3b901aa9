//! Repeated, seeded simulation runs with aggregated results.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

use crate::agent::Agent;
use crate::config::{SimulationConfig, StrategyConfig};
use crate::error::Result;
use crate::policy::Policy;

/// Aggregated outcome of one strategy over every repetition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyReport {
    /// Policy name, e.g. `"ucb1-tuned"`.
    pub strategy: String,
    pub repetitions: usize,
    pub episodes: usize,
    /// Average reward per trial, averaged over repetitions.
    pub mean_average_reward: f64,
    /// Total expected regret per run, averaged over repetitions. Absent when
    /// an arm has no known expected reward.
    pub mean_expected_regret: Option<f64>,
    /// Fraction of all trials spent on each arm.
    pub play_share: Vec<f64>,
}

/// Runs every configured strategy and reports them in configuration order.
pub fn simulate(config: &SimulationConfig) -> Result<Vec<StrategyReport>> {
    config.validate()?;
    config
        .strategies
        .iter()
        .map(|strategy| simulate_strategy(config, strategy))
        .collect()
}

/// Runs one strategy `config.repetitions` times.
///
/// Repetition `r` gets fresh arms, a fresh policy and an `StdRng` seeded
/// with `config.seed + r`, so two strategies see the same seeds.
pub fn simulate_strategy(
    config: &SimulationConfig,
    strategy: &StrategyConfig,
) -> Result<StrategyReport> {
    let mut reward_total = 0.0;
    let mut regret_total = Some(0.0);
    let mut plays = vec![0u64; config.arms.len()];
    let mut name = strategy.tag();

    for repetition in 0..config.repetitions {
        let mut agent = Agent::new(config.build_arms()?, strategy.build()?)?;
        name = agent.policy().name();

        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(repetition as u64));
        reward_total += agent.run(config.episodes, &mut rng)?;
        regret_total = regret_total.zip(agent.expected_regret()).map(|(a, b)| a + b);

        // Pseudo-plays from initial estimates are not trials.
        let start = u64::from(agent.policy().initial_estimates().is_some());
        for (total, &count) in plays.iter_mut().zip(agent.state().plays()) {
            *total += count - start;
        }
    }

    let runs = config.repetitions as f64;
    let trials = plays.iter().sum::<u64>() as f64;
    let report = StrategyReport {
        strategy: name.to_string(),
        repetitions: config.repetitions,
        episodes: config.episodes,
        mean_average_reward: reward_total / runs,
        mean_expected_regret: regret_total.map(|r| r / runs),
        play_share: plays.iter().map(|&p| p as f64 / trials).collect(),
    };

    info!(
        strategy = %report.strategy,
        mean_average_reward = report.mean_average_reward,
        mean_expected_regret = ?report.mean_expected_regret,
        "strategy simulated"
    );
    Ok(report)
}
