//! Mablane CLI
//!
//! Runs bandit strategies against a set of arms and reports how they compare.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mablane::config::{ArmConfig, SimulationConfig, StrategyConfig};
use mablane::simulation::{StrategyReport, simulate};

#[derive(Parser)]
#[command(name = "mablane")]
#[command(version, about = "Multi-armed bandit strategy simulator", long_about = None)]
struct Cli {
    /// JSON simulation config; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trials per run
    #[arg(long)]
    episodes: Option<usize>,

    /// Seed of the first repetition
    #[arg(long)]
    seed: Option<u64>,

    /// Independent runs per strategy
    #[arg(long)]
    repetitions: Option<usize>,

    /// Success probabilities of Bernoulli arms, comma separated
    #[arg(long, value_delimiter = ',')]
    probabilities: Vec<f64>,

    /// Strategy to run (repeatable); all strategies when omitted
    #[arg(long = "strategy")]
    strategies: Vec<String>,

    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

const DEFAULT_PROBABILITIES: [f64; 4] = [0.1, 0.3, 0.5, 0.7];

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                SimulationConfig::from_json(&json)
                    .with_context(|| format!("failed to load {}", path.display()))?
            }
            None => SimulationConfig {
                arms: bernoulli_arms(&DEFAULT_PROBABILITIES),
                strategies: StrategyConfig::all(),
                episodes: 1_000,
                repetitions: 1,
                seed: 0,
            },
        };

        if !self.probabilities.is_empty() {
            config.arms = bernoulli_arms(&self.probabilities);
        }
        if !self.strategies.is_empty() {
            config.strategies = self
                .strategies
                .iter()
                .map(|name| name.parse::<StrategyConfig>())
                .collect::<mablane::Result<_>>()?;
        }
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(repetitions) = self.repetitions {
            config.repetitions = repetitions;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        config.validate().context("invalid simulation config")?;
        Ok(config)
    }
}

fn bernoulli_arms(probabilities: &[f64]) -> Vec<ArmConfig> {
    probabilities
        .iter()
        .map(|&probability| ArmConfig::Binomial {
            probability,
            number: 1,
        })
        .collect()
}

fn print_table(reports: &[StrategyReport]) {
    println!(
        "{:<26} {:>12} {:>12}  play share",
        "strategy", "avg reward", "regret"
    );
    for report in reports {
        let regret = report
            .mean_expected_regret
            .map_or_else(|| "-".to_string(), |r| format!("{r:.2}"));
        let shares: Vec<String> = report
            .play_share
            .iter()
            .map(|s| format!("{:.3}", s))
            .collect();
        println!(
            "{:<26} {:>12.4} {:>12}  [{}]",
            report.strategy,
            report.mean_average_reward,
            regret,
            shares.join(", ")
        );
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.simulation_config()?;

    tracing::info!(
        arms = config.arms.len(),
        strategies = config.strategies.len(),
        episodes = config.episodes,
        repetitions = config.repetitions,
        seed = config.seed,
        "starting simulation"
    );

    let reports = simulate(&config)?;
    if reports.is_empty() {
        bail!("no strategies were run");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_table(&reports);
    }

    Ok(())
}
