//! Runs a batch of simulations described by a JSON document.

use mablane::config::SimulationConfig;
use mablane::simulation::simulate;

const CONFIG: &str = r#"{
    "arms": [
        {"kind": "binomial", "probability": 0.25, "number": 4},
        {"kind": "binomial", "probability": 0.5, "number": 2},
        {"kind": "negative_binomial", "probability": 0.6, "number": 1},
        {"kind": "fixed", "reward": 0.9}
    ],
    "strategies": [
        {"strategy": "epsilon_greedy", "epsilon": 0.2, "decay": 0.995},
        {"strategy": "ucb2", "alpha": 0.3},
        {"strategy": "ucb_v", "b": 4.0},
        {"strategy": "kl_ucb", "n": 4},
        {"strategy": "exp3", "gamma": 0.1},
        {"strategy": "thompson_sampling", "n": 4},
        {"strategy": "bayes_ucb", "n": 4, "gamma": 2.0}
    ],
    "episodes": 2000,
    "repetitions": 5,
    "seed": 100
}"#;

fn main() -> mablane::Result<()> {
    let config = SimulationConfig::from_json(CONFIG)?;
    println!(
        "{} arms, {} strategies, {} repetitions of {} trials\n",
        config.arms.len(),
        config.strategies.len(),
        config.repetitions,
        config.episodes
    );

    for report in simulate(&config)? {
        let shares: Vec<String> = report
            .play_share
            .iter()
            .map(|s| format!("{:.2}", s))
            .collect();
        println!(
            "{:<20} reward {:.3}  regret {:>8}  shares [{}]",
            report.strategy,
            report.mean_average_reward,
            report
                .mean_expected_regret
                .map_or_else(|| "-".to_string(), |r| format!("{r:.1}")),
            shares.join(", ")
        );
    }

    Ok(())
}
