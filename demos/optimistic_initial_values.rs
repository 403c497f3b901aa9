//! Optimistic initial values versus epsilon exploration.
//!
//! A purely greedy agent that starts with estimates far above any real
//! reward still tries every arm, because each play pulls that arm's
//! estimate down below the untouched ones.

use mablane::Agent;
use mablane::arm::BinomialArm;
use mablane::policies::EpsilonGreedy;
use rand::SeedableRng;

const PROBABILITIES: [f64; 5] = [0.2, 0.4, 0.5, 0.6, 0.9];
const RUNS: u64 = 200;
const EPISODES: usize = 500;

fn arms() -> Vec<BinomialArm> {
    PROBABILITIES
        .iter()
        .map(|&p| BinomialArm::new(p, 1).unwrap())
        .collect()
}

fn evaluate(label: &str, make_policy: impl Fn() -> EpsilonGreedy) {
    let mut total = 0.0;
    let mut best_share = 0.0;

    for seed in 0..RUNS {
        let mut agent = Agent::new(arms(), make_policy()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        total += agent.run(EPISODES, &mut rng).unwrap();

        let best = agent.history().iter().filter(|t| t.arm == 4).count();
        best_share += best as f64 / EPISODES as f64;
    }

    println!(
        "{:<32} average reward {:.3}, best arm share {:.1}%",
        label,
        total / RUNS as f64,
        100.0 * best_share / RUNS as f64
    );
}

fn main() {
    println!("Optimistic initial values ({RUNS} runs of {EPISODES} trials)\n");

    evaluate("greedy, realistic start", || {
        EpsilonGreedy::new(0.0, 1.0).unwrap()
    });
    evaluate("greedy, optimistic start (5.0)", || {
        EpsilonGreedy::new(0.0, 1.0)
            .unwrap()
            .with_initial_estimates(vec![5.0; PROBABILITIES.len()])
            .unwrap()
    });
    evaluate("epsilon 0.1, realistic start", || {
        EpsilonGreedy::new(0.1, 1.0).unwrap()
    });
    evaluate("epsilon 0.1 decaying by 0.99", || {
        EpsilonGreedy::new(0.1, 0.99).unwrap()
    });
}
