use mablane::{Agent, Policy};
use mablane::arm::{Arm, BinomialArm};
use mablane::config::StrategyConfig;
use rand::SeedableRng;

fn main() {
    println!("Mablane: Multi-Armed Bandit Algorithm Comparison\n");
    println!("{}", "=".repeat(60));

    // True reward probabilities for each arm
    let probabilities = [0.3, 0.5, 0.8, 0.4];

    println!("True reward probabilities:");
    for (arm, p) in probabilities.iter().enumerate() {
        println!("  Arm {}: {:.2}", arm, p);
    }
    println!("\nBest arm: Arm 2 (0.80)\n");
    println!("{}", "=".repeat(60));

    for config in StrategyConfig::all() {
        let arms: Vec<Box<dyn Arm>> = probabilities
            .iter()
            .map(|&p| Box::new(BinomialArm::new(p, 1).unwrap()) as Box<dyn Arm>)
            .collect();
        let mut agent = Agent::new(arms, config.build().unwrap()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let average = agent.run(1_000, &mut rng).unwrap();

        let name = agent.policy().name();
        println!("\n{}", name);
        println!("{}", "-".repeat(name.len()));
        println!("  Average reward: {:.3}", average);
        if let Some(regret) = agent.expected_regret() {
            println!("  Expected regret: {:.1}", regret);
        }
        println!("  Arm selection counts:");
        for (arm, &count) in agent.state().plays().iter().enumerate() {
            println!(
                "    Arm {}: {} ({:.1}%)",
                arm,
                count,
                count as f64 / 10.0
            );
        }

        // Sample the learning curve at a few points
        let curve = agent.cumulative_average();
        let checkpoints: Vec<String> = [9, 99, 499, 999]
            .iter()
            .map(|&i| format!("{}: {:.3}", i + 1, curve[i]))
            .collect();
        println!("  Running average: {}", checkpoints.join(", "));
    }

    println!("\n{}", "=".repeat(60));
    println!("Simulation complete!");
}
