//! Per-arm statistics shared by every strategy.

/// One played trial: which arm was pulled and what it paid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trial {
    pub arm: usize,
    pub reward: f64,
}

/// Epsilon schedule for strategies with an explicit explore/exploit split.
///
/// After `n` decays the rate equals `initial * decay^n`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exploration {
    initial: f64,
    rate: f64,
    decay: f64,
    steps: u64,
}

impl Exploration {
    pub fn new(initial: f64, decay: f64) -> Self {
        Self {
            initial,
            rate: initial,
            decay,
            steps: 0,
        }
    }

    /// Current exploration probability.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn decay_factor(&self) -> f64 {
        self.decay
    }

    /// Number of decays applied so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn decay(&mut self) {
        self.rate *= self.decay;
        self.steps += 1;
    }
}

/// Statistics the agent keeps for every arm plus the reward history.
///
/// All per-arm vectors have one entry per arm and share the same indexing.
/// The state is only mutated by the owning [`Agent`](crate::Agent); strategies
/// receive it by shared reference.
#[derive(Clone, Debug)]
pub struct AgentState {
    plays: Vec<u64>,
    means: Vec<f64>,
    history: Vec<Trial>,
    exploration: Option<Exploration>,
}

impl AgentState {
    /// Fresh state for `num_arms` arms with no plays.
    pub fn new(num_arms: usize) -> Self {
        Self {
            plays: vec![0; num_arms],
            means: vec![0.0; num_arms],
            history: Vec::new(),
            exploration: None,
        }
    }

    /// Seeds every arm with one pseudo-play at the given mean estimate.
    pub(crate) fn with_initial_estimates(mut self, estimates: &[f64]) -> Self {
        debug_assert_eq!(estimates.len(), self.plays.len());
        self.plays.iter_mut().for_each(|n| *n = 1);
        self.means.copy_from_slice(estimates);
        self
    }

    pub(crate) fn with_exploration(mut self, exploration: Option<Exploration>) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn num_arms(&self) -> usize {
        self.plays.len()
    }

    /// Number of trials run so far.
    pub fn total_trials(&self) -> usize {
        self.history.len()
    }

    pub fn plays(&self) -> &[u64] {
        &self.plays
    }

    pub fn play_count(&self, arm: usize) -> u64 {
        self.plays[arm]
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn mean(&self, arm: usize) -> f64 {
        self.means[arm]
    }

    pub fn history(&self) -> &[Trial] {
        &self.history
    }

    /// Rewards in the order they were observed.
    pub fn rewards(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().map(|t| t.reward)
    }

    pub fn exploration(&self) -> Option<&Exploration> {
        self.exploration.as_ref()
    }

    /// Current exploration probability, if the strategy uses one.
    pub fn exploration_rate(&self) -> Option<f64> {
        self.exploration.map(|e| e.rate())
    }

    /// The arm a cold-start strategy must play next, if any.
    ///
    /// While fewer trials than arms have been run and the arm at index
    /// `total_trials` has never been played, that arm is forced, so every arm
    /// is played once in index order before any ratio over play counts is
    /// evaluated.
    pub fn cold_start_arm(&self) -> Option<usize> {
        let t = self.total_trials();
        (t < self.num_arms() && self.plays[t] == 0).then_some(t)
    }

    /// Average of every reward observed so far, or `None` before the first trial.
    pub fn average_reward(&self) -> Option<f64> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.rewards().sum::<f64>() / self.history.len() as f64)
        }
    }

    /// Folds one observation into the play count and running mean.
    pub(crate) fn record(&mut self, arm: usize, reward: f64) {
        self.plays[arm] += 1;
        let n = self.plays[arm] as f64;
        self.means[arm] += (reward - self.means[arm]) / n;
        self.history.push(Trial { arm, reward });
    }

    pub(crate) fn decay_exploration(&mut self) {
        if let Some(exploration) = self.exploration.as_mut() {
            exploration.decay();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_record_updates_running_mean() {
        let mut state = AgentState::new(2);
        state.record(0, 1.0);
        state.record(0, 0.0);
        state.record(0, 0.5);
        state.record(1, 2.0);

        assert_eq!(state.plays(), &[3, 1]);
        assert_abs_diff_eq!(state.mean(0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(state.mean(1), 2.0, epsilon = 1e-12);
        assert_eq!(state.total_trials(), 4);
        assert_abs_diff_eq!(state.average_reward().unwrap(), 0.875, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_history_has_no_average() {
        let state = AgentState::new(3);
        assert_eq!(state.average_reward(), None);
    }

    #[test]
    fn test_cold_start_arm_walks_in_index_order() {
        let mut state = AgentState::new(3);
        for expected in 0..3 {
            assert_eq!(state.cold_start_arm(), Some(expected));
            state.record(expected, 1.0);
        }
        assert_eq!(state.cold_start_arm(), None);
    }

    #[test]
    fn test_initial_estimates_skip_cold_start() {
        let state = AgentState::new(2).with_initial_estimates(&[5.0, 4.0]);
        assert_eq!(state.plays(), &[1, 1]);
        assert_eq!(state.means(), &[5.0, 4.0]);
        assert_eq!(state.cold_start_arm(), None);
    }

    #[test]
    fn test_exploration_decay() {
        let mut state = AgentState::new(2).with_exploration(Some(Exploration::new(0.5, 0.9)));
        for _ in 0..3 {
            state.decay_exploration();
        }
        let exploration = state.exploration().unwrap();
        assert_eq!(exploration.steps(), 3);
        assert_abs_diff_eq!(exploration.rate(), 0.5 * 0.9_f64.powi(3), epsilon = 1e-12);
    }
}
