//! Tabular Q-learning agent
//!
//! The agent owns an [`ActionValueTable`] and two fixed hyperparameters. It
//! explores by sampling uniformly, exploits by resolving the best action with
//! random tie-breaking, and learns with the one-step Q-learning update.

use std::{borrow::Cow, fmt::Write as _};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Result,
    agents::AgentKind,
    config::Hyperparameters,
    ports::Agent,
    q_learning::{q_table::ActionValueTable, serialization::AgentState},
    types::{ActionIndex, ActionSpace, Observation},
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent (off-policy TD control)
///
/// Learns Q* by always updating toward the maximum next-state value,
/// regardless of which action the caller actually takes next.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    action_space: ActionSpace,
    table: ActionValueTable,
    params: Hyperparameters,
    rng: StdRng,
}

impl QLearningAgent {
    /// Create an agent with an empty table.
    ///
    /// # Arguments
    ///
    /// * `action_space` - Discrete action space; fixes the row length
    /// * `params` - Learning rate α and discount factor γ
    pub fn new(action_space: ActionSpace, params: Hyperparameters) -> Self {
        Self {
            action_space,
            table: ActionValueTable::new(action_space),
            params,
            rng: build_rng(None),
        }
    }

    /// Rebuild an agent around an existing table.
    pub fn from_table(
        action_space: ActionSpace,
        params: Hyperparameters,
        table: ActionValueTable,
    ) -> Self {
        debug_assert_eq!(table.n_actions(), action_space.size());
        Self {
            action_space,
            table,
            params,
            rng: build_rng(None),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        self.params
    }

    pub fn table(&self) -> &ActionValueTable {
        &self.table
    }

    /// Current action values for `observation` (all zero if never seen)
    pub fn q_values(&self, observation: &Observation) -> Cow<'_, [f64]> {
        self.table.values(observation)
    }

    /// Best action and its value, ties broken uniformly at random
    pub fn best_action(&mut self, observation: &Observation) -> (ActionIndex, f64) {
        self.table.best_action(observation, &mut self.rng)
    }
}

impl Agent for QLearningAgent {
    fn explore(&mut self, _observation: &Observation) -> ActionIndex {
        self.action_space.sample(&mut self.rng)
    }

    fn act(&mut self, observation: &Observation) -> ActionIndex {
        let (action, _) = self.best_action(observation);
        action
    }

    /// Q(s,a) ← Q(s,a) + α · (r + γ · max_a' Q(s',a') − Q(s,a))
    fn learn(
        &mut self,
        prev_observation: &Observation,
        action: ActionIndex,
        next_observation: &Observation,
        reward: f64,
    ) -> Result<()> {
        let action = self.action_space.check(action)?;
        self.table.q_learning_update(
            &self.params,
            prev_observation,
            action,
            next_observation,
            reward,
            &mut self.rng,
        );
        Ok(())
    }

    fn kind(&self) -> AgentKind {
        AgentKind::QLearning
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    fn export_state(&self) -> AgentState {
        AgentState::QLearning {
            hyperparameters: self.params,
            table: self.table.to_rows(),
        }
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = build_rng(Some(seed));
    }

    fn describe(&self) -> String {
        let mut out = String::from("QLearning {\n");
        for (observation, values) in self.table.sorted_rows() {
            let formatted: Vec<String> = values.iter().map(|v| format!("{v:.4}")).collect();
            let _ = writeln!(out, "\t{observation}:\t[{}]", formatted.join(", "));
        }
        out.push('}');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(n: usize, alpha: f64, gamma: f64) -> QLearningAgent {
        QLearningAgent::new(
            ActionSpace::new(n).unwrap(),
            Hyperparameters::new(alpha, gamma).unwrap(),
        )
        .with_seed(7)
    }

    #[test]
    fn test_act_on_unseen_observation_returns_valid_action() {
        let mut agent = agent(4, 0.1, 0.9);
        let observation = Observation::Discrete(11);
        for _ in 0..50 {
            assert!(agent.act(&observation) < 4);
        }
        assert_eq!(agent.q_values(&observation).as_ref(), &[0.0; 4]);
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_learn_rejects_out_of_range_action_without_mutation() {
        let mut agent = agent(2, 0.5, 0.9);
        let s = Observation::Discrete(0);
        let result = agent.learn(&s, 2, &s, 1.0);
        assert!(matches!(
            result,
            Err(crate::Error::ActionOutOfRange { action: 2, n: 2 })
        ));
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_learn_materializes_both_rows() {
        let mut agent = agent(2, 0.5, 0.9);
        let s0 = Observation::Discrete(0);
        let s1 = Observation::Discrete(1);
        agent.learn(&s0, 0, &s1, 1.0).unwrap();
        assert!(agent.table().contains(&s0));
        assert!(agent.table().contains(&s1));
    }

    #[test]
    fn test_two_step_scenario() {
        let mut agent = agent(2, 0.5, 0.9);
        let s0 = Observation::Discrete(0);
        let s1 = Observation::Discrete(1);

        agent.learn(&s0, 0, &s1, 1.0).unwrap();
        agent.learn(&s1, 0, &s1, 0.0).unwrap();

        assert_eq!(agent.q_values(&s0).as_ref(), &[0.5, 0.0]);
        assert_eq!(agent.q_values(&s1).as_ref(), &[0.0, 0.0]);
    }

    #[test]
    fn test_explore_ignores_table() {
        let mut agent = agent(3, 1.0, 0.0);
        let s = Observation::Discrete(0);
        let terminal = Observation::Discrete(1);
        agent.learn(&s, 2, &terminal, 10.0).unwrap();

        let mut seen = [false; 3];
        for _ in 0..200 {
            seen[agent.explore(&s)] = true;
        }
        assert_eq!(seen, [true, true, true]);
        assert_eq!(agent.act(&s), 2);
    }

    #[test]
    fn test_describe_lists_rows() {
        let mut agent = agent(2, 0.5, 0.9);
        agent
            .learn(&Observation::Discrete(0), 1, &Observation::Discrete(1), 1.0)
            .unwrap();
        let text = agent.describe();
        assert!(text.starts_with("QLearning {"));
        assert!(text.contains("\t0:\t[0.0000, 0.5000]"));
        assert!(text.ends_with('}'));
    }
}
