//! Common test utilities for the qlearn test suite.

#![allow(dead_code)]

use qlearn::{
    ActionSpace, Observation, QLearningAgent, config::Hyperparameters, ports::Agent,
    q_learning::ActionValueTable,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

pub fn space(n: usize) -> ActionSpace {
    ActionSpace::new(n).unwrap()
}

/// Q-learning agent with the given hyperparameters and a fixed seed.
pub fn q_agent(n: usize, learning_rate: f64, discount_factor: f64, seed: u64) -> QLearningAgent {
    QLearningAgent::new(
        space(n),
        Hyperparameters::new(learning_rate, discount_factor).unwrap(),
    )
    .with_seed(seed)
}

/// Agent whose table holds exactly the given rows.
pub fn agent_with_rows(n: usize, rows: Vec<(Observation, Vec<f64>)>, seed: u64) -> QLearningAgent {
    let table = ActionValueTable::from_rows(space(n), rows).unwrap();
    QLearningAgent::from_table(space(n), Hyperparameters::default(), table).with_seed(seed)
}

/// Table of `states` rows filled with distinct random values.
pub fn random_rows(n: usize, states: u64, seed: u64) -> Vec<(Observation, Vec<f64>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..states)
        .map(|s| {
            let values = (0..n).map(|_| rng.random_range(-10.0..10.0)).collect();
            (Observation::Discrete(s), values)
        })
        .collect()
}

/// Count how often each action is picked over `trials` calls of `pick`.
pub fn frequencies<F>(n: usize, trials: usize, mut pick: F) -> Vec<usize>
where
    F: FnMut() -> usize,
{
    let mut counts = vec![0; n];
    for _ in 0..trials {
        counts[pick()] += 1;
    }
    counts
}

/// Every count lies within `tolerance` (as a fraction) of the uniform share.
pub fn assert_roughly_uniform(counts: &[usize], tolerance: f64) {
    let total: usize = counts.iter().sum();
    let expected = total as f64 / counts.len() as f64;
    for (action, &count) in counts.iter().enumerate() {
        let deviation = (count as f64 - expected).abs() / expected;
        assert!(
            deviation < tolerance,
            "action {action} picked {count} times, expected about {expected:.0} ({counts:?})"
        );
    }
}

/// Greedy actions for every observation in `rows`.
pub fn greedy_actions(agent: &mut dyn Agent, rows: &[(Observation, Vec<f64>)]) -> Vec<usize> {
    rows.iter().map(|(obs, _)| agent.act(obs)).collect()
}
