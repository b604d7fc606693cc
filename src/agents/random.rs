//! Uniformly random baseline agent

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    agents::AgentKind,
    ports::Agent,
    q_learning::AgentState,
    types::{ActionIndex, ActionSpace, Observation},
};

/// Agent that samples every action uniformly and never learns.
///
/// Used as a baseline and as the fallback when no learning kind is asked for.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    action_space: ActionSpace,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(action_space: ActionSpace) -> Self {
        Self {
            action_space,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Agent for RandomAgent {
    fn explore(&mut self, _observation: &Observation) -> ActionIndex {
        self.action_space.sample(&mut self.rng)
    }

    fn act(&mut self, _observation: &Observation) -> ActionIndex {
        self.action_space.sample(&mut self.rng)
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Random
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    fn export_state(&self) -> AgentState {
        AgentState::Random
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}
