//! Agent kinds and construction of fresh agents
//!
//! Two variants exist: the [`RandomAgent`] baseline and the tabular
//! [`QLearningAgent`]. Both implement [`crate::ports::Agent`].

pub mod random;

use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use random::RandomAgent;

use crate::{
    Error, Result, config::AgentConfig, ports::Agent, q_learning::QLearningAgent,
    types::ActionSpace,
};

/// Closed enumeration of agent kinds, also used as part of the policy key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum AgentKind {
    /// Uniformly random baseline, never learns
    #[value(name = "Random", alias = "random")]
    Random,
    /// Tabular one-step Q-learning
    #[value(name = "QLearning", alias = "q-learning", alias = "qlearning")]
    QLearning,
}

impl AgentKind {
    pub const ALL: [AgentKind; 2] = [AgentKind::Random, AgentKind::QLearning];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Random => "Random",
            AgentKind::QLearning => "QLearning",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(AgentKind::Random),
            "qlearning" | "q-learning" | "q_learning" => Ok(AgentKind::QLearning),
            other => Err(Error::UnknownName {
                what: "agent kind",
                input: other.to_string(),
                expected: "Random, QLearning".to_string(),
            }),
        }
    }
}

/// Build a fresh agent with an empty table.
///
/// # Errors
///
/// Returns [`Error::InvalidHyperparameter`] when the configured learning
/// rate or discount factor is out of range.
pub fn build_agent(config: &AgentConfig, action_space: ActionSpace) -> Result<Box<dyn Agent>> {
    let agent: Box<dyn Agent> = match config.kind {
        AgentKind::Random => {
            let agent = RandomAgent::new(action_space);
            match config.seed {
                Some(seed) => Box::new(agent.with_seed(seed)),
                None => Box::new(agent),
            }
        }
        AgentKind::QLearning => {
            config.hyperparameters.validate()?;
            let agent = QLearningAgent::new(action_space, config.hyperparameters);
            match config.seed {
                Some(seed) => Box::new(agent.with_seed(seed)),
                None => Box::new(agent),
            }
        }
    };
    Ok(agent)
}
