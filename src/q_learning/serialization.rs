//! Versioned snapshot of an agent for the policy store.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    agents::{AgentKind, RandomAgent},
    config::Hyperparameters,
    ports::Agent,
    q_learning::{agent::QLearningAgent, q_table::ActionValueTable},
    types::{ActionSpace, Observation},
};

/// Learned state of an agent, without any runtime-only pieces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentState {
    Random,
    QLearning {
        hyperparameters: Hyperparameters,
        /// Every materialized row, sorted by observation
        table: Vec<(Observation, Vec<f64>)>,
    },
}

impl AgentState {
    fn kind(&self) -> AgentKind {
        match self {
            AgentState::Random => AgentKind::Random,
            AgentState::QLearning { .. } => AgentKind::QLearning,
        }
    }
}

/// Bookkeeping carried alongside a saved policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Episodes trained with learning enabled, summed across runs
    pub episodes_trained: usize,
    /// Environment identifier the agent was trained on
    pub environment: Option<String>,
    /// Seed of the most recent run (if any)
    pub seed: Option<u64>,
    /// UNIX timestamp (seconds) of the last save
    pub saved_at: Option<String>,
}

/// Serialized form of an agent: format version, kind, action-space size,
/// hyperparameters and table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    pub kind: AgentKind,
    pub n_actions: usize,
    state: AgentState,
    pub metadata: TrainingMetadata,
}

impl SavedAgent {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &dyn Agent, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            kind: agent.kind(),
            n_actions: agent.action_space().size(),
            state: agent.export_state(),
            metadata,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Number of table rows stored (zero for the random agent)
    pub fn table_len(&self) -> usize {
        match &self.state {
            AgentState::Random => 0,
            AgentState::QLearning { table, .. } => table.len(),
        }
    }

    /// Reconstruct the agent.
    ///
    /// # Errors
    ///
    /// Fails on a format version other than [`SavedAgent::VERSION`], a kind
    /// that disagrees with the stored state, out-of-range hyperparameters, or
    /// a table whose rows do not match the action-space size.
    pub fn into_agent(self) -> Result<Box<dyn Agent>> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        if self.state.kind() != self.kind {
            return Err(Error::KindMismatch {
                declared: self.kind.to_string(),
                found: self.state.kind().to_string(),
            });
        }

        let action_space = ActionSpace::new(self.n_actions).map_err(|e| Error::CorruptArtifact {
            message: e.to_string(),
        })?;

        match self.state {
            AgentState::Random => Ok(Box::new(RandomAgent::new(action_space))),
            AgentState::QLearning {
                hyperparameters,
                table,
            } => {
                hyperparameters.validate()?;
                let table = ActionValueTable::from_rows(action_space, table)?;
                Ok(Box::new(QLearningAgent::from_table(
                    action_space,
                    hyperparameters,
                    table,
                )))
            }
        }
    }
}
