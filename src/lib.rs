//! Tabular reinforcement-learning agents with persistent policies
//!
//! This crate provides:
//! - A uniform random baseline agent and a tabular Q-learning agent
//! - A lazily materialized action-value table with fair tie-breaking
//! - A policy store that persists agents per environment and agent kind
//! - Frozen-lake and cart-pole environments plus an episode driver

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use agents::{AgentKind, RandomAgent};
pub use error::{Error, Result};
pub use q_learning::{ActionValueTable, QLearningAgent, SavedAgent};
pub use types::{ActionIndex, ActionSpace, Observation};
