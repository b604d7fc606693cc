//! Environments the agents are trained against
//!
//! Every environment exposes a discrete action space and emits canonical
//! [`Observation`] keys, so any agent can drive any environment.

pub mod cart_pole;
pub mod discretizer;
pub mod frozen_lake;

use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use cart_pole::CartPole;
pub use discretizer::{Bucket, Discretizer};
pub use frozen_lake::FrozenLake;

use crate::{
    Error, Result,
    types::{ActionIndex, ActionSpace, Observation},
};

/// Identifiers of the built-in environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum EnvId {
    #[value(name = "FrozenLake-v0")]
    #[serde(rename = "FrozenLake-v0")]
    FrozenLake,
    #[value(name = "CartPole-v0")]
    #[serde(rename = "CartPole-v0")]
    CartPole,
}

impl EnvId {
    pub const ALL: [EnvId; 2] = [EnvId::FrozenLake, EnvId::CartPole];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvId::FrozenLake => "FrozenLake-v0",
            EnvId::CartPole => "CartPole-v0",
        }
    }
}

impl fmt::Display for EnvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EnvId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownName {
                what: "environment",
                input: s.to_string(),
                expected: EnvId::ALL.map(|id| id.as_str()).join(", "),
            })
    }
}

/// Extra information attached to a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Steps taken in the current episode, including this one
    pub steps: usize,
    /// The episode ended because of the step limit rather than a terminal state
    pub truncated: bool,
}

/// Result of advancing an environment by one action
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// Episodic environment with a discrete action space.
pub trait Environment: Send {
    fn id(&self) -> EnvId;

    fn action_space(&self) -> ActionSpace;

    /// Begin a new episode and return its initial observation.
    fn reset(&mut self) -> Observation;

    /// Advance one step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionOutOfRange`] for an invalid action and
    /// [`Error::EpisodeFinished`] when stepping past the end of an episode.
    fn step(&mut self, action: ActionIndex) -> Result<Step>;

    /// Text rendering of the current state.
    fn render(&self) -> String;

    /// Release resources held by the environment.
    fn close(&mut self) {}

    /// Reseed the environment's random number generator.
    fn set_rng_seed(&mut self, seed: u64);
}

/// Build the environment for `id` with its standard settings.
pub fn make(id: EnvId) -> Box<dyn Environment> {
    match id {
        EnvId::FrozenLake => Box::new(FrozenLake::new()),
        EnvId::CartPole => Box::new(CartPole::new()),
    }
}
