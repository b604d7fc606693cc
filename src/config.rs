//! Configuration types for agent creation.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, agents::AgentKind};

/// Q-learning hyperparameters, fixed for the lifetime of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Learning rate α in (0, 1]
    pub learning_rate: f64,
    /// Discount factor γ in [0, 1]
    pub discount_factor: f64,
}

impl Hyperparameters {
    pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
    pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.9;

    /// Create validated hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperparameter`] if α is outside (0, 1] or γ is
    /// outside [0, 1].
    pub fn new(learning_rate: f64, discount_factor: f64) -> Result<Self> {
        let params = Self {
            learning_rate,
            discount_factor,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check both parameters are inside their ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidHyperparameter {
                name: "learning_rate",
                value: self.learning_rate,
                reason: "must be in (0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(Error::InvalidHyperparameter {
                name: "discount_factor",
                value: self.discount_factor,
                reason: "must be in [0, 1]",
            });
        }
        Ok(())
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: Self::DEFAULT_LEARNING_RATE,
            discount_factor: Self::DEFAULT_DISCOUNT_FACTOR,
        }
    }
}

/// Configuration for creating a fresh agent.
///
/// # Examples
///
/// ```
/// use qlearn::agents::AgentKind;
/// use qlearn::config::AgentConfig;
///
/// let config = AgentConfig::new(AgentKind::QLearning)
///     .with_learning_rate(0.5)
///     .with_seed(42);
/// assert_eq!(config.hyperparameters.learning_rate, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Which agent variant to build
    pub kind: AgentKind,
    /// Q-learning parameters (ignored by the random agent)
    pub hyperparameters: Hyperparameters,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Create a configuration with default hyperparameters (α = 0.1, γ = 0.9)
    /// and no seed.
    pub fn new(kind: AgentKind) -> Self {
        Self {
            kind,
            hyperparameters: Hyperparameters::default(),
            seed: None,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.hyperparameters.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.hyperparameters.discount_factor = discount_factor;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
