//! Observation keys and the discrete action space.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Index of a discrete action in `[0, n)`.
pub type ActionIndex = usize;

/// Canonical, hashable observation used as an action-value table key.
///
/// Environments convert whatever they observe into one of these variants, so
/// that two observations comparing equal always address the same table row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Observation {
    /// A single discrete state index.
    Discrete(u64),
    /// A tuple of discrete features, e.g. a bucketized continuous vector.
    Features(Vec<i64>),
}

impl From<u64> for Observation {
    fn from(index: u64) -> Self {
        Observation::Discrete(index)
    }
}

impl From<Vec<i64>> for Observation {
    fn from(features: Vec<i64>) -> Self {
        Observation::Features(features)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::Discrete(index) => write!(f, "{index}"),
            Observation::Features(features) => {
                write!(f, "(")?;
                for (i, value) in features.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Fixed-size discrete action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionSpace {
    n: usize,
}

impl ActionSpace {
    /// Create an action space with `n` actions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyActionSpace`] if `n` is zero.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::EmptyActionSpace);
        }
        Ok(Self { n })
    }

    /// Action space whose size is known at compile time.
    pub const fn fixed<const N: usize>() -> Self {
        const { assert!(N > 0, "action space must contain at least one action") };
        Self { n: N }
    }

    /// Number of actions.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Draw an action uniformly at random.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ActionIndex {
        rng.random_range(0..self.n)
    }

    /// Check that `action` lies inside the space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionOutOfRange`] for `action >= n`.
    pub fn check(&self, action: ActionIndex) -> Result<ActionIndex> {
        if action < self.n {
            Ok(action)
        } else {
            Err(Error::ActionOutOfRange {
                action,
                n: self.n,
            })
        }
    }

    pub fn contains(&self, action: ActionIndex) -> bool {
        action < self.n
    }
}

impl fmt::Display for ActionSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discrete({})", self.n)
    }
}
