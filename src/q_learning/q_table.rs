//! Action-value table for tabular Q-learning

use std::{borrow::Cow, collections::HashMap};

use rand::Rng;

use crate::{
    Result,
    config::Hyperparameters,
    types::{ActionIndex, ActionSpace, Observation},
};

/// Relative tolerance for treating two action values as tied
pub const TIE_RTOL: f64 = 1e-5;
/// Absolute tolerance for treating two action values as tied
pub const TIE_ATOL: f64 = 1e-8;

/// `|a - b| <= atol + rtol * |b|`, with exact equality (including infinities)
/// always counting as close.
pub fn is_close(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= TIE_ATOL + TIE_RTOL * b.abs()
}

/// Indices whose value is within tolerance of the row maximum.
///
/// Falls back to every index when the row has no comparable maximum (all NaN).
pub fn tied_best_actions(values: &[f64]) -> Vec<ActionIndex> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<ActionIndex> = values
        .iter()
        .enumerate()
        .filter(|&(_, &value)| is_close(value, max))
        .map(|(action, _)| action)
        .collect();
    if tied.is_empty() {
        (0..values.len()).collect()
    } else {
        tied
    }
}

/// Pick uniformly among the tied best actions and return it with its value.
pub fn resolve_best_action<R: Rng>(values: &[f64], rng: &mut R) -> (ActionIndex, f64) {
    let tied = tied_best_actions(values);
    let action = tied[rng.random_range(0..tied.len())];
    (action, values[action])
}

/// Sparse mapping from observation to one estimated return per action.
///
/// Observations never seen before read as an all-zero row. Rows only
/// materialize through [`ActionValueTable::values_mut`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValueTable {
    rows: HashMap<Observation, Vec<f64>>,
    n_actions: usize,
}

impl ActionValueTable {
    /// Create an empty table for the given action space
    pub fn new(action_space: ActionSpace) -> Self {
        Self {
            rows: HashMap::new(),
            n_actions: action_space.size(),
        }
    }

    /// Rebuild a table from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CorruptArtifact`] when a row length differs from
    /// the action-space size or an observation appears twice.
    pub fn from_rows<I>(action_space: ActionSpace, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Observation, Vec<f64>)>,
    {
        let mut table = Self::new(action_space);
        for (observation, values) in rows {
            if values.len() != table.n_actions {
                return Err(crate::Error::CorruptArtifact {
                    message: format!(
                        "row for observation {observation} has {} values, expected {}",
                        values.len(),
                        table.n_actions
                    ),
                });
            }
            if table.rows.insert(observation.clone(), values).is_some() {
                return Err(crate::Error::CorruptArtifact {
                    message: format!("observation {observation} appears more than once"),
                });
            }
        }
        Ok(table)
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Number of materialized rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, observation: &Observation) -> bool {
        self.rows.contains_key(observation)
    }

    /// Read a row without materializing it
    pub fn values(&self, observation: &Observation) -> Cow<'_, [f64]> {
        match self.rows.get(observation) {
            Some(values) => Cow::Borrowed(values.as_slice()),
            None => Cow::Owned(vec![0.0; self.n_actions]),
        }
    }

    /// Fetch a row, inserting an all-zero one on first access
    pub fn values_mut(&mut self, observation: &Observation) -> &mut Vec<f64> {
        let n_actions = self.n_actions;
        self.rows
            .entry(observation.clone())
            .or_insert_with(|| vec![0.0; n_actions])
    }

    /// Q(s, a), or `None` if `action` is outside the action space
    pub fn get(&self, observation: &Observation, action: ActionIndex) -> Option<f64> {
        self.values(observation).get(action).copied()
    }

    /// Greedy action for `observation`, ties broken uniformly at random
    pub fn best_action<R: Rng>(
        &self,
        observation: &Observation,
        rng: &mut R,
    ) -> (ActionIndex, f64) {
        resolve_best_action(&self.values(observation), rng)
    }

    /// One-step Q-learning update for the transition (s, a, s', r).
    ///
    /// Q(s,a) ← Q(s,a) + α(γ·max_a' Q(s',a') + r − Q(s,a))
    ///
    /// Writes exactly one entry. The caller must have validated `action`.
    pub fn q_learning_update<R: Rng>(
        &mut self,
        params: &Hyperparameters,
        state: &Observation,
        action: ActionIndex,
        next_state: &Observation,
        reward: f64,
        rng: &mut R,
    ) -> f64 {
        let old_q = self.values_mut(state)[action];
        let (_, best_next_q) = resolve_best_action(self.values_mut(next_state), rng);
        let temporal_difference = params.discount_factor * best_next_q + reward - old_q;
        let new_q = old_q + params.learning_rate * temporal_difference;
        self.values_mut(state)[action] = new_q;
        new_q
    }

    /// Rows sorted by observation
    pub fn sorted_rows(&self) -> Vec<(&Observation, &[f64])> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .map(|(observation, values)| (observation, values.as_slice()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(b.0));
        rows
    }

    /// Owned rows sorted by observation, the persisted form of the table
    pub fn to_rows(&self) -> Vec<(Observation, Vec<f64>)> {
        self.sorted_rows()
            .into_iter()
            .map(|(observation, values)| (observation.clone(), values.to_vec()))
            .collect()
    }
}
