//! Agent port - the capability set every agent variant provides
//!
//! The episode driver only talks to agents through this trait:
//! - `explore` picks an action meant to gather information
//! - `act` picks the currently believed best action
//! - `learn` folds one observed transition into the agent's state
//!
//! Whether a step explores or exploits is decided by the caller; agents keep
//! no internal mode flag.

use crate::{
    Result,
    agents::AgentKind,
    q_learning::AgentState,
    types::{ActionIndex, ActionSpace, Observation},
};

/// Unified interface for the random baseline and the tabular learner.
///
/// `explore` and `act` take `&mut self` only to draw from the agent's own
/// random number generator; neither touches learned state.
///
/// # Examples
///
/// ```no_run
/// use qlearn::{ports::Agent, types::Observation};
///
/// fn greedy_rollout(agent: &mut dyn Agent, observations: &[Observation]) -> Vec<usize> {
///     observations.iter().map(|obs| agent.act(obs)).collect()
/// }
/// ```
pub trait Agent: Send {
    /// Choose an action without regard to value estimates.
    fn explore(&mut self, observation: &Observation) -> ActionIndex;

    /// Choose the currently best-estimated action (greedy policy).
    fn act(&mut self, observation: &Observation) -> ActionIndex;

    /// Update internal state from one transition (s, a, s', r).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ActionOutOfRange`] if `action` is outside the
    /// action space. Nothing is modified in that case.
    ///
    /// # Default Implementation
    ///
    /// Validates the action and otherwise does nothing, suitable for
    /// non-learning agents.
    fn learn(
        &mut self,
        _prev_observation: &Observation,
        action: ActionIndex,
        _next_observation: &Observation,
        _reward: f64,
    ) -> Result<()> {
        self.action_space().check(action)?;
        Ok(())
    }

    /// Which closed-enumeration kind this agent is.
    fn kind(&self) -> AgentKind;

    /// Human readable name, used in logs.
    fn name(&self) -> &str;

    /// The discrete action space the agent was built for.
    fn action_space(&self) -> ActionSpace;

    /// Snapshot of everything that must survive a save/load round trip.
    ///
    /// Runtime-only state such as the random number generator is excluded.
    fn export_state(&self) -> AgentState;

    /// Reseed the agent's random number generator.
    fn set_rng_seed(&mut self, seed: u64);

    /// Multi-line description of the learned policy, for printing.
    fn describe(&self) -> String {
        format!("{} {{}}", self.kind())
    }
}
