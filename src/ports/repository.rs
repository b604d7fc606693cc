//! Repository port for policy persistence.
//!
//! This module defines the trait boundary between the domain and the storage
//! of saved agents. Policies are keyed by (environment id, agent kind).

use crate::{Result, agents::AgentKind, q_learning::SavedAgent};

/// Deterministic artifact name for a (environment id, agent kind) pair.
pub fn policy_key(env_id: &str, kind: AgentKind) -> String {
    format!("{env_id}-{kind}")
}

/// Port for persisting and loading saved agents.
///
/// # Examples
///
/// ```no_run
/// use qlearn::{
///     agents::{AgentKind, build_agent},
///     config::AgentConfig,
///     ports::PolicyRepository,
///     types::ActionSpace,
/// };
///
/// fn load_or_fresh<R: PolicyRepository>(
///     repo: &R,
///     env_id: &str,
///     space: ActionSpace,
/// ) -> qlearn::Result<Box<dyn qlearn::ports::Agent>> {
///     match repo.load(env_id, AgentKind::QLearning)? {
///         Some(saved) => saved.into_agent(),
///         None => build_agent(&AgentConfig::new(AgentKind::QLearning), space),
///     }
/// }
/// ```
pub trait PolicyRepository {
    /// Save a policy, replacing any earlier one stored under the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The storage location cannot be created or written to
    /// - Serialization fails
    fn save(&self, env_id: &str, kind: AgentKind, policy: &SavedAgent) -> Result<()>;

    /// Load the policy stored under (env_id, kind).
    ///
    /// Returns `Ok(None)` when nothing was ever saved for the key, so the
    /// caller can build a fresh agent instead.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The artifact exists but cannot be read
    /// - The artifact is corrupt or fails to deserialize
    fn load(&self, env_id: &str, kind: AgentKind) -> Result<Option<SavedAgent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_key_is_deterministic() {
        assert_eq!(
            policy_key("FrozenLake-v0", AgentKind::QLearning),
            "FrozenLake-v0-QLearning"
        );
        assert_eq!(
            policy_key("CartPole-v0", AgentKind::Random),
            policy_key("CartPole-v0", AgentKind::Random)
        );
    }
}
