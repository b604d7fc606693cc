//! In-memory policy repository for testing.
//!
//! This adapter provides a pure in-memory implementation of PolicyRepository,
//! enabling fast tests without any file system I/O. Policies are still encoded
//! to MessagePack bytes so round trips go through real serialization.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Result,
    agents::AgentKind,
    error::Error,
    ports::{PolicyRepository, policy_key},
    q_learning::SavedAgent,
};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use qlearn::adapters::InMemoryRepository;
/// use qlearn::agents::{AgentKind, RandomAgent};
/// use qlearn::ports::PolicyRepository;
/// use qlearn::q_learning::{SavedAgent, TrainingMetadata};
/// use qlearn::types::ActionSpace;
///
/// let repo = InMemoryRepository::new();
/// let agent = RandomAgent::new(ActionSpace::new(2)?);
/// let saved = SavedAgent::from_agent(&agent, TrainingMetadata::default());
///
/// repo.save("FrozenLake-v0", AgentKind::Random, &saved)?;
/// assert!(repo.load("FrozenLake-v0", AgentKind::Random)?.is_some());
/// assert!(repo.load("CartPole-v0", AgentKind::Random)?.is_none());
/// # Ok::<(), qlearn::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the number of policies currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Check if a policy exists for the given key.
    pub fn contains(&self, env_id: &str, kind: AgentKind) -> bool {
        self.storage().contains_key(&policy_key(env_id, kind))
    }

    /// Store raw bytes under a key, e.g. to simulate a corrupt artifact.
    pub fn insert_raw(&self, env_id: &str, kind: AgentKind, bytes: Vec<u8>) {
        self.storage().insert(policy_key(env_id, kind), bytes);
    }
}

impl PolicyRepository for InMemoryRepository {
    fn save(&self, env_id: &str, kind: AgentKind, policy: &SavedAgent) -> Result<()> {
        let bytes = rmp_serde::to_vec(policy).map_err(|e| Error::SerializationContext {
            operation: "serialize policy for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(policy_key(env_id, kind), bytes);
        Ok(())
    }

    fn load(&self, env_id: &str, kind: AgentKind) -> Result<Option<SavedAgent>> {
        let storage = self.storage();
        let Some(bytes) = storage.get(&policy_key(env_id, kind)) else {
            return Ok(None);
        };

        rmp_serde::from_slice(bytes)
            .map(Some)
            .map_err(|e| Error::SerializationContext {
                operation: "deserialize policy from in-memory storage".to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{agents::RandomAgent, q_learning::TrainingMetadata, types::ActionSpace};

    fn saved(n: usize, episodes: usize) -> SavedAgent {
        let agent = RandomAgent::new(ActionSpace::new(n).unwrap());
        SavedAgent::from_agent(
            &agent,
            TrainingMetadata {
                episodes_trained: episodes,
                ..TrainingMetadata::default()
            },
        )
    }

    #[test]
    fn test_save_overwrites_same_key() {
        let repo = InMemoryRepository::new();
        repo.save("FrozenLake-v0", AgentKind::Random, &saved(4, 1))
            .unwrap();
        repo.save("FrozenLake-v0", AgentKind::Random, &saved(4, 2))
            .unwrap();

        assert_eq!(repo.count(), 1);
        let loaded = repo.load("FrozenLake-v0", AgentKind::Random).unwrap().unwrap();
        assert_eq!(loaded.metadata.episodes_trained, 2);
    }

    #[test]
    fn test_keys_separate_env_and_kind() {
        let repo = InMemoryRepository::new();
        repo.save("FrozenLake-v0", AgentKind::Random, &saved(4, 0))
            .unwrap();

        assert!(repo.contains("FrozenLake-v0", AgentKind::Random));
        assert!(!repo.contains("FrozenLake-v0", AgentKind::QLearning));
        assert!(repo.load("CartPole-v0", AgentKind::Random).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_bytes_fail_to_load() {
        let repo = InMemoryRepository::new();
        repo.insert_raw("CartPole-v0", AgentKind::QLearning, vec![0xc1, 0x00]);
        assert!(repo.load("CartPole-v0", AgentKind::QLearning).is_err());
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();
        repo1
            .save("CartPole-v0", AgentKind::Random, &saved(2, 0))
            .unwrap();
        assert_eq!(repo2.count(), 1);
    }
}
