//! MessagePack implementation of the policy repository.
//!
//! This adapter implements the PolicyRepository port using rmp_serde for
//! compact binary serialization, one file per (environment, agent kind).

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    Result,
    agents::AgentKind,
    error::Error,
    ports::{PolicyRepository, policy_key},
    q_learning::SavedAgent,
};

/// Directory-backed MessagePack policy repository.
///
/// Artifacts live at `<dir>/<env_id>-<kind>.msgpack`.
///
/// # Examples
///
/// ```no_run
/// use qlearn::adapters::MsgPackRepository;
/// use qlearn::agents::AgentKind;
/// use qlearn::ports::PolicyRepository;
///
/// let repo = MsgPackRepository::new("models");
/// match repo.load("FrozenLake-v0", AgentKind::QLearning)? {
///     Some(saved) => println!("{} rows", saved.table_len()),
///     None => println!("nothing saved yet"),
/// }
/// # Ok::<(), qlearn::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MsgPackRepository {
    dir: PathBuf,
}

impl MsgPackRepository {
    pub const DEFAULT_DIR: &'static str = "models";
    pub const EXTENSION: &'static str = "msgpack";

    /// Create a repository rooted at `dir`. The directory is created lazily on
    /// the first save.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the artifact for (env_id, kind)
    pub fn path_for(&self, env_id: &str, kind: AgentKind) -> PathBuf {
        self.dir
            .join(format!("{}.{}", policy_key(env_id, kind), Self::EXTENSION))
    }

    /// Sibling file a save is written to before it replaces the artifact
    fn staging_path_for(&self, env_id: &str, kind: AgentKind) -> PathBuf {
        self.dir
            .join(format!("{}.{}.tmp", policy_key(env_id, kind), Self::EXTENSION))
    }
}

fn write_policy(path: &Path, policy: &SavedAgent) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create file {path:?}"),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    rmp_serde::encode::write(&mut writer, policy).map_err(|e| Error::SerializationContext {
        operation: "serialize policy to MessagePack".to_string(),
        message: e.to_string(),
    })?;
    writer.flush().map_err(|source| Error::Io {
        operation: format!("flush file {path:?}"),
        source,
    })
}

impl Default for MsgPackRepository {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIR)
    }
}

impl PolicyRepository for MsgPackRepository {
    fn save(&self, env_id: &str, kind: AgentKind, policy: &SavedAgent) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            operation: format!("create directory {:?}", self.dir),
            source,
        })?;

        let path = self.path_for(env_id, kind);
        let staging = self.staging_path_for(env_id, kind);
        if let Err(err) = write_policy(&staging, policy) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
        fs::rename(&staging, &path).map_err(|source| Error::Io {
            operation: format!("replace file {path:?}"),
            source,
        })?;

        info!(path = %path.display(), rows = policy.table_len(), "saved policy");
        Ok(())
    }

    fn load(&self, env_id: &str, kind: AgentKind) -> Result<Option<SavedAgent>> {
        let path = self.path_for(env_id, kind);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored policy");
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("open file {path:?}"),
                    source,
                });
            }
        };

        let policy: SavedAgent = rmp_serde::decode::from_read(BufReader::new(file)).map_err(
            |e| Error::SerializationContext {
                operation: "deserialize policy from MessagePack".to_string(),
                message: e.to_string(),
            },
        )?;

        info!(path = %path.display(), rows = policy.table_len(), "loaded policy");
        Ok(Some(policy))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{agents::RandomAgent, q_learning::TrainingMetadata, types::ActionSpace};

    fn saved_random() -> SavedAgent {
        let agent = RandomAgent::new(ActionSpace::new(2).unwrap());
        SavedAgent::from_agent(&agent, TrainingMetadata::default())
    }

    #[test]
    fn test_msgpack_roundtrip_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = MsgPackRepository::new(temp_dir.path().join("nested").join("models"));
        let saved = saved_random();

        repo.save("FrozenLake-v0", AgentKind::Random, &saved)
            .expect("Failed to save");
        assert!(repo.path_for("FrozenLake-v0", AgentKind::Random).exists());

        let loaded = repo
            .load("FrozenLake-v0", AgentKind::Random)
            .expect("Failed to load");
        assert_eq!(loaded, Some(saved));
    }

    #[test]
    fn test_load_missing_is_absent_not_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = MsgPackRepository::new(temp_dir.path());
        let result = repo.load("CartPole-v0", AgentKind::QLearning);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = MsgPackRepository::new(temp_dir.path());
        fs::write(
            repo.path_for("CartPole-v0", AgentKind::QLearning),
            b"not a policy",
        )
        .unwrap();
        assert!(matches!(
            repo.load("CartPole-v0", AgentKind::QLearning),
            Err(Error::SerializationContext { .. })
        ));
    }

    #[test]
    fn test_failed_save_keeps_previous_artifact() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = MsgPackRepository::new(temp_dir.path());
        let saved = saved_random();
        repo.save("FrozenLake-v0", AgentKind::Random, &saved)
            .expect("Failed to save");
        assert!(
            !repo
                .staging_path_for("FrozenLake-v0", AgentKind::Random)
                .exists()
        );

        // a directory in the staging slot makes the next write fail
        fs::create_dir(repo.staging_path_for("FrozenLake-v0", AgentKind::Random)).unwrap();
        assert!(matches!(
            repo.save("FrozenLake-v0", AgentKind::Random, &saved),
            Err(Error::Io { .. })
        ));

        let loaded = repo
            .load("FrozenLake-v0", AgentKind::Random)
            .expect("Failed to load");
        assert_eq!(loaded, Some(saved));
    }

    #[test]
    fn test_path_is_named_after_key() {
        let repo = MsgPackRepository::new("models");
        assert_eq!(
            repo.path_for("FrozenLake-v0", AgentKind::QLearning),
            Path::new("models").join("FrozenLake-v0-QLearning.msgpack")
        );
    }
}
