//! Save/load behavior of the policy store

mod common;

use common::{agent_with_rows, greedy_actions, random_rows, space};
use qlearn::{
    AgentKind, Error, Observation, RandomAgent,
    adapters::{InMemoryRepository, MsgPackRepository},
    ports::{Agent, PolicyRepository},
    q_learning::{AgentState, SavedAgent, TrainingMetadata},
};
use tempfile::tempdir;

const ENV: &str = "FrozenLake-v0";

#[test]
fn q_learning_agent_survives_round_trip_on_disk() {
    let tmp = tempdir().unwrap();
    let repo = MsgPackRepository::new(tmp.path());

    let rows = random_rows(4, 16, 77);
    let mut agent = agent_with_rows(4, rows.clone(), 1);
    let expected = greedy_actions(&mut agent, &rows);

    let metadata = TrainingMetadata {
        episodes_trained: 250,
        environment: Some(ENV.to_string()),
        ..TrainingMetadata::default()
    };
    repo.save(ENV, AgentKind::QLearning, &SavedAgent::from_agent(&agent, metadata))
        .unwrap();
    assert!(tmp.path().join("FrozenLake-v0-QLearning.msgpack").exists());

    let saved = repo.load(ENV, AgentKind::QLearning).unwrap().unwrap();
    assert_eq!(saved.kind, AgentKind::QLearning);
    assert_eq!(saved.n_actions, 4);
    assert_eq!(saved.table_len(), 16);
    assert_eq!(saved.metadata.episodes_trained, 250);
    match saved.state() {
        AgentState::QLearning {
            hyperparameters,
            table,
        } => {
            assert_eq!(hyperparameters.learning_rate, 0.1);
            assert_eq!(hyperparameters.discount_factor, 0.9);
            assert_eq!(table, &rows);
        }
        other => panic!("unexpected state {other:?}"),
    }

    let mut restored = saved.into_agent().unwrap();
    assert_eq!(restored.kind(), AgentKind::QLearning);
    assert_eq!(greedy_actions(restored.as_mut(), &rows), expected);
}

#[test]
fn feature_observations_survive_round_trip() {
    let repo = InMemoryRepository::new();
    let rows = vec![
        (Observation::Features(vec![1, 1, 3, 3]), vec![0.5, 0.25]),
        (Observation::Features(vec![0, 2, 5, -1]), vec![-1.0, 4.0]),
    ];
    let agent = agent_with_rows(2, rows.clone(), 3);

    repo.save(
        "CartPole-v0",
        AgentKind::QLearning,
        &SavedAgent::from_agent(&agent, TrainingMetadata::default()),
    )
    .unwrap();

    let mut restored = repo
        .load("CartPole-v0", AgentKind::QLearning)
        .unwrap()
        .unwrap()
        .into_agent()
        .unwrap();
    assert_eq!(greedy_actions(restored.as_mut(), &rows), vec![0, 1]);
}

#[test]
fn random_agent_round_trip_keeps_action_space() {
    let tmp = tempdir().unwrap();
    let repo = MsgPackRepository::new(tmp.path().join("nested").join("models"));
    let agent = RandomAgent::new(space(2));

    repo.save(
        "CartPole-v0",
        AgentKind::Random,
        &SavedAgent::from_agent(&agent, TrainingMetadata::default()),
    )
    .unwrap();

    let restored = repo
        .load("CartPole-v0", AgentKind::Random)
        .unwrap()
        .unwrap()
        .into_agent()
        .unwrap();
    assert_eq!(restored.kind(), AgentKind::Random);
    assert_eq!(restored.action_space().size(), 2);
}

#[test]
fn missing_artifact_is_absent_not_an_error() {
    let tmp = tempdir().unwrap();
    let disk = MsgPackRepository::new(tmp.path().join("never-created"));
    let memory = InMemoryRepository::new();

    let repos: [&dyn PolicyRepository; 2] = [&disk, &memory];
    for repo in repos {
        for kind in AgentKind::ALL {
            assert!(repo.load("CartPole-v0", kind).unwrap().is_none());
        }
    }
}

#[test]
fn corrupt_artifact_fails_to_load() {
    let tmp = tempdir().unwrap();
    let repo = MsgPackRepository::new(tmp.path());
    std::fs::write(
        repo.path_for(ENV, AgentKind::QLearning),
        b"definitely not msgpack",
    )
    .unwrap();

    let err = repo.load(ENV, AgentKind::QLearning).unwrap_err();
    assert!(matches!(err, Error::SerializationContext { .. }));
}

#[test]
fn unknown_format_version_is_rejected() {
    let repo = InMemoryRepository::new();
    let agent = agent_with_rows(2, random_rows(2, 3, 5), 0);
    let mut saved = SavedAgent::from_agent(&agent, TrainingMetadata::default());
    saved.version = SavedAgent::VERSION + 1;
    repo.save(ENV, AgentKind::QLearning, &saved).unwrap();

    let loaded = repo.load(ENV, AgentKind::QLearning).unwrap().unwrap();
    let err = loaded.into_agent().err().unwrap();
    assert!(matches!(
        err,
        Error::UnsupportedVersion {
            found: 2,
            expected: 1
        }
    ));
}

#[test]
fn declared_kind_must_match_state() {
    let agent = RandomAgent::new(space(4));
    let mut saved = SavedAgent::from_agent(&agent, TrainingMetadata::default());
    saved.kind = AgentKind::QLearning;

    let err = saved.into_agent().err().unwrap();
    assert!(matches!(err, Error::KindMismatch { .. }));
}

#[test]
fn row_length_must_match_action_count() {
    let agent = agent_with_rows(3, random_rows(3, 2, 8), 0);
    let mut saved = SavedAgent::from_agent(&agent, TrainingMetadata::default());
    saved.n_actions = 2;

    let err = saved.into_agent().err().unwrap();
    assert!(matches!(err, Error::CorruptArtifact { .. }));
}

#[test]
fn saving_twice_replaces_the_artifact() {
    let tmp = tempdir().unwrap();
    let repo = MsgPackRepository::new(tmp.path());

    for states in [4, 9] {
        let agent = agent_with_rows(4, random_rows(4, states, states), 0);
        repo.save(
            ENV,
            AgentKind::QLearning,
            &SavedAgent::from_agent(&agent, TrainingMetadata::default()),
        )
        .unwrap();
    }

    let saved = repo.load(ENV, AgentKind::QLearning).unwrap().unwrap();
    assert_eq!(saved.table_len(), 9);
}
