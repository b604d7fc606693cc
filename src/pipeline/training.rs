//! Episode driver for agents acting in an environment

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error, Result,
    env::Environment,
    ports::{Agent, Observer},
    types::{ActionIndex, Observation},
};

/// How the driver picks between exploring and exploiting on each step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ActionSelection {
    /// Always call `explore`
    Explore,
    /// Always call `act`
    Exploit,
    /// Explore with probability `epsilon`, otherwise act
    EpsilonGreedy { epsilon: f64 },
    /// Explore for the first `explore_episodes` episodes, then act
    Split { explore_episodes: usize },
}

impl ActionSelection {
    fn explores<R: Rng>(&self, episode: usize, rng: &mut R) -> bool {
        match *self {
            ActionSelection::Explore => true,
            ActionSelection::Exploit => false,
            ActionSelection::EpsilonGreedy { epsilon } => rng.random::<f64>() < epsilon,
            ActionSelection::Split { explore_episodes } => episode < explore_episodes,
        }
    }
}

/// Driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes to run
    pub episodes: usize,

    /// Explore/exploit schedule
    pub selection: ActionSelection,

    /// Feed every transition to `Agent::learn`
    pub learn: bool,

    /// Print the environment after every step
    pub render: bool,

    /// Random seed for the environment, the agent and the driver
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            selection: ActionSelection::Explore,
            learn: true,
            render: false,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_selection(mut self, selection: ActionSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_learning(mut self, learn: bool) -> Self {
        self.learn = learn;
        self
    }

    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperparameter`] when an epsilon-greedy
    /// schedule has `epsilon` outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if let ActionSelection::EpsilonGreedy { epsilon } = self.selection {
            if !(0.0..=1.0).contains(&epsilon) {
                return Err(Error::InvalidHyperparameter {
                    name: "epsilon",
                    value: epsilon,
                    reason: "must lie in [0, 1]",
                });
            }
        }
        Ok(())
    }
}

/// One environment transition as seen by observers
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub episode: usize,
    /// 0-based step within the episode
    pub step: usize,
    pub observation: Observation,
    pub action: ActionIndex,
    pub reward: f64,
    pub next_observation: Observation,
    pub done: bool,
    /// The action came from `explore` rather than `act`
    pub explored: bool,
}

/// Outcome of a finished episode
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    pub final_reward: f64,
    /// The last reward of the episode was positive
    pub won: bool,
    pub truncated: bool,
}

/// Result of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Episodes completed
    pub episodes: usize,

    /// Episodes whose final reward was positive
    pub wins: usize,

    /// Win rate
    pub win_rate: f64,

    /// Environment steps across all episodes
    pub total_steps: usize,

    /// Mean undiscounted return per episode
    pub mean_reward: f64,
}

impl RunResult {
    /// Create a new run result
    pub fn new(episodes: usize, wins: usize, total_steps: usize, total_reward: f64) -> Self {
        let (win_rate, mean_reward) = if episodes > 0 {
            (
                wins as f64 / episodes as f64,
                total_reward / episodes as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            episodes,
            wins,
            win_rate,
            total_steps,
            mean_reward,
        }
    }
}

/// Runs an agent in an environment for a fixed number of episodes
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    rng: StdRng,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(2)),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            config,
            observers: Vec::new(),
            rng,
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run `config.episodes` episodes.
    ///
    /// Every episode starts from `env.reset()` and ends when the environment
    /// reports `done`. With `learn` enabled each transition is passed to
    /// [`Agent::learn`] before the next action is chosen.
    ///
    /// # Errors
    ///
    /// Propagates configuration, environment, agent and observer errors.
    pub fn run(
        &mut self,
        env: &mut dyn Environment,
        agent: &mut dyn Agent,
    ) -> Result<RunResult> {
        self.config.validate()?;
        if agent.action_space() != env.action_space() {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "agent action space {} does not match {} action space {}",
                    agent.action_space(),
                    env.id(),
                    env.action_space()
                ),
            });
        }
        self.seed(env, agent);

        info!(
            env = %env.id(),
            agent = agent.name(),
            episodes = self.config.episodes,
            learn = self.config.learn,
            "starting run"
        );

        for observer in &mut self.observers {
            observer.on_run_start(self.config.episodes)?;
        }

        let mut wins = 0;
        let mut total_steps = 0;
        let mut total_reward = 0.0;

        for episode in 0..self.config.episodes {
            let summary = self.run_episode(episode, env, agent)?;

            total_steps += summary.steps;
            total_reward += summary.total_reward;
            if summary.won {
                wins += 1;
            }

            debug!(
                episode,
                steps = summary.steps,
                reward = summary.total_reward,
                won = summary.won,
                "episode finished"
            );

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_run_end()?;
        }

        let result = RunResult::new(self.config.episodes, wins, total_steps, total_reward);
        info!(
            episodes = result.episodes,
            wins = result.wins,
            win_rate = result.win_rate,
            "run finished"
        );
        Ok(result)
    }

    fn seed(&self, env: &mut dyn Environment, agent: &mut dyn Agent) {
        if let Some(seed) = self.config.seed {
            env.set_rng_seed(seed);
            agent.set_rng_seed(seed.wrapping_add(1));
        }
    }

    fn run_episode(
        &mut self,
        episode: usize,
        env: &mut dyn Environment,
        agent: &mut dyn Agent,
    ) -> Result<EpisodeSummary> {
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut observation = env.reset();
        if self.config.render {
            println!("{}", env.render());
        }

        let mut step_num = 0;
        let mut total_reward = 0.0;

        loop {
            let explored = self.config.selection.explores(episode, &mut self.rng);
            let action = if explored {
                agent.explore(&observation)
            } else {
                agent.act(&observation)
            };

            let step = env.step(action)?;
            if self.config.learn {
                agent.learn(&observation, action, &step.observation, step.reward)?;
            }

            if self.config.render {
                println!("{}", env.render());
            }

            total_reward += step.reward;
            let record = StepRecord {
                episode,
                step: step_num,
                observation,
                action,
                reward: step.reward,
                next_observation: step.observation,
                done: step.done,
                explored,
            };
            for observer in &mut self.observers {
                observer.on_step(&record)?;
            }
            step_num += 1;

            if step.done {
                return Ok(EpisodeSummary {
                    episode,
                    steps: step_num,
                    total_reward,
                    final_reward: record.reward,
                    won: record.reward > 0.0,
                    truncated: step.info.truncated,
                });
            }
            observation = record.next_observation;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        agents::RandomAgent,
        config::Hyperparameters,
        env::FrozenLake,
        q_learning::QLearningAgent,
        types::ActionSpace,
    };

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Observer for Recorder {
        fn on_run_start(&mut self, total_episodes: usize) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {total_episodes}"));
            Ok(())
        }

        fn on_episode_start(&mut self, episode: usize) -> Result<()> {
            self.events.lock().unwrap().push(format!("episode {episode}"));
            Ok(())
        }

        fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("end {}", summary.episode));
            Ok(())
        }

        fn on_run_end(&mut self) -> Result<()> {
            self.events.lock().unwrap().push("finish".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_training_pipeline() {
        let config = TrainingConfig::default().with_episodes(10).with_seed(Some(42));
        let mut pipeline = TrainingPipeline::new(config);
        let mut env = FrozenLake::new();
        let mut agent = RandomAgent::new(ActionSpace::new(4).unwrap());

        let result = pipeline.run(&mut env, &mut agent).unwrap();

        assert_eq!(result.episodes, 10);
        assert!(result.wins <= 10);
        assert!(result.total_steps >= 10);
        assert_eq!(result.win_rate, result.wins as f64 / 10.0);
    }

    #[test]
    fn test_observer_event_order() {
        let recorder = Recorder::default();
        let config = TrainingConfig::default().with_episodes(2).with_seed(Some(1));
        let mut pipeline = TrainingPipeline::new(config).with_observer(Box::new(recorder.clone()));
        let mut env = FrozenLake::new();
        let mut agent = RandomAgent::new(ActionSpace::new(4).unwrap());

        pipeline.run(&mut env, &mut agent).unwrap();

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["start 2", "episode 0", "end 0", "episode 1", "end 1", "finish"]
        );
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let run = || {
            let config = TrainingConfig::default()
                .with_episodes(50)
                .with_selection(ActionSelection::EpsilonGreedy { epsilon: 0.5 })
                .with_seed(Some(9));
            let mut env = FrozenLake::new();
            let mut agent =
                QLearningAgent::new(ActionSpace::new(4).unwrap(), Hyperparameters::default());
            let result = TrainingPipeline::new(config)
                .run(&mut env, &mut agent)
                .unwrap();
            let mut rows = agent.table().to_rows();
            rows.sort_by(|a, b| a.0.cmp(&b.0));
            (result, rows)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_no_learning_leaves_agent_untouched() {
        let config = TrainingConfig::default()
            .with_episodes(5)
            .with_learning(false);
        let mut env = FrozenLake::new();
        let mut agent =
            QLearningAgent::new(ActionSpace::new(4).unwrap(), Hyperparameters::default());
        TrainingPipeline::new(config)
            .run(&mut env, &mut agent)
            .unwrap();
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_mismatched_action_space_rejected() {
        let mut env = FrozenLake::new();
        let mut agent = RandomAgent::new(ActionSpace::new(2).unwrap());
        let err = TrainingPipeline::new(TrainingConfig::default())
            .run(&mut env, &mut agent)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_invalid_epsilon_rejected() {
        let config = TrainingConfig::default()
            .with_selection(ActionSelection::EpsilonGreedy { epsilon: 1.5 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_selection() {
        let mut rng = StdRng::seed_from_u64(0);
        let selection = ActionSelection::Split {
            explore_episodes: 2,
        };
        assert!(selection.explores(1, &mut rng));
        assert!(!selection.explores(2, &mut rng));
    }

    #[test]
    fn test_result_rates() {
        let result = RunResult::new(4, 1, 40, 2.0);
        assert_eq!(result.win_rate, 0.25);
        assert_eq!(result.mean_reward, 0.5);
        assert_eq!(RunResult::new(0, 0, 0, 0.0).win_rate, 0.0);
    }
}
