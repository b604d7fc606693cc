//! Run command - Run an agent in an environment, learning as it goes

use std::{
    fs::File,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;
use tracing::{info, warn};

use crate::{
    agents::{AgentKind, build_agent},
    cli::{config::PolicyTarget, output},
    config::{AgentConfig, Hyperparameters},
    env::{self, EnvId},
    pipeline::{
        ActionSelection, MetricsObserver, MetricsSummary, ProgressObserver, RunResult,
        TrainingConfig, TrainingPipeline,
    },
    ports::{Agent, PolicyRepository},
    q_learning::{SavedAgent, TrainingMetadata},
    types::ActionSpace,
};

#[derive(Parser, Debug)]
#[command(about = "Run an agent in an environment", allow_negative_numbers = true)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: PolicyTarget,

    /// Episodes to play
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Act according to the learned policy, no exploration or learning
    #[arg(long, conflicts_with_all = ["epsilon", "explore_episodes"])]
    pub use_policy: bool,

    /// Explore with this probability on every step, act greedily otherwise
    #[arg(long, conflicts_with = "explore_episodes")]
    pub epsilon: Option<f64>,

    /// Explore for this many episodes, then act greedily
    #[arg(long)]
    pub explore_episodes: Option<usize>,

    /// Do not update the agent from experience
    #[arg(long)]
    pub no_learn: bool,

    /// Do not save any changes to the agent
    #[arg(long)]
    pub no_save: bool,

    /// Learning rate for a freshly built Q-learning agent
    #[arg(long, default_value_t = Hyperparameters::DEFAULT_LEARNING_RATE)]
    pub learning_rate: f64,

    /// Discount factor for a freshly built Q-learning agent
    #[arg(long, default_value_t = Hyperparameters::DEFAULT_DISCOUNT_FACTOR)]
    pub discount: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the environment after every step
    #[arg(long)]
    pub render: bool,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Print the learned policy after the run
    #[arg(long)]
    pub print_policy: bool,

    /// Write a JSON summary of the run to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl RunArgs {
    fn selection(&self) -> ActionSelection {
        if self.use_policy {
            ActionSelection::Exploit
        } else if let Some(epsilon) = self.epsilon {
            ActionSelection::EpsilonGreedy { epsilon }
        } else if let Some(explore_episodes) = self.explore_episodes {
            ActionSelection::Split { explore_episodes }
        } else {
            ActionSelection::Explore
        }
    }

    fn learns(&self) -> bool {
        !(self.use_policy || self.no_learn)
    }

    fn training_config(&self) -> TrainingConfig {
        TrainingConfig::default()
            .with_episodes(self.episodes)
            .with_selection(self.selection())
            .with_learning(self.learns())
            .with_render(self.render)
            .with_seed(self.seed)
    }

    fn agent_config(&self) -> AgentConfig {
        let config = AgentConfig::new(self.target.agent)
            .with_learning_rate(self.learning_rate)
            .with_discount_factor(self.discount);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    fn overrides_hyperparameters(&self) -> bool {
        self.learning_rate != Hyperparameters::DEFAULT_LEARNING_RATE
            || self.discount != Hyperparameters::DEFAULT_DISCOUNT_FACTOR
    }
}

#[derive(Debug, Serialize)]
struct RunSummaryFile {
    environment: EnvId,
    agent: AgentKind,
    config: TrainingConfig,
    result: RunResult,
    metrics: MetricsSummary,
    stored_states: usize,
    saved: bool,
}

/// Normalize a summary path so it always names a `.json` file.
fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("run_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs().to_string())
        .unwrap_or_default()
}

/// Load the stored agent for the target, or build a fresh one when none is
/// stored.
fn load_or_build(
    repo: &dyn PolicyRepository,
    args: &RunArgs,
    action_space: ActionSpace,
) -> Result<(Box<dyn Agent>, TrainingMetadata)> {
    let env_id = args.target.env.as_str();
    let kind = args.target.agent;

    let Some(saved) = repo
        .load(env_id, kind)
        .with_context(|| format!("failed to load stored {kind} policy for {env_id}"))?
    else {
        info!(env = env_id, agent = %kind, "no stored policy, building a fresh agent");
        let agent = build_agent(&args.agent_config(), action_space)?;
        return Ok((agent, TrainingMetadata::default()));
    };

    if saved.kind != kind {
        return Err(anyhow!(
            "stored policy for {env_id} holds a {} agent, expected {kind}",
            saved.kind
        ));
    }
    if saved.n_actions != action_space.size() {
        return Err(anyhow!(
            "stored policy has {} actions but {env_id} has {}",
            saved.n_actions,
            action_space.size()
        ));
    }
    if args.overrides_hyperparameters() {
        warn!("hyperparameter flags are ignored for a stored agent");
    }

    let metadata = saved.metadata.clone();
    let agent = saved
        .into_agent()
        .with_context(|| format!("stored {kind} policy for {env_id} is unusable"))?;
    Ok((agent, metadata))
}

pub fn execute(args: RunArgs) -> Result<()> {
    let repo = args.target.repository();
    let env_id = args.target.env;
    let kind = args.target.agent;

    let mut environment = env::make(env_id);
    let (mut agent, mut metadata) = load_or_build(&repo, &args, environment.action_space())?;

    let config = args.training_config();
    let metrics = MetricsObserver::new();
    let mut pipeline =
        TrainingPipeline::new(config.clone()).with_observer(Box::new(metrics.clone()));
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }

    let result = pipeline
        .run(environment.as_mut(), agent.as_mut())
        .with_context(|| format!("run of {kind} on {env_id} failed"))?;
    environment.close();

    output::print_section(&format!("{kind} on {env_id}"));
    output::print_run_result(&result);

    if args.print_policy {
        println!("\n{}", agent.describe());
    }

    if config.learn {
        metadata.episodes_trained += result.episodes;
    }
    metadata.environment = Some(env_id.to_string());
    metadata.seed = args.seed;

    if !args.no_save {
        metadata.saved_at = Some(unix_timestamp());
    }
    let snapshot = SavedAgent::from_agent(agent.as_ref(), metadata);
    if !args.no_save {
        repo.save(env_id.as_str(), kind, &snapshot)
            .with_context(|| format!("failed to save {kind} policy for {env_id}"))?;
        println!(
            "\nPolicy saved to {}",
            repo.path_for(env_id.as_str(), kind).display()
        );
    }

    if let Some(raw) = &args.summary {
        let summary_path = sanitize_summary_path(raw);
        if summary_path != *raw {
            println!("\nNormalizing summary path to {}", summary_path.display());
        }
        if let Some(parent) = summary_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let summary = RunSummaryFile {
            environment: env_id,
            agent: kind,
            config,
            result,
            metrics: metrics.summary(),
            stored_states: snapshot.table_len(),
            saved: !args.no_save,
        };

        let file = File::create(&summary_path)
            .with_context(|| format!("failed to create {}", summary_path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}
