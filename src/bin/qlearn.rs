//! qlearn CLI - Run tabular agents in simple environments
//!
//! This CLI provides:
//! - Running a random or Q-learning agent in frozen-lake or cart-pole
//! - Persisting the learned policy between runs
//! - Inspecting stored policies

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qlearn")]
#[command(version, about = "Tabular reinforcement-learning agents", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an agent for a number of episodes, learning and saving by default
    Run(Box<qlearn::cli::commands::run::RunArgs>),

    /// Show a stored policy
    Inspect(qlearn::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("qlearn={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run(args) => qlearn::cli::commands::run::execute(*args),
        Commands::Inspect(args) => qlearn::cli::commands::inspect::execute(args),
    }
}
