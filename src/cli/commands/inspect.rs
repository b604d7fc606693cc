//! Inspect command - Show a stored policy

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{config::PolicyTarget, output},
    ports::PolicyRepository,
};

#[derive(Parser, Debug)]
#[command(about = "Show a stored policy")]
pub struct InspectArgs {
    #[command(flatten)]
    pub target: PolicyTarget,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let repo = args.target.repository();
    let env_id = args.target.env.as_str();
    let kind = args.target.agent;

    let Some(saved) = repo
        .load(env_id, kind)
        .with_context(|| format!("failed to load stored {kind} policy for {env_id}"))?
    else {
        println!(
            "No stored policy for {kind} on {env_id} (looked in {})",
            repo.path_for(env_id, kind).display()
        );
        return Ok(());
    };

    output::print_section(&format!("{kind} on {env_id}"));
    output::print_saved_agent(&saved);

    let agent = saved
        .into_agent()
        .with_context(|| format!("stored {kind} policy for {env_id} is unusable"))?;
    println!("\n{}", agent.describe());

    Ok(())
}
