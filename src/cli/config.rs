//! Shared configuration types for CLI commands

use std::path::PathBuf;

use clap::Args;

use crate::{adapters::MsgPackRepository, agents::AgentKind, env::EnvId};

/// Environment/agent pair addressing one stored policy
#[derive(Args, Debug, Clone)]
pub struct PolicyTarget {
    /// Environment to use
    #[arg(value_enum)]
    pub env: EnvId,

    /// Agent to use
    #[arg(value_enum)]
    pub agent: AgentKind,

    /// Directory holding saved policies
    #[arg(long, default_value = MsgPackRepository::DEFAULT_DIR)]
    pub models_dir: PathBuf,
}

impl PolicyTarget {
    pub fn repository(&self) -> MsgPackRepository {
        MsgPackRepository::new(self.models_dir.clone())
    }
}
