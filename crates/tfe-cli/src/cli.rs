//! Command-line arguments.

use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tfe_client::{ClientConfig, PollSettings, DEFAULT_BASE_URL};
use tfe_core::{RunKind, VariableCategory};

/// Drive plan/apply runs and workspace variables.
#[derive(Debug, Parser)]
#[command(name = "tfe-runs", version, about)]
pub struct Cli {
    /// API token.
    #[arg(long, env = "TFE_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Organization owning the workspace.
    #[arg(long, env = "TFE_ORGANIZATION")]
    pub organization: String,

    /// Workspace name.
    #[arg(long, env = "TFE_WORKSPACE")]
    pub workspace: String,

    /// API base URL.
    #[arg(long, env = "TFE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds between status checks.
    #[arg(long, default_value_t = 10)]
    pub poll_interval: u64,

    /// Status checks before a wait gives up.
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_polls: u32,

    /// Listing passes before discarding pending runs gives up.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_discard_passes: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discard stale plans, submit a new run and wait for it to settle.
    Run {
        /// `plan` or `apply`.
        #[arg(default_value = "plan", value_parser = RunKind::from_str)]
        kind: RunKind,

        /// Plan a destroy.
        #[arg(long)]
        destroy: bool,
    },

    /// Apply an existing planned run.
    Apply {
        run_id: String,

        /// Set the destroy confirmation flag first.
        #[arg(long)]
        destroy: bool,
    },

    /// Wait for a run to leave planning/applying.
    Wait {
        run_id: String,

        #[arg(long, default_value = "plan", value_parser = RunKind::from_str)]
        kind: RunKind,
    },

    /// Print the status of a run.
    Status { run_id: String },

    /// List the workspace's runs.
    Runs,

    /// Print the log URL of a run's plan or apply.
    Log {
        run_id: String,

        #[arg(long, default_value = "plan", value_parser = RunKind::from_str)]
        kind: RunKind,
    },

    /// Discard one run, or every pending plan when no id is given.
    Discard { run_id: Option<String> },

    /// Print the workspace id.
    Workspace,

    /// Manage workspace variables.
    Vars {
        #[command(subcommand)]
        command: VarsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum VarsCommand {
    /// List variables.
    List,

    /// Create or update a variable.
    Set {
        key: String,
        value: String,

        /// `env` or `terraform`.
        #[arg(long, default_value = "terraform", value_parser = VariableCategory::from_str)]
        category: VariableCategory,

        #[arg(long)]
        sensitive: bool,

        /// Treat the value as an HCL expression.
        #[arg(long)]
        hcl: bool,
    },

    /// Delete a variable by key.
    Delete { key: String },

    /// Delete every variable.
    Clear,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.organization, &self.token).with_base_url(&self.base_url)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::default()
            .with_interval(Duration::from_secs(self.poll_interval))
            .with_max_polls(self.max_polls)
            .with_max_discard_passes(self.max_discard_passes)
    }
}
