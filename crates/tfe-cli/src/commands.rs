//! Command dispatch.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use serde_json::json;
use tfe_client::{
    HttpTransport, PollSettings, RunOrchestrator, Transport, VariableStore, WorkspaceResolver,
};
use tfe_core::{RunResult, TfeError, VariableSpec};
use tracing::{info, warn};

use crate::cli::{Cli, Command, VarsCommand};

/// Everything a command needs to reach the workspace.
struct Target {
    transport: Arc<dyn Transport>,
    organization: String,
    workspace: String,
    settings: PollSettings,
}

impl Target {
    async fn orchestrator(&self) -> anyhow::Result<RunOrchestrator> {
        let orchestrator =
            RunOrchestrator::connect(self.transport.clone(), &self.organization, &self.workspace)
                .await
                .with_context(|| format!("resolving workspace '{}'", self.workspace))?;
        Ok(orchestrator.with_settings(self.settings))
    }

    fn variables(&self) -> VariableStore {
        VariableStore::new(self.transport.clone(), &self.organization, &self.workspace)
    }
}

/// Execute the parsed command against the remote API.
pub async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.client_config();
    let target = Target {
        transport: Arc::new(HttpTransport::new(&config)),
        organization: config.organization.clone(),
        workspace: cli.workspace.clone(),
        settings: cli.poll_settings(),
    };

    match cli.command {
        Command::Workspace => {
            let id = WorkspaceResolver::new(target.transport.clone(), &target.organization)
                .resolve(&target.workspace)
                .await
                .with_context(|| format!("resolving workspace '{}'", target.workspace))?;
            println!("{}", id);
        }
        Command::Run { kind, destroy } => {
            let result = target
                .orchestrator()
                .await?
                .request_run_and_wait(kind, destroy)
                .await?;
            return Ok(exit_code(report(&result)?));
        }
        Command::Apply { run_id, destroy } => {
            let run = target.orchestrator().await?.apply_run(&run_id, destroy).await?;
            print_json(&run)?;
        }
        Command::Wait { run_id, kind } => {
            let run = target
                .orchestrator()
                .await?
                .wait_for_terminal(&run_id, kind)
                .await?;
            let outcome = run.outcome();
            print_json(&json!({ "run": run, "outcome": outcome }))?;
            return Ok(exit_code(outcome.is_success()));
        }
        Command::Status { run_id } => {
            println!("{}", target.orchestrator().await?.run_status(&run_id).await?);
        }
        Command::Runs => {
            print_json(&target.orchestrator().await?.list_runs().await?)?;
        }
        Command::Log { run_id, kind } => {
            let url = target.orchestrator().await?.log_read_url(&run_id, kind).await?;
            println!("{}", url);
        }
        Command::Discard { run_id: Some(run_id) } => {
            target.orchestrator().await?.discard_run(&run_id).await?;
            info!(run_id = %run_id, "Successfully discarded run");
        }
        Command::Discard { run_id: None } => {
            let count = target.orchestrator().await?.discard_pending_runs().await?;
            info!(count, "pending runs cleared");
        }
        Command::Vars { command } => vars(&target.variables(), command).await?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn vars(store: &VariableStore, command: VarsCommand) -> anyhow::Result<()> {
    match command {
        VarsCommand::List => print_json(&store.list().await?)?,
        VarsCommand::Set {
            key,
            value,
            category,
            sensitive,
            hcl,
        } => {
            let spec = VariableSpec::new(key, value, category)
                .sensitive(sensitive)
                .hcl(hcl);
            store.upsert(&spec).await?;
        }
        VarsCommand::Delete { key } => store.delete_by_key(&key).await?,
        VarsCommand::Clear => {
            let count = store.delete_all().await?;
            info!(count, workspace = %store.workspace(), "variables deleted");
        }
    }
    Ok(())
}

/// Print the run result. Returns whether it counts as a success.
fn report(result: &RunResult) -> anyhow::Result<bool> {
    match result {
        RunResult::Completed { run, outcome } => {
            print_json(&json!({ "run": run, "outcome": outcome }))?;
            Ok(outcome.is_success())
        }
        RunResult::SubmissionFailed { error } => {
            warn!(error = %error, "run was not submitted");
            print_json(&json!({}))?;
            Ok(false)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Exit status used when retrying the command later may succeed.
const EXIT_RETRYABLE: u8 = 2;

/// True when the error chain holds a [`TfeError`] that a later retry might
/// get past (timeouts, connection failures, 5xx and 429 responses).
pub fn is_recoverable(err: &anyhow::Error) -> bool {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<TfeError>())
        .is_some_and(TfeError::is_recoverable)
}

/// Exit status for a command that failed with `err`.
pub fn failure_code(err: &anyhow::Error) -> ExitCode {
    if is_recoverable(err) {
        ExitCode::from(EXIT_RETRYABLE)
    } else {
        ExitCode::FAILURE
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
