//! Observability sink for run lifecycle events.

use std::time::Duration;

use tfe_core::{Run, RunKind, RunOutcome, RunStatus};
use tracing::{info, warn};

/// Receives progress and status observations from the run orchestrator.
///
/// All methods have no-op defaults except the two the orchestrator is
/// required to report: poll progress and terminal classification.
pub trait RunObserver: Send + Sync {
    /// The discard loop is about to start.
    fn discarding_pending(&self, _workspace_id: &str) {}

    /// A discard action was issued for a run.
    fn run_discarded(&self, _run_id: &str) {}

    /// A new run was accepted by the remote side.
    fn run_submitted(&self, _run: &Run) {}

    /// A status poll found the run still in progress.
    fn poll_progress(&self, run_id: &str, kind: RunKind, elapsed: Duration, status: RunStatus);

    /// A terminal run was classified.
    fn run_classified(&self, run: &Run, outcome: RunOutcome);

    /// The create-run request was rejected.
    fn submission_failed(&self, _error: &tfe_core::TfeError) {}
}

/// Default observer: forwards every observation to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn discarding_pending(&self, workspace_id: &str) {
        info!(workspace_id, "Discarding pending runs");
    }

    fn run_discarded(&self, run_id: &str) {
        info!(run_id, "Discarding: {}", run_id);
    }

    fn run_submitted(&self, run: &Run) {
        info!(run_id = %run.id, is_destroy = run.is_destroy, "New Run: {}", run.id);
    }

    fn poll_progress(&self, run_id: &str, kind: RunKind, elapsed: Duration, status: RunStatus) {
        info!(
            run_id,
            status = %status,
            elapsed_secs = elapsed.as_secs(),
            "Job Status: {} | {} seconds",
            kind.progress_label(),
            elapsed.as_secs()
        );
    }

    fn run_classified(&self, run: &Run, outcome: RunOutcome) {
        if outcome.is_success() {
            info!(run_id = %run.id, status = %run.status, "Job Status: {}", outcome.message());
        } else {
            warn!(run_id = %run.id, status = %run.status, "Job Status: {}", outcome.message());
        }
    }

    fn submission_failed(&self, error: &tfe_core::TfeError) {
        warn!(error = %error, "Run submission rejected");
    }
}
