//! Run lifecycle orchestration.
//!
//! [`RunOrchestrator`] is scoped to one workspace. It submits runs, clears
//! stale plans that would block a new one, polls until a run settles and
//! classifies the result. All network I/O goes through the shared
//! [`Transport`]; delays go through the injected [`Sleeper`] and progress is
//! reported to the injected [`RunObserver`].

use std::sync::Arc;

use tfe_core::document::{action_payload, run_create_payload, DISCARD_COMMENT};
use tfe_core::{
    DiscardDisposition, Result, Run, RunAction, RunKind, RunResult, RunStatus, TfeError,
    VariableSpec,
};
use tracing::{debug, info, warn};

use crate::config::PollSettings;
use crate::observer::{RunObserver, TracingObserver};
use crate::sleep::{Sleeper, TokioSleeper};
use crate::transport::Transport;
use crate::variables::VariableStore;
use crate::workspace::WorkspaceResolver;

/// Submits, discards, polls and classifies runs for one workspace.
///
/// Not meant to be shared across tasks; build one per workspace. Several
/// orchestrators can share the same transport.
pub struct RunOrchestrator {
    transport: Arc<dyn Transport>,
    variables: VariableStore,
    workspace_id: String,
    settings: PollSettings,
    sleeper: Arc<dyn Sleeper>,
    observer: Arc<dyn RunObserver>,
}

impl RunOrchestrator {
    /// Resolve `workspace` by name and build an orchestrator for it.
    pub async fn connect(
        transport: Arc<dyn Transport>,
        organization: &str,
        workspace: &str,
    ) -> Result<Self> {
        let workspace_id = WorkspaceResolver::new(transport.clone(), organization)
            .resolve(workspace)
            .await?;
        debug!(workspace, workspace_id = %workspace_id, "resolved workspace");
        Ok(Self::new(transport, organization, workspace, workspace_id))
    }

    /// Build an orchestrator for an already-resolved workspace.
    pub fn new(
        transport: Arc<dyn Transport>,
        organization: impl Into<String>,
        workspace: impl Into<String>,
        workspace_id: impl Into<String>,
    ) -> Self {
        Self {
            variables: VariableStore::new(transport.clone(), organization, workspace),
            transport,
            workspace_id: workspace_id.into(),
            settings: PollSettings::default(),
            sleeper: Arc::new(TokioSleeper),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// The variable store for this orchestrator's workspace.
    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn get_run(&self, run_id: &str) -> Result<Run> {
        let response = self.transport.get(&format!("/runs/{}", run_id)).await?;
        if !response.is_success() {
            return Err(TfeError::not_found("Run", run_id));
        }
        response.data()
    }

    pub async fn run_status(&self, run_id: &str) -> Result<RunStatus> {
        Ok(self.get_run(run_id).await?.status)
    }

    /// All runs of the workspace (first page only).
    pub async fn list_runs(&self) -> Result<Vec<Run>> {
        let path = format!("/workspaces/{}/runs", self.workspace_id);
        let response = self.transport.get(&path).await?;
        if !response.is_success() {
            return Err(TfeError::not_found("Workspace runs", &self.workspace_id));
        }
        response.data()
    }

    /// The plan or apply record of a run.
    pub async fn run_action(&self, run_id: &str, kind: RunKind) -> Result<RunAction> {
        let path = format!("/runs/{}/{}", run_id, kind.as_str());
        let response = self.transport.get(&path).await?;
        if !response.is_success() {
            return Err(TfeError::not_found(format!("Run {}", kind), run_id));
        }
        response.data()
    }

    /// URL the plan or apply log of a run can be read from.
    pub async fn log_read_url(&self, run_id: &str, kind: RunKind) -> Result<String> {
        self.run_action(run_id, kind)
            .await?
            .log_read_url
            .ok_or_else(|| TfeError::not_found(format!("Run {} log", kind), run_id))
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Discard stale plans, set the destroy flag if needed, then create a
    /// new run.
    pub async fn submit_run(&self, destroy: bool) -> Result<Run> {
        self.prepare_submission(destroy).await?;
        self.create_run(destroy).await
    }

    /// Apply a run that has already been planned.
    ///
    /// Returns the run as it stands right after the apply was accepted.
    pub async fn apply_run(&self, run_id: &str, destroy: bool) -> Result<Run> {
        if destroy {
            self.confirm_destroy().await?;
        }

        let path = format!("/runs/{}/actions/apply", run_id);
        let response = self.transport.post(&path, action_payload(None)).await?;
        if !response.is_success() {
            return Err(response.into_remote_failure());
        }

        info!(run_id, "apply requested");
        self.get_run(run_id).await
    }

    /// Discard a single run.
    ///
    /// 409 and 422 mean the run is past the point where it can be discarded
    /// and become [`TfeError::Conflict`]; any other failure is a
    /// [`TfeError::RemoteFailure`].
    pub async fn discard_run(&self, run_id: &str) -> Result<()> {
        let path = format!("/runs/{}/actions/discard", run_id);
        let response = self
            .transport
            .post(&path, action_payload(Some(DISCARD_COMMENT)))
            .await?;

        match response.status {
            status if (200..300).contains(&status) => Ok(()),
            409 | 422 => Err(TfeError::Conflict {
                message: format!(
                    "run {} cannot be discarded: {}",
                    run_id,
                    response.error_message()
                ),
            }),
            _ => Err(response.into_remote_failure()),
        }
    }

    /// Discard every `planned` run and wait until no run is `pending`,
    /// `planning` or `planned`.
    ///
    /// Discards complete asynchronously, so the run list is fetched again on
    /// every pass. Runs that are `pending` or `planning` are waited out, not
    /// discarded. A discard that loses the race with the remote side
    /// ([`TfeError::Conflict`]) is logged and the loop carries on.
    ///
    /// Returns the number of discard actions accepted.
    pub async fn discard_pending_runs(&self) -> Result<usize> {
        self.observer.discarding_pending(&self.workspace_id);

        let max_passes = self.settings.max_discard_passes;
        let mut discarded = 0;

        for pass in 0..max_passes {
            let runs = self.list_runs().await?;
            let mut blocking = 0;

            for run in &runs {
                match run.status.discard_disposition() {
                    DiscardDisposition::Settled => {}
                    DiscardDisposition::Transient => blocking += 1,
                    DiscardDisposition::Discardable => {
                        blocking += 1;
                        match self.discard_run(&run.id).await {
                            Ok(()) => {
                                self.observer.run_discarded(&run.id);
                                discarded += 1;
                            }
                            Err(TfeError::Conflict { message }) => {
                                warn!(run_id = %run.id, %message, "discard rejected, re-checking");
                            }
                            Err(e) => return Err(e),
                        }
                    }
                }
            }

            if blocking == 0 {
                return Ok(discarded);
            }

            debug!(pass, blocking, "waiting for pending runs to settle");
            if pass + 1 < max_passes {
                self.sleeper.sleep(self.settings.interval).await;
            }
        }

        Err(TfeError::Timeout {
            attempts: max_passes,
            message: format!(
                "pending runs in workspace {} did not settle",
                self.workspace_id
            ),
        })
    }

    /// Poll a run until it leaves `planning`/`applying`.
    ///
    /// Sleeps between polls only, never before the first or after the last.
    pub async fn wait_for_terminal(&self, run_id: &str, kind: RunKind) -> Result<Run> {
        let max_polls = self.settings.max_polls;
        let interval = self.settings.interval;

        for attempt in 0..max_polls {
            let run = self.get_run(run_id).await?;
            if run.status.is_terminal() {
                return Ok(run);
            }

            self.observer
                .poll_progress(run_id, kind, interval * attempt, run.status);

            if attempt + 1 < max_polls {
                self.sleeper.sleep(interval).await;
            }
        }

        Err(TfeError::Timeout {
            attempts: max_polls,
            message: format!("run {} did not finish {}", run_id, kind.progress_label()),
        })
    }

    /// Submit a run, wait for it to settle and classify the result.
    ///
    /// If the create-run request itself is rejected, the rejection is
    /// returned as [`RunResult::SubmissionFailed`] rather than `Err`. Errors
    /// from discarding, the destroy flag or polling are still propagated.
    pub async fn request_run_and_wait(&self, kind: RunKind, destroy: bool) -> Result<RunResult> {
        self.prepare_submission(destroy).await?;

        let run = match self.create_run(destroy).await {
            Ok(run) => run,
            Err(error @ TfeError::RemoteFailure { .. }) => {
                self.observer.submission_failed(&error);
                return Ok(RunResult::SubmissionFailed { error });
            }
            Err(e) => return Err(e),
        };

        let run = self.wait_for_terminal(&run.id, kind).await?;
        let outcome = run.outcome();
        self.observer.run_classified(&run, outcome);

        Ok(RunResult::Completed { run, outcome })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn prepare_submission(&self, destroy: bool) -> Result<()> {
        self.discard_pending_runs().await?;
        if destroy {
            self.confirm_destroy().await?;
        }
        Ok(())
    }

    async fn confirm_destroy(&self) -> Result<()> {
        self.variables.upsert(&VariableSpec::confirm_destroy()).await
    }

    async fn create_run(&self, destroy: bool) -> Result<Run> {
        let body = run_create_payload(&self.workspace_id, destroy);
        let response = self.transport.post("/runs", body).await?;
        if !response.is_success() {
            return Err(response.into_remote_failure());
        }

        let run: Run = response.data()?;
        self.observer.run_submitted(&run);
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::{json, Value};
    use tfe_core::RunOutcome;

    use crate::mock::{
        run_body, runs_list_body, MockTransport, Observation, RecordingObserver, RecordingSleeper,
    };
    use crate::transport::Method;

    const RUNS: &str = "/workspaces/ws-1/runs";

    struct Harness {
        transport: Arc<MockTransport>,
        sleeper: Arc<RecordingSleeper>,
        observer: Arc<RecordingObserver>,
        orchestrator: RunOrchestrator,
    }

    fn harness(transport: MockTransport, settings: PollSettings) -> Harness {
        let transport = Arc::new(transport);
        let sleeper = Arc::new(RecordingSleeper::new());
        let observer = Arc::new(RecordingObserver::new());
        let orchestrator = RunOrchestrator::new(transport.clone(), "acme", "staging", "ws-1")
            .with_settings(settings)
            .with_sleeper(sleeper.clone())
            .with_observer(observer.clone());
        Harness {
            transport,
            sleeper,
            observer,
            orchestrator,
        }
    }

    fn settings() -> PollSettings {
        PollSettings::default().with_max_polls(5).with_max_discard_passes(4)
    }

    fn calls(transport: &MockTransport) -> Vec<(Method, String)> {
        transport
            .requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_terminal() {
        let transport = MockTransport::new().respond(
            Method::Get,
            "/runs/run-1",
            200,
            run_body("run-1", RunStatus::Errored, false),
        );
        let h = harness(transport, settings());

        let run = h.orchestrator.wait_for_terminal("run-1", RunKind::Plan).await.unwrap();

        assert_eq!(run.status, RunStatus::Errored);
        assert_eq!(h.sleeper.count(), 0);
        assert_eq!(h.transport.count(Method::Get, "/runs/run-1"), 1);
        assert!(h.observer.events().is_empty());
    }

    #[tokio::test]
    async fn test_wait_sleeps_between_polls() {
        let transport = MockTransport::new()
            .respond(Method::Get, "/runs/run-1", 200, run_body("run-1", RunStatus::Planning, false))
            .respond(Method::Get, "/runs/run-1", 200, run_body("run-1", RunStatus::Planning, false))
            .respond(Method::Get, "/runs/run-1", 200, run_body("run-1", RunStatus::Planned, true));
        let h = harness(transport, settings());

        let run = h.orchestrator.wait_for_terminal("run-1", RunKind::Plan).await.unwrap();

        assert_eq!(run.status, RunStatus::Planned);
        assert_eq!(h.transport.count(Method::Get, "/runs/run-1"), 3);
        assert_eq!(h.sleeper.calls(), vec![Duration::from_secs(10); 2]);
        assert_eq!(
            h.observer.events(),
            vec![
                Observation::Progress {
                    run_id: "run-1".into(),
                    kind: RunKind::Plan,
                    elapsed: Duration::from_secs(0),
                    status: RunStatus::Planning,
                },
                Observation::Progress {
                    run_id: "run-1".into(),
                    kind: RunKind::Plan,
                    elapsed: Duration::from_secs(10),
                    status: RunStatus::Planning,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_wait_times_out_on_last_poll() {
        let transport = MockTransport::new().respond(
            Method::Get,
            "/runs/run-1",
            200,
            run_body("run-1", RunStatus::Applying, false),
        );
        let h = harness(transport, settings());

        let err = h
            .orchestrator
            .wait_for_terminal("run-1", RunKind::Apply)
            .await
            .unwrap_err();

        assert!(matches!(err, TfeError::Timeout { attempts: 5, .. }));
        assert_eq!(h.transport.count(Method::Get, "/runs/run-1"), 5);
        assert_eq!(h.sleeper.count(), 4);
    }

    #[tokio::test]
    async fn test_wait_missing_run_is_not_found() {
        let h = harness(MockTransport::new(), settings());
        let err = h
            .orchestrator
            .wait_for_terminal("run-404", RunKind::Plan)
            .await
            .unwrap_err();
        assert!(matches!(err, TfeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_discard_only_planned_runs_until_settled() {
        let transport = MockTransport::new()
            .respond(
                Method::Get,
                RUNS,
                200,
                runs_list_body(&[
                    ("a", RunStatus::Planned),
                    ("b", RunStatus::Pending),
                    ("c", RunStatus::Applied),
                ]),
            )
            .respond(
                Method::Get,
                RUNS,
                200,
                runs_list_body(&[("a", RunStatus::Discarded), ("b", RunStatus::Planning)]),
            )
            .respond(
                Method::Get,
                RUNS,
                200,
                runs_list_body(&[("a", RunStatus::Discarded), ("b", RunStatus::Planned)]),
            )
            .respond(
                Method::Get,
                RUNS,
                200,
                runs_list_body(&[("a", RunStatus::Discarded), ("b", RunStatus::Discarded)]),
            )
            .respond(Method::Post, "/runs/a/actions/discard", 202, Value::Null)
            .respond(Method::Post, "/runs/b/actions/discard", 202, Value::Null);
        let h = harness(transport, settings());

        let discarded = h.orchestrator.discard_pending_runs().await.unwrap();

        assert_eq!(discarded, 2);
        assert_eq!(h.transport.count(Method::Get, RUNS), 4);
        assert_eq!(h.transport.count(Method::Post, "/runs/a/actions/discard"), 1);
        assert_eq!(h.transport.count(Method::Post, "/runs/b/actions/discard"), 1);
        assert_eq!(h.transport.count(Method::Post, "/runs/c/actions/discard"), 0);
        assert_eq!(h.sleeper.count(), 3);

        let body = h.transport.requests_ending_with(Method::Post, "/runs/a/actions/discard")[0]
            .body
            .clone()
            .unwrap();
        assert_eq!(body, json!({"comment": "Dropped by automated pipeline build"}));
    }

    #[tokio::test]
    async fn test_discard_clean_workspace_single_pass() {
        let transport = MockTransport::new().respond(
            Method::Get,
            RUNS,
            200,
            runs_list_body(&[("a", RunStatus::Applied), ("b", RunStatus::Errored)]),
        );
        let h = harness(transport, settings());

        assert_eq!(h.orchestrator.discard_pending_runs().await.unwrap(), 0);
        assert_eq!(h.transport.count(Method::Get, RUNS), 1);
        assert_eq!(h.sleeper.count(), 0);
        assert!(h.transport.requests_ending_with(Method::Post, "/actions/discard").is_empty());
    }

    #[tokio::test]
    async fn test_discard_conflict_is_tolerated() {
        let transport = MockTransport::new()
            .respond(Method::Get, RUNS, 200, runs_list_body(&[("a", RunStatus::Planned)]))
            .respond(Method::Get, RUNS, 200, runs_list_body(&[("a", RunStatus::Discarded)]))
            .respond(
                Method::Post,
                "/runs/a/actions/discard",
                409,
                json!({"errors": [{"detail": "transition not allowed"}]}),
            );
        let h = harness(transport, settings());

        assert_eq!(h.orchestrator.discard_pending_runs().await.unwrap(), 0);
        assert_eq!(h.transport.count(Method::Get, RUNS), 2);
    }

    #[tokio::test]
    async fn test_discard_loop_is_bounded() {
        let transport = MockTransport::new().respond(
            Method::Get,
            RUNS,
            200,
            runs_list_body(&[("a", RunStatus::Planning)]),
        );
        let h = harness(transport, settings());

        let err = h.orchestrator.discard_pending_runs().await.unwrap_err();

        assert!(matches!(err, TfeError::Timeout { attempts: 4, .. }));
        assert_eq!(h.transport.count(Method::Get, RUNS), 4);
        assert_eq!(h.sleeper.count(), 3);
    }

    #[tokio::test]
    async fn test_discard_run_conflict() {
        let transport = MockTransport::new().respond(
            Method::Post,
            "/runs/a/actions/discard",
            409,
            json!({"errors": [{"detail": "already discarded"}]}),
        );
        let h = harness(transport, settings());

        let err = h.orchestrator.discard_run("a").await.unwrap_err();
        match err {
            TfeError::Conflict { message } => assert!(message.contains("already discarded")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_discard_forbidden_fails_fast() {
        let transport = MockTransport::new()
            .respond(Method::Get, RUNS, 200, runs_list_body(&[("a", RunStatus::Planned)]))
            .respond(
                Method::Post,
                "/runs/a/actions/discard",
                403,
                json!({"errors": [{"status": "403", "title": "forbidden"}]}),
            );
        let h = harness(transport, settings());

        let err = h.orchestrator.discard_run("a").await.unwrap_err();
        assert_eq!(
            err,
            TfeError::RemoteFailure { status: 403, message: "forbidden".into() }
        );

        let err = h.orchestrator.discard_pending_runs().await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(h.transport.count(Method::Post, "/runs/a/actions/discard"), 2);
        assert_eq!(h.transport.count(Method::Get, RUNS), 1);
        assert_eq!(h.sleeper.count(), 0);
    }

    #[tokio::test]
    async fn test_discard_run_server_error_is_remote_failure() {
        let transport =
            MockTransport::new().respond(Method::Post, "/runs/a/actions/discard", 503, Value::Null);
        let h = harness(transport, settings());

        let err = h.orchestrator.discard_run("a").await.unwrap_err();
        assert!(matches!(err, TfeError::RemoteFailure { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_destroy_apply_scenario() {
        let transport = MockTransport::new()
            .respond(
                Method::Get,
                RUNS,
                200,
                runs_list_body(&[("old-1", RunStatus::Planned), ("old-2", RunStatus::Planned)]),
            )
            .respond(
                Method::Get,
                RUNS,
                200,
                runs_list_body(&[("old-1", RunStatus::Discarded), ("old-2", RunStatus::Discarded)]),
            )
            .respond(Method::Post, "/runs/old-1/actions/discard", 202, Value::Null)
            .respond(Method::Post, "/runs/old-2/actions/discard", 202, Value::Null)
            .respond(Method::Get, "/vars", 200, json!({"data": []}))
            .respond(Method::Post, "/vars", 201, json!({}))
            .respond(Method::Post, "/runs", 201, run_body("run-new", RunStatus::Planning, false))
            .respond(Method::Get, "/runs/run-new", 200, run_body("run-new", RunStatus::Planning, true))
            .respond(Method::Get, "/runs/run-new", 200, run_body("run-new", RunStatus::Applying, true))
            .respond(Method::Get, "/runs/run-new", 200, run_body("run-new", RunStatus::Applied, true));
        let h = harness(transport, settings());

        let result = h
            .orchestrator
            .request_run_and_wait(RunKind::Apply, true)
            .await
            .unwrap();

        assert_eq!(result.outcome(), Some(RunOutcome::Applied));
        assert_eq!(result.run().map(|r| r.id.as_str()), Some("run-new"));

        assert_eq!(
            calls(&h.transport),
            vec![
                (Method::Get, RUNS.to_string()),
                (Method::Post, "/runs/old-1/actions/discard".to_string()),
                (Method::Post, "/runs/old-2/actions/discard".to_string()),
                (Method::Get, RUNS.to_string()),
                (Method::Get, "/vars".to_string()),
                (Method::Post, "/vars".to_string()),
                (Method::Post, "/runs".to_string()),
                (Method::Get, "/runs/run-new".to_string()),
                (Method::Get, "/runs/run-new".to_string()),
                (Method::Get, "/runs/run-new".to_string()),
            ]
        );

        let requests = h.transport.requests();
        let flag = requests[5].body.as_ref().unwrap();
        assert_eq!(flag["data"]["attributes"]["key"], "CONFIRM_DESTROY");
        assert_eq!(flag["data"]["attributes"]["value"], "1");
        assert_eq!(flag["data"]["attributes"]["category"], "env");

        let create = requests[6].body.as_ref().unwrap();
        assert_eq!(create["data"]["attributes"]["is-destroy"], true);
        assert_eq!(create["data"]["relationships"]["workspace"]["data"]["id"], "ws-1");

        assert_eq!(
            h.observer.events().last(),
            Some(&Observation::Classified {
                run_id: "run-new".into(),
                outcome: RunOutcome::Applied,
            })
        );
    }

    #[tokio::test]
    async fn test_plan_no_changes_scenario() {
        let transport = MockTransport::new()
            .respond(Method::Get, RUNS, 200, runs_list_body(&[("old", RunStatus::Applied)]))
            .respond(Method::Post, "/runs", 201, run_body("run-2", RunStatus::Planning, false))
            .respond(Method::Get, "/runs/run-2", 200, run_body("run-2", RunStatus::Planned, false));
        let h = harness(transport, settings());

        let result = h
            .orchestrator
            .request_run_and_wait(RunKind::Plan, false)
            .await
            .unwrap();

        assert_eq!(result.outcome(), Some(RunOutcome::PlannedNoChanges));
        assert!(h.transport.requests_ending_with(Method::Post, "/actions/discard").is_empty());
        assert_eq!(h.transport.count(Method::Get, "/vars"), 0);

        let create = h.transport.requests_ending_with(Method::Post, "/runs")[0]
            .body
            .clone()
            .unwrap();
        assert_eq!(create["data"]["attributes"]["is-destroy"], false);
    }

    #[tokio::test]
    async fn test_submission_failure_returns_empty_result() {
        let transport = MockTransport::new()
            .respond(Method::Get, RUNS, 200, json!({"data": []}))
            .respond(
                Method::Post,
                "/runs",
                409,
                json!({"errors": [{"detail": "workspace is locked"}]}),
            );
        let h = harness(transport, settings());

        let result = h
            .orchestrator
            .request_run_and_wait(RunKind::Plan, false)
            .await
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(
            result,
            RunResult::SubmissionFailed {
                error: TfeError::RemoteFailure {
                    status: 409,
                    message: "workspace is locked".into(),
                },
            }
        );
        assert!(h
            .transport
            .requests()
            .iter()
            .all(|r| !r.path.starts_with("/runs/")));
    }

    #[tokio::test]
    async fn test_submit_run_propagates_failure() {
        let transport = MockTransport::new()
            .respond(Method::Get, RUNS, 200, json!({"data": []}))
            .respond(Method::Post, "/runs", 500, Value::Null);
        let h = harness(transport, settings());

        let err = h.orchestrator.submit_run(false).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_apply_run_sets_flag_without_discarding() {
        let transport = MockTransport::new()
            .respond(
                Method::Get,
                "/vars",
                200,
                json!({"data": [{
                    "id": "var-5",
                    "type": "vars",
                    "attributes": {"key": "CONFIRM_DESTROY", "value": "0", "category": "env"}
                }]}),
            )
            .respond(Method::Patch, "/vars/var-5", 200, json!({}))
            .respond(Method::Post, "/runs/run-3/actions/apply", 202, Value::Null)
            .respond(Method::Get, "/runs/run-3", 200, run_body("run-3", RunStatus::Applying, true));
        let h = harness(transport, settings());

        let run = h.orchestrator.apply_run("run-3", true).await.unwrap();

        assert_eq!(run.status, RunStatus::Applying);
        assert_eq!(h.transport.count(Method::Get, RUNS), 0);
        assert_eq!(
            calls(&h.transport),
            vec![
                (Method::Get, "/vars".to_string()),
                (Method::Patch, "/vars/var-5".to_string()),
                (Method::Post, "/runs/run-3/actions/apply".to_string()),
                (Method::Get, "/runs/run-3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_log_read_url() {
        let transport = MockTransport::new().respond(
            Method::Get,
            "/runs/run-1/plan",
            200,
            json!({"data": {
                "id": "plan-1",
                "type": "plans",
                "attributes": {"status": "finished", "log-read-url": "https://logs.example/plan-1"}
            }}),
        );
        let h = harness(transport, settings());

        let url = h.orchestrator.log_read_url("run-1", RunKind::Plan).await.unwrap();
        assert_eq!(url, "https://logs.example/plan-1");

        let err = h.orchestrator.log_read_url("run-1", RunKind::Apply).await.unwrap_err();
        assert!(matches!(err, TfeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_connect_resolves_workspace() {
        let transport: Arc<dyn Transport> = Arc::new(MockTransport::new().respond(
            Method::Get,
            "/organizations/acme/workspaces",
            200,
            json!({"data": [{"id": "ws-77", "type": "workspaces", "attributes": {"name": "staging"}}]}),
        ));

        let orchestrator = RunOrchestrator::connect(transport, "acme", "staging").await.unwrap();
        assert_eq!(orchestrator.workspace_id(), "ws-77");
        assert_eq!(orchestrator.variables().workspace(), "staging");
    }
}
