//! In-memory fakes for the client's collaborators.
//!
//! [`MockTransport`] answers from scripted responses and records every
//! request, so callers can assert on the exact sequence of remote calls
//! without a network. [`RecordingSleeper`] and [`RecordingObserver`] do the
//! same for the delay primitive and the observability sink.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tfe_core::{Result, Run, RunKind, RunOutcome, RunStatus, TfeError};

use crate::observer::RunObserver;
use crate::sleep::Sleeper;
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scripted [`Transport`].
///
/// Responses are queued per `(method, path)`. Each request pops the next
/// queued response; the last one is sticky and keeps answering once the
/// queue is down to it. Unscripted routes answer 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method path`.
    pub fn respond(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.push(method, path, status, body);
        self
    }

    /// Queue a response on a shared reference.
    pub fn push(&self, method: Method, path: &str, status: u16, body: Value) {
        lock(&self.routes)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse::new(status, body));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received for `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Requests whose path ends with `suffix`, e.g. `/actions/discard`.
    pub fn requests_ending_with(&self, method: Method, suffix: &str) -> Vec<ApiRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(suffix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let key = (request.method, request.path.clone());
        lock(&self.requests).push(request);

        let mut routes = lock(&self.routes);
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(response.unwrap_or_else(|| {
            ApiResponse::new(
                404,
                json!({"errors": [{"status": "404", "title": "not found"}]}),
            )
        }))
    }
}

/// JSON:API body for a single run.
pub fn run_body(id: &str, status: RunStatus, has_changes: bool) -> Value {
    json!({ "data": run_resource(id, status, has_changes) })
}

/// JSON:API resource object for a run, for use inside list bodies.
pub fn run_resource(id: &str, status: RunStatus, has_changes: bool) -> Value {
    json!({
        "id": id,
        "type": "runs",
        "attributes": {
            "status": status.as_str(),
            "has-changes": has_changes,
            "is-destroy": false
        }
    })
}

/// JSON:API list body for a workspace's runs.
pub fn runs_list_body(runs: &[(&str, RunStatus)]) -> Value {
    let data: Vec<Value> = runs
        .iter()
        .map(|(id, status)| run_resource(id, *status, false))
        .collect();
    json!({ "data": data })
}

/// [`Sleeper`] that returns immediately and remembers every requested delay.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Duration> {
        lock(&self.calls).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.calls).push(duration);
    }
}

/// An observation captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    DiscardingPending { workspace_id: String },
    Discarded { run_id: String },
    Submitted { run_id: String },
    Progress { run_id: String, kind: RunKind, elapsed: Duration, status: RunStatus },
    Classified { run_id: String, outcome: RunOutcome },
    SubmissionFailed { error: TfeError },
}

/// [`RunObserver`] that stores every observation in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Observation>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Observation> {
        lock(&self.events).clone()
    }

    fn record(&self, observation: Observation) {
        lock(&self.events).push(observation);
    }
}

impl RunObserver for RecordingObserver {
    fn discarding_pending(&self, workspace_id: &str) {
        self.record(Observation::DiscardingPending {
            workspace_id: workspace_id.to_string(),
        });
    }

    fn run_discarded(&self, run_id: &str) {
        self.record(Observation::Discarded {
            run_id: run_id.to_string(),
        });
    }

    fn run_submitted(&self, run: &Run) {
        self.record(Observation::Submitted {
            run_id: run.id.clone(),
        });
    }

    fn poll_progress(&self, run_id: &str, kind: RunKind, elapsed: Duration, status: RunStatus) {
        self.record(Observation::Progress {
            run_id: run_id.to_string(),
            kind,
            elapsed,
            status,
        });
    }

    fn run_classified(&self, run: &Run, outcome: RunOutcome) {
        self.record(Observation::Classified {
            run_id: run.id.clone(),
            outcome,
        });
    }

    fn submission_failed(&self, error: &TfeError) {
        self.record(Observation::SubmissionFailed {
            error: error.clone(),
        });
    }
}
