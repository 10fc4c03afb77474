//! Runs, run actions and the result of a run request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Resource;
use crate::error::TfeError;
use crate::types::{RunOutcome, RunStatus};

/// One plan, or plan + apply, execution against a workspace.
///
/// Runs are owned by the remote system; the client only reads them and
/// requests transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Resource<RunAttributes>", into = "Resource<RunAttributes>")]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    /// Only meaningful once the run has reached `planned`.
    pub has_changes: bool,
    pub is_destroy: bool,
    pub message: Option<String>,
    pub source: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Wire attributes of a `runs` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunAttributes {
    pub status: RunStatus,
    #[serde(default)]
    pub has_changes: bool,
    #[serde(default)]
    pub is_destroy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Resource<RunAttributes>> for Run {
    fn from(resource: Resource<RunAttributes>) -> Self {
        let attrs = resource.attributes;
        Self {
            id: resource.id,
            status: attrs.status,
            has_changes: attrs.has_changes,
            is_destroy: attrs.is_destroy,
            message: attrs.message,
            source: attrs.source,
            created_at: attrs.created_at,
        }
    }
}

impl From<Run> for Resource<RunAttributes> {
    fn from(run: Run) -> Self {
        Resource {
            id: run.id,
            kind: "runs".to_string(),
            attributes: RunAttributes {
                status: run.status,
                has_changes: run.has_changes,
                is_destroy: run.is_destroy,
                message: run.message,
                source: run.source,
                created_at: run.created_at,
            },
        }
    }
}

impl Run {
    /// Classify this run's status.
    pub fn outcome(&self) -> RunOutcome {
        RunOutcome::classify(self.status, self.has_changes)
    }
}

/// The plan or apply record attached to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Resource<RunActionAttributes>")]
pub struct RunAction {
    pub id: String,
    pub status: String,
    /// Temporary URL the action's log can be read from.
    pub log_read_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunActionAttributes {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub log_read_url: Option<String>,
}

impl From<Resource<RunActionAttributes>> for RunAction {
    fn from(resource: Resource<RunActionAttributes>) -> Self {
        Self {
            id: resource.id,
            status: resource.attributes.status,
            log_read_url: resource.attributes.log_read_url,
        }
    }
}

/// Result of a top-level run request.
///
/// A failed run submission is reported here rather than as an error, so a
/// pipeline polling several workspaces keeps going when one of them rejects
/// the new run. Every other failure is still returned as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum RunResult {
    /// The run reached a terminal status.
    Completed { run: Run, outcome: RunOutcome },
    /// The create-run request was rejected; nothing was polled.
    SubmissionFailed { error: TfeError },
}

impl RunResult {
    /// The terminal run record, if the submission went through.
    pub fn run(&self) -> Option<&Run> {
        match self {
            RunResult::Completed { run, .. } => Some(run),
            RunResult::SubmissionFailed { .. } => None,
        }
    }

    /// The classified outcome, if the submission went through.
    pub fn outcome(&self) -> Option<RunOutcome> {
        match self {
            RunResult::Completed { outcome, .. } => Some(*outcome),
            RunResult::SubmissionFailed { .. } => None,
        }
    }

    /// True when there is no run record.
    pub fn is_empty(&self) -> bool {
        matches!(self, RunResult::SubmissionFailed { .. })
    }
}
