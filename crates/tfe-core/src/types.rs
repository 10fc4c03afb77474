//! Common enumerations shared by runs and variables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TfeError;

/// Status of a run as reported by the remote system.
///
/// Unrecognised status strings deserialize to [`RunStatus::Unknown`] so a new
/// server-side state never breaks polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Pending,
    PlanQueued,
    Planning,
    Planned,
    CostEstimating,
    CostEstimated,
    PolicyChecking,
    PolicyOverride,
    PolicySoftFailed,
    PolicyChecked,
    Confirmed,
    PlannedAndFinished,
    ApplyQueued,
    Applying,
    Applied,
    Discarded,
    Errored,
    Canceled,
    ForceCanceled,
    Unknown,
}

/// How the discard loop treats a run in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardDisposition {
    /// Nothing to do; the run no longer blocks new plans.
    Settled,
    /// Blocks new plans but cannot be discarded yet.
    Transient,
    /// Blocks new plans and accepts a discard action.
    Discardable,
}

impl RunStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::PlanQueued => "plan_queued",
            RunStatus::Planning => "planning",
            RunStatus::Planned => "planned",
            RunStatus::CostEstimating => "cost_estimating",
            RunStatus::CostEstimated => "cost_estimated",
            RunStatus::PolicyChecking => "policy_checking",
            RunStatus::PolicyOverride => "policy_override",
            RunStatus::PolicySoftFailed => "policy_soft_failed",
            RunStatus::PolicyChecked => "policy_checked",
            RunStatus::Confirmed => "confirmed",
            RunStatus::PlannedAndFinished => "planned_and_finished",
            RunStatus::ApplyQueued => "apply_queued",
            RunStatus::Applying => "applying",
            RunStatus::Applied => "applied",
            RunStatus::Discarded => "discarded",
            RunStatus::Errored => "errored",
            RunStatus::Canceled => "canceled",
            RunStatus::ForceCanceled => "force_canceled",
            RunStatus::Unknown => "unknown",
        }
    }

    /// Returns true if polling should stop at this status.
    ///
    /// Only `planning` and `applying` keep a wait alive; every other status,
    /// including `pending` and `planned`, ends it.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Planning | RunStatus::Applying)
    }

    /// Classifies the status for the pending-run discard loop.
    pub fn discard_disposition(&self) -> DiscardDisposition {
        match self {
            RunStatus::Planned => DiscardDisposition::Discardable,
            RunStatus::Pending | RunStatus::Planning => DiscardDisposition::Transient,
            _ => DiscardDisposition::Settled,
        }
    }
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(RunStatus::Unknown)
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl FromStr for RunStatus {
    type Err = TfeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s {
            "pending" => RunStatus::Pending,
            "plan_queued" => RunStatus::PlanQueued,
            "planning" => RunStatus::Planning,
            "planned" => RunStatus::Planned,
            "cost_estimating" => RunStatus::CostEstimating,
            "cost_estimated" => RunStatus::CostEstimated,
            "policy_checking" => RunStatus::PolicyChecking,
            "policy_override" => RunStatus::PolicyOverride,
            "policy_soft_failed" => RunStatus::PolicySoftFailed,
            "policy_checked" => RunStatus::PolicyChecked,
            "confirmed" => RunStatus::Confirmed,
            "planned_and_finished" => RunStatus::PlannedAndFinished,
            "apply_queued" => RunStatus::ApplyQueued,
            "applying" => RunStatus::Applying,
            "applied" => RunStatus::Applied,
            "discarded" => RunStatus::Discarded,
            "errored" => RunStatus::Errored,
            "canceled" => RunStatus::Canceled,
            "force_canceled" => RunStatus::ForceCanceled,
            other => {
                return Err(TfeError::invalid_argument(format!(
                    "unknown run status '{}'",
                    other
                )))
            }
        };
        Ok(status)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which phase a run request is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Plan only.
    #[default]
    Plan,
    /// Plan followed by apply.
    Apply,
}

impl RunKind {
    /// Path segment of the run action (`/runs/{id}/plan`, `/runs/{id}/apply`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Plan => "plan",
            RunKind::Apply => "apply",
        }
    }

    /// Verb used in progress messages.
    pub fn progress_label(&self) -> &'static str {
        match self {
            RunKind::Plan => "planning",
            RunKind::Apply => "applying",
        }
    }
}

impl FromStr for RunKind {
    type Err = TfeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plan" => Ok(RunKind::Plan),
            "apply" => Ok(RunKind::Apply),
            other => Err(TfeError::invalid_argument(format!(
                "request type must be 'plan' or 'apply', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a run's terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Errored,
    PlannedNoChanges,
    PlannedWithChanges,
    Applied,
    Unknown,
}

impl RunOutcome {
    /// Classifies a terminal status. `has_changes` only matters for `planned`.
    pub fn classify(status: RunStatus, has_changes: bool) -> Self {
        match status {
            RunStatus::Errored => RunOutcome::Errored,
            RunStatus::Planned if has_changes => RunOutcome::PlannedWithChanges,
            RunStatus::Planned => RunOutcome::PlannedNoChanges,
            RunStatus::Applied => RunOutcome::Applied,
            _ => RunOutcome::Unknown,
        }
    }

    /// Human-readable status line.
    pub fn message(&self) -> &'static str {
        match self {
            RunOutcome::Errored => "Failed",
            RunOutcome::PlannedNoChanges => "No Changes Detected",
            RunOutcome::PlannedWithChanges => "Changes Detected",
            RunOutcome::Applied => "Apply Successful",
            RunOutcome::Unknown => "Unknown",
        }
    }

    /// Returns true for outcomes a pipeline should treat as success.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RunOutcome::PlannedNoChanges | RunOutcome::PlannedWithChanges | RunOutcome::Applied
        )
    }
}

/// Category of a workspace variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariableCategory {
    /// Exported into the run's process environment.
    Env,
    /// Passed to the configuration as an input variable.
    #[default]
    Terraform,
}

impl VariableCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableCategory::Env => "env",
            VariableCategory::Terraform => "terraform",
        }
    }
}

impl FromStr for VariableCategory {
    type Err = TfeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "env" => Ok(VariableCategory::Env),
            "terraform" => Ok(VariableCategory::Terraform),
            other => Err(TfeError::invalid_argument(format!(
                "category should be 'env' or 'terraform', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for VariableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
