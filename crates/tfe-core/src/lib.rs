//! # tfe-core
//!
//! Core types for the tfe-runs client.
//!
//! This crate provides the building blocks shared by the client and CLI:
//! - [`Run`] and [`RunStatus`] - a run and its remote lifecycle state
//! - [`Variable`] and [`VariableSpec`] - workspace variables
//! - [`RunResult`] - the outcome of a top-level run request
//! - [`TfeError`] - error kinds surfaced by every operation

pub mod document;
pub mod error;
pub mod run;
pub mod types;
pub mod variable;
pub mod workspace;

// Re-exports for convenience
pub use error::{Result, TfeError};
pub use run::{Run, RunAction, RunResult};
pub use types::{DiscardDisposition, RunKind, RunOutcome, RunStatus, VariableCategory};
pub use variable::{normalize, Variable, VariableSpec, CONFIRM_DESTROY_KEY};
pub use workspace::Workspace;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Result, TfeError};
    pub use crate::run::{Run, RunAction, RunResult};
    pub use crate::types::{RunKind, RunOutcome, RunStatus, VariableCategory};
    pub use crate::variable::{Variable, VariableSpec};
    pub use crate::workspace::Workspace;
}
