//! # tfe-client
//!
//! Client for workspace-based plan/apply run APIs.
//!
//! Components, leaf first:
//! - [`Transport`] / [`HttpTransport`] - authenticated JSON:API requests
//! - [`WorkspaceResolver`] - workspace name to id
//! - [`VariableStore`] - workspace variable CRUD
//! - [`RunOrchestrator`] - submit, discard, poll and classify runs
//!
//! One transport is meant to be shared (`Arc<dyn Transport>`) by every
//! component talking to the same organization.

pub mod config;
pub mod mock;
pub mod observer;
pub mod runs;
pub mod sleep;
pub mod transport;
pub mod variables;
pub mod workspace;

pub use config::{ClientConfig, PollSettings, DEFAULT_BASE_URL};
pub use observer::{RunObserver, TracingObserver};
pub use runs::RunOrchestrator;
pub use sleep::{Sleeper, TokioSleeper};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
pub use variables::VariableStore;
pub use workspace::WorkspaceResolver;

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::config::{ClientConfig, PollSettings};
    pub use crate::runs::RunOrchestrator;
    pub use crate::transport::{HttpTransport, Transport};
    pub use crate::variables::VariableStore;
    pub use crate::workspace::WorkspaceResolver;
    pub use tfe_core::prelude::*;
}
