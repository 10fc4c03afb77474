//! Workspace lookup.

use std::sync::Arc;

use tfe_core::{Result, TfeError, Workspace};
use tracing::debug;

use crate::transport::Transport;

/// Maps workspace names to ids within one organization.
#[derive(Clone)]
pub struct WorkspaceResolver {
    transport: Arc<dyn Transport>,
    organization: String,
}

impl WorkspaceResolver {
    pub fn new(transport: Arc<dyn Transport>, organization: impl Into<String>) -> Self {
        Self {
            transport,
            organization: organization.into(),
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// All workspaces in the organization (first page only).
    pub async fn list(&self) -> Result<Vec<Workspace>> {
        let path = format!("/organizations/{}/workspaces", self.organization);
        let response = self.transport.get(&path).await?;

        if !response.is_success() {
            debug!(status = response.status, organization = %self.organization, "workspace listing failed");
            return Err(TfeError::not_found("Organization workspaces", &self.organization));
        }

        response.data()
    }

    /// Id of the workspace with exactly this name.
    pub async fn resolve(&self, name: &str) -> Result<String> {
        self.list()
            .await?
            .into_iter()
            .find(|ws| ws.name == name)
            .map(|ws| ws.id)
            .ok_or_else(|| TfeError::not_found("Workspace", name))
    }
}
