//! Workspace variable store.

use std::sync::Arc;

use tfe_core::document::{variable_payload, workspace_filter, workspace_filter_query};
use tfe_core::{Result, TfeError, Variable, VariableSpec};
use tracing::{debug, info, warn};

use crate::transport::{ApiRequest, Transport};

/// Create/update/get/delete access to one workspace's variables.
#[derive(Clone)]
pub struct VariableStore {
    transport: Arc<dyn Transport>,
    organization: String,
    workspace: String,
}

impl VariableStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        organization: impl Into<String>,
        workspace: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            organization: organization.into(),
            workspace: workspace.into(),
        }
    }

    /// Name of the workspace the store is scoped to.
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Every variable of the workspace.
    pub async fn list(&self) -> Result<Vec<Variable>> {
        let request = ApiRequest::get("/vars")
            .with_query(workspace_filter_query(&self.organization, &self.workspace));
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            debug!(status = response.status, workspace = %self.workspace, "variable listing failed");
            return Err(TfeError::not_found("Workspace variables", &self.workspace));
        }

        response.data()
    }

    /// First variable whose key is exactly `key`.
    pub async fn find_by_key(&self, key: &str) -> Result<Variable> {
        let mut matches = self.list().await?.into_iter().filter(|v| v.key == key);
        let found = matches
            .next()
            .ok_or_else(|| TfeError::not_found("Variable", key))?;

        if matches.next().is_some() {
            warn!(key, workspace = %self.workspace, id = %found.id, "duplicate variable key, using first match");
        }
        Ok(found)
    }

    /// Create the variable, or update it in place if the key already exists.
    ///
    /// Spaces in key and value are replaced with underscores before the
    /// lookup and before sending.
    pub async fn upsert(&self, spec: &VariableSpec) -> Result<()> {
        let spec = spec.normalized();

        let response = match self.find_by_key(&spec.key).await {
            Ok(existing) => {
                debug!(key = %spec.key, id = %existing.id, "updating variable");
                let body = variable_payload(&spec, Some(&existing.id));
                self.transport
                    .patch(&format!("/vars/{}", existing.id), body)
                    .await?
            }
            Err(TfeError::NotFound { .. }) => {
                debug!(key = %spec.key, "creating variable");
                let mut body = variable_payload(&spec, None);
                body["filter"] = workspace_filter(&self.organization, &self.workspace);
                self.transport.post("/vars", body).await?
            }
            Err(e) => return Err(e),
        };

        if !response.is_success() {
            return Err(response.into_remote_failure());
        }

        info!(key = %spec.key, category = %spec.category, workspace = %self.workspace, "variable set");
        Ok(())
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let response = self.transport.delete(&format!("/vars/{}", id)).await?;

        if !response.is_success() {
            debug!(status = response.status, id, "variable delete failed");
            return Err(TfeError::not_found("Variable", id));
        }
        Ok(())
    }

    pub async fn delete_by_key(&self, key: &str) -> Result<()> {
        let variable = self.find_by_key(key).await?;
        self.delete_by_id(&variable.id).await
    }

    /// Delete every listed variable. Stops at the first failure, leaving
    /// earlier deletions in place. Returns the number deleted.
    pub async fn delete_all(&self) -> Result<usize> {
        let variables = self.list().await?;
        for variable in &variables {
            self.delete_by_id(&variable.id).await?;
        }
        info!(count = variables.len(), workspace = %self.workspace, "deleted all variables");
        Ok(variables.len())
    }
}
