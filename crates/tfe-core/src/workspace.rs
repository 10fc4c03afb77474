//! Workspaces.

use serde::{Deserialize, Serialize};

use crate::document::Resource;

/// A named, isolated execution context within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Resource<WorkspaceAttributes>")]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceAttributes {
    pub name: String,
}

impl From<Resource<WorkspaceAttributes>> for Workspace {
    fn from(resource: Resource<WorkspaceAttributes>) -> Self {
        Self {
            id: resource.id,
            name: resource.attributes.name,
        }
    }
}
