//! JSON:API document shapes and request payload rendering.
//!
//! The remote API wraps every resource as `{"id", "type", "attributes"}`
//! inside a top-level `data` member. Request bodies are rendered here so
//! the client crate never hand-assembles JSON.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::variable::VariableSpec;

/// Comment attached to every discard action.
pub const DISCARD_COMMENT: &str = "Dropped by automated pipeline build";

/// A single JSON:API resource object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<A> {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    pub attributes: A,
}

/// Top-level JSON:API document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

impl<T: serde::de::DeserializeOwned> Document<T> {
    /// Parse the `data` member out of a response body.
    pub fn data_from(body: Value) -> crate::Result<T> {
        let doc: Document<T> = serde_json::from_value(body)?;
        Ok(doc.data)
    }
}

/// Body for `POST /runs`.
pub fn run_create_payload(workspace_id: &str, destroy: bool) -> Value {
    json!({
        "data": {
            "type": "runs",
            "attributes": {
                "is-destroy": destroy
            },
            "relationships": {
                "workspace": {
                    "data": {
                        "type": "workspaces",
                        "id": workspace_id
                    }
                }
            }
        }
    })
}

/// Body for `POST /runs/{id}/actions/{apply,discard}`.
pub fn action_payload(comment: Option<&str>) -> Value {
    match comment {
        Some(comment) => json!({ "comment": comment }),
        None => json!({}),
    }
}

/// Body for `POST /vars` (no id) and `PATCH /vars/{id}`.
///
/// `hcl` is only emitted when set, matching what the API expects for
/// plain string variables.
pub fn variable_payload(spec: &VariableSpec, id: Option<&str>) -> Value {
    let mut attributes = json!({
        "key": spec.key,
        "value": spec.value,
        "category": spec.category,
        "sensitive": spec.sensitive,
    });
    if spec.hcl {
        attributes["hcl"] = Value::Bool(true);
    }

    let mut data = json!({
        "type": "vars",
        "attributes": attributes,
    });
    if let Some(id) = id {
        data["id"] = Value::String(id.to_string());
    }

    json!({ "data": data })
}

/// Top-level `filter` scoping a variable create to one workspace.
pub fn workspace_filter(organization: &str, workspace: &str) -> Value {
    json!({
        "organization": { "username": organization },
        "workspace": { "name": workspace }
    })
}

/// Query pairs equivalent to [`workspace_filter`] for `GET /vars`.
pub fn workspace_filter_query(organization: &str, workspace: &str) -> Vec<(String, String)> {
    vec![
        (
            "filter[organization][username]".to_string(),
            organization.to_string(),
        ),
        ("filter[workspace][name]".to_string(), workspace.to_string()),
    ]
}
