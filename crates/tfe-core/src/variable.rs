//! Workspace variables.

use serde::{Deserialize, Serialize};

use crate::document::Resource;
use crate::types::VariableCategory;

/// Environment variable the remote apply path requires before it will
/// execute a destroy plan.
pub const CONFIRM_DESTROY_KEY: &str = "CONFIRM_DESTROY";

/// Replace embedded spaces with underscores.
///
/// Applied to both key and value before a variable is sent.
pub fn normalize(input: &str) -> String {
    input.replace(' ', "_")
}

/// A variable as stored on the remote side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Resource<VariableAttributes>", into = "Resource<VariableAttributes>")]
pub struct Variable {
    pub id: String,
    pub key: String,
    /// `None` for sensitive variables, whose value is never returned.
    pub value: Option<String>,
    pub category: VariableCategory,
    pub sensitive: bool,
    pub hcl: bool,
}

/// Wire attributes of a `vars` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAttributes {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    pub category: VariableCategory,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub hcl: bool,
}

impl From<Resource<VariableAttributes>> for Variable {
    fn from(resource: Resource<VariableAttributes>) -> Self {
        let attrs = resource.attributes;
        Self {
            id: resource.id,
            key: attrs.key,
            value: attrs.value,
            category: attrs.category,
            sensitive: attrs.sensitive,
            hcl: attrs.hcl,
        }
    }
}

impl From<Variable> for Resource<VariableAttributes> {
    fn from(var: Variable) -> Self {
        Resource {
            id: var.id,
            kind: "vars".to_string(),
            attributes: VariableAttributes {
                key: var.key,
                value: var.value,
                category: var.category,
                sensitive: var.sensitive,
                hcl: var.hcl,
            },
        }
    }
}

/// Desired state of a variable, as passed to an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub key: String,
    pub value: String,
    pub category: VariableCategory,
    pub sensitive: bool,
    pub hcl: bool,
}

impl VariableSpec {
    /// Create a non-sensitive, non-HCL variable spec.
    pub fn new(key: impl Into<String>, value: impl Into<String>, category: VariableCategory) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            category,
            sensitive: false,
            hcl: false,
        }
    }

    /// The destroy-confirmation flag.
    pub fn confirm_destroy() -> Self {
        Self::new(CONFIRM_DESTROY_KEY, "1", VariableCategory::Env)
    }

    /// Mark the value as sensitive.
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Treat the value as an HCL expression.
    pub fn hcl(mut self, hcl: bool) -> Self {
        self.hcl = hcl;
        self
    }

    /// Copy with key and value passed through [`normalize`].
    pub fn normalized(&self) -> Self {
        Self {
            key: normalize(&self.key),
            value: normalize(&self.value),
            ..self.clone()
        }
    }
}
