//! Client and polling configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://atlas.hashicorp.com/api/v2";

/// Connection settings shared by every component talking to one organization.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Organization that owns the workspaces.
    pub organization: String,

    /// Bearer token sent on every request.
    pub token: String,

    /// API base URL, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    /// Create a config against the default endpoint.
    pub fn new(organization: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            token: token.into(),
            base_url: default_base_url(),
        }
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("organization", &self.organization)
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Bounds for the two polling loops in the run orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between consecutive remote checks.
    pub interval: Duration,

    /// Maximum number of run status polls before a wait times out.
    pub max_polls: u32,

    /// Maximum number of listing passes the discard loop makes.
    pub max_discard_passes: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_polls: 120,
            max_discard_passes: 30,
        }
    }
}

impl PollSettings {
    /// Set the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the maximum number of status polls. At least one poll is made.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    /// Set the maximum number of discard passes. At least one pass is made.
    pub fn with_max_discard_passes(mut self, passes: u32) -> Self {
        self.max_discard_passes = passes.max(1);
        self
    }
}
