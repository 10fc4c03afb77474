//! Error types for the tfe-runs client.

use thiserror::Error;

/// Main error type for workspace, variable and run operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TfeError {
    /// A workspace, variable or run lookup found nothing.
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    /// The remote side refused a state transition (e.g. discarding a run
    /// that is no longer discardable).
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// A caller-supplied value is outside the accepted set.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A polling loop ran out of attempts.
    #[error("Timed out after {attempts} attempts: {message}")]
    Timeout { attempts: u32, message: String },

    /// Non-success HTTP status not otherwise classified.
    #[error("Remote request failed with status {status}: {message}")]
    RemoteFailure { status: u16, message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl TfeError {
    /// Shorthand for a [`TfeError::NotFound`].
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        TfeError::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Shorthand for a [`TfeError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TfeError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns true if retrying the same call later might succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TfeError::Timeout { .. } => true,
            TfeError::ConnectionError(_) => true,
            TfeError::RemoteFailure { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns the HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TfeError::RemoteFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience Result type for tfe-runs operations.
pub type Result<T> = std::result::Result<T, TfeError>;

impl From<serde_json::Error> for TfeError {
    fn from(err: serde_json::Error) -> Self {
        TfeError::SerializationError(err.to_string())
    }
}
