//! Error types for the CloudCraft domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Service error codes that signal "this resource already exists".
const CONFLICT_CODES: &[&str] = &[
    "ResourceConflictException",
    "EntityAlreadyExists",
    "ConflictException",
];

// --- Bounded context errors ---

/// A failure reported by (or while talking to) a managed cloud service.
///
/// The `Display` text is the service's own description; action handlers
/// embed it verbatim after `Reason:`.
#[derive(Debug, Clone, Error)]
pub enum CloudError {
    #[error("An error occurred ({code}): {message}")]
    Service { code: String, message: String },

    #[error("An error occurred ({code}): {message}")]
    Conflict { code: String, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Event stream interrupted: {0}")]
    Stream(String),
}

impl CloudError {
    /// Build a service error, classifying well-known "already exists" codes
    /// as [`CloudError::Conflict`].
    pub fn from_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        if CONFLICT_CODES.contains(&code.as_str()) {
            CloudError::Conflict { code, message }
        } else {
            CloudError::Service { code, message }
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CloudError::Conflict { .. })
    }
}

/// Why an action produced an `Error:` result instead of `Success:`.
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Missing required parameter '{parameter}' for function '{function}'")]
    MissingParameter { function: String, parameter: String },

    #[error("Failed to {operation}. Reason: {cause}")]
    RemoteCallFailed { operation: String, cause: CloudError },

    #[error("{resource} '{name}' already exists.")]
    ResourceConflict { resource: String, name: String },
}
