use std::path::PathBuf;

use cloudcraft_core::CloudError;

/// Why setup stopped.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("{step} failed: {source}")]
    Cloud {
        step: &'static str,
        #[source]
        source: CloudError,
    },

    #[error("Timed out waiting for {resource} after {attempts} checks ({waited_secs}s)")]
    TimedOut {
        resource: String,
        attempts: u32,
        waited_secs: u64,
    },

    #[error("Failed to read function package at {path}: {reason}")]
    Package { path: PathBuf, reason: String },

    #[error("{kind} '{name}' already exists but could not be found")]
    NotFound { kind: &'static str, name: String },

    #[error("Agent '{agent_id}' entered status {status}")]
    AgentFailed { agent_id: String, status: String },
}

/// Wrap a remote failure with the setup step it interrupted.
pub(crate) fn at(step: &'static str) -> impl FnOnce(CloudError) -> ProvisionError {
    move |source| ProvisionError::Cloud { step, source }
}
