// SPDX-License-Identifier: MIT

//! Typed error handling for agentops-rs
//!
//! `WorkflowError` carries the compile/run taxonomy of the workflow engine,
//! `ModelError` covers model endpoints, and `AgentOpsError` is returned by
//! configuration, the catalog loader and the server.

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error returned by pluggable step workers
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Top-level error type for agentops-rs
#[derive(Debug, Error)]
pub enum AgentOpsError {
    /// Configuration errors (missing env vars, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model endpoint errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while compiling or running a workflow
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The encoded task list could not be decoded
    #[error("Malformed task list: {0}")]
    MalformedTasks(#[source] serde_json::Error),

    /// A task entry has the wrong shape
    #[error("Invalid task at position {index}: {reason}")]
    InvalidTask { index: usize, reason: String },

    /// No task resolved to an existing agent
    #[error("Workflow '{0}' has no resolvable tasks")]
    EmptyChain(String),

    /// Two steps derived the same node id
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    /// A step worker failed; the run is aborted
    #[error("Step '{node_id}' failed: {source}")]
    StepFailed {
        node_id: String,
        #[source]
        source: BoxError,
    },
}

impl WorkflowError {
    /// True for errors caused by the workflow definition itself (bad request),
    /// false for failures raised while executing steps (internal).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, WorkflowError::StepFailed { .. })
    }
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Endpoint answered with a non-success status
    #[error("API error from {provider} ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl AgentOpsError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
