//! Error types for qabrief-agent

use qabrief_core::BriefError;
use thiserror::Error;

/// Errors raised by collaborators and the validation pipeline.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Required environment variable is not set
    #[error("missing configuration: {0} is not set")]
    MissingConfig(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Remote service answered with a non-success status
    #[error("{service} returned status {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    /// Remote service answered with an unexpected body
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Briefing transform rejected the payload
    #[error("briefing error: {0}")]
    Brief(#[from] BriefError),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Http(err.to_string())
    }
}

impl AgentError {
    pub fn status(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        AgentError::Status {
            service: service.into(),
            status,
            body: body.into(),
        }
    }
}

/// Result type for agent operations
pub type AgentResult<T> = std::result::Result<T, AgentError>;
