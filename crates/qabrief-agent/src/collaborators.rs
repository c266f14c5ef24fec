//! Collaborator seams around the pure briefing transforms.
//!
//! - `TicketService`: fetches raw ticket payloads and posts comment documents
//! - `LanguageModel`: turns a system + user prompt into a free-form reply
//! - `StepExecutor`: runs generated test steps and reports per-step outcomes
//!
//! All traits are async and backend-agnostic. HTTP implementations live in
//! [`crate::jira`] and [`crate::openai`]; in-memory fakes in [`crate::fakes`].

use async_trait::async_trait;
use qabrief_core::{Node, TestStep};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentResult;

/// Source and sink of tickets.
#[async_trait]
pub trait TicketService: Send + Sync {
    /// Fetch the raw payload of a ticket (`key`, `fields.*`).
    async fn fetch_issue(&self, key: &str) -> AgentResult<Value>;

    /// Post a rendered document as a comment; returns the created comment.
    async fn post_comment(&self, key: &str, body: &Node) -> AgentResult<Value>;
}

/// Chat-style language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single exchange. The reply is trimmed.
    async fn complete(&self, system: &str, user: &str) -> AgentResult<String>;
}

/// Runner for generated test steps.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// Execute `steps` in order, returning one outcome per step.
    async fn execute(&self, steps: &[TestStep]) -> AgentResult<Vec<StepOutcome>>;
}

/// Outcome status of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
}

/// Result of executing one test step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: TestStep,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn passed(step: TestStep) -> Self {
        Self {
            step,
            status: StepStatus::Passed,
            error: None,
        }
    }

    pub fn failed(step: TestStep, error: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == StepStatus::Passed
    }
}
