//! qabrief agent: collaborators and the validation pipeline.
//!
//! Wraps the pure transforms of `qabrief-core` with the ticketing service,
//! a chat-completion model and a step executor.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod executor;
pub mod fakes;
mod http;
pub mod jira;
pub mod openai;
pub mod pipeline;

pub use collaborators::{LanguageModel, StepExecutor, StepOutcome, StepStatus, TicketService};
pub use config::{JiraConfig, OpenAiConfig};
pub use error::{AgentError, AgentResult};
pub use executor::SimulatedExecutor;
pub use jira::JiraClient;
pub use openai::OpenAiClient;
pub use pipeline::{ValidationPipeline, ValidationReport};
