//! Chat-completion client for the language model collaborator.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::collaborators::LanguageModel;
use crate::config::OpenAiConfig;
use crate::error::{AgentError, AgentResult};
use crate::http::{build_client, read_json};

const SERVICE: &str = "language model";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> AgentResult<Self> {
        Ok(OpenAiClient {
            config,
            http_client: build_client()?,
        })
    }

    /// Create a client from `OPENAI_*` environment variables.
    pub fn from_env() -> AgentResult<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    #[instrument(skip(self, system, user), fields(model = %self.config.model))]
    async fn complete(&self, system: &str, user: &str) -> AgentResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        debug!(prompt_chars = user.len(), "requesting completion");

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;
        let body: ChatResponse = read_json(SERVICE, response).await?;
        reply_text(body)
    }
}

fn reply_text(response: ChatResponse) -> AgentResult<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::InvalidResponse(format!("{SERVICE}: no choices returned")))?;
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}
