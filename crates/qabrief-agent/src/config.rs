//! Environment-driven configuration for the remote collaborators.

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, AgentResult};

pub const JIRA_BASE_URL: &str = "JIRA_BASE_URL";
pub const JIRA_EMAIL: &str = "JIRA_EMAIL";
pub const JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Ticketing service connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Site root, e.g. `https://example.atlassian.net`
    pub base_url: String,
    /// Account email used for basic auth
    pub email: String,
    /// API token used as the basic auth password
    pub api_token: String,
}

impl JiraConfig {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            api_token: api_token.into(),
        }
    }

    /// Read `JIRA_BASE_URL`, `JIRA_EMAIL` and `JIRA_API_TOKEN`.
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AgentResult<Self> {
        Ok(Self::new(
            required(&lookup, JIRA_BASE_URL)?,
            required(&lookup, JIRA_EMAIL)?,
            required(&lookup, JIRA_API_TOKEN)?,
        ))
    }
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Chat-completion endpoint settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Read `OPENAI_API_KEY` plus the optional `OPENAI_MODEL` and
    /// `OPENAI_BASE_URL`.
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AgentResult<Self> {
        let mut config = Self::new(required(&lookup, OPENAI_API_KEY)?);
        if let Some(model) = optional(&lookup, OPENAI_MODEL) {
            config = config.with_model(model);
        }
        if let Some(base_url) = optional(&lookup, OPENAI_BASE_URL) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AgentResult<String> {
    optional(lookup, name).ok_or_else(|| AgentError::MissingConfig(name.to_string()))
}
