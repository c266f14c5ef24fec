//! Ticketing service client (REST API v3).
//!
//! Fetches issues and posts comments as rich-text documents, authenticating
//! with account email + API token over basic auth.

use async_trait::async_trait;
use qabrief_core::Node;
use reqwest::header::ACCEPT;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::collaborators::TicketService;
use crate::config::JiraConfig;
use crate::error::AgentResult;
use crate::http::{build_client, read_json};

const SERVICE: &str = "ticketing service";

/// HTTP client for the ticketing service.
pub struct JiraClient {
    config: JiraConfig,
    http_client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> AgentResult<Self> {
        Ok(JiraClient {
            config,
            http_client: build_client()?,
        })
    }

    /// Create a client from `JIRA_*` environment variables.
    pub fn from_env() -> AgentResult<Self> {
        Self::new(JiraConfig::from_env()?)
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    fn issue_url(&self, key: &str) -> String {
        format!("{}/rest/api/3/issue/{}", self.config.base_url, key)
    }

    fn comment_url(&self, key: &str) -> String {
        format!("{}/comment", self.issue_url(key))
    }
}

#[async_trait]
impl TicketService for JiraClient {
    #[instrument(skip(self))]
    async fn fetch_issue(&self, key: &str) -> AgentResult<Value> {
        let url = self.issue_url(key);
        debug!(url = %url, "fetching issue");

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        read_json(SERVICE, response).await
    }

    #[instrument(skip(self, body))]
    async fn post_comment(&self, key: &str, body: &Node) -> AgentResult<Value> {
        let url = self.comment_url(key);
        info!(url = %url, "posting comment");

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header(ACCEPT, "application/json")
            .json(&json!({ "body": body }))
            .send()
            .await?;
        read_json(SERVICE, response).await
    }
}
