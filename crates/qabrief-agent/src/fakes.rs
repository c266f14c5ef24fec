//! In-memory fakes for collaborator traits (testing only)
//!
//! Provides `MemoryTicketService` and `ScriptedModel` that satisfy the trait
//! contracts without any network access.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use qabrief_core::Node;
use serde_json::{json, Value};

use crate::collaborators::{LanguageModel, TicketService};
use crate::error::{AgentError, AgentResult};

// ---------------------------------------------------------------------------
// MemoryTicketService
// ---------------------------------------------------------------------------

/// In-memory ticketing service backed by a `HashMap<key, payload>`.
#[derive(Debug, Default)]
pub struct MemoryTicketService {
    issues: Mutex<HashMap<String, Value>>,
    comments: Mutex<Vec<(String, Node)>>,
}

impl MemoryTicketService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an issue payload under `key`.
    pub fn with_issue(self, key: impl Into<String>, payload: Value) -> Self {
        self.issues.lock().unwrap().insert(key.into(), payload);
        self
    }

    /// Every comment posted so far, in order.
    pub fn posted_comments(&self) -> Vec<(String, Node)> {
        self.comments.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketService for MemoryTicketService {
    async fn fetch_issue(&self, key: &str) -> AgentResult<Value> {
        let issues = self.issues.lock().unwrap();
        issues.get(key).cloned().ok_or_else(|| {
            AgentError::status(
                "ticketing service",
                404,
                format!("Issue {key} does not exist"),
            )
        })
    }

    async fn post_comment(&self, key: &str, body: &Node) -> AgentResult<Value> {
        if !self.issues.lock().unwrap().contains_key(key) {
            return Err(AgentError::status(
                "ticketing service",
                404,
                format!("Issue {key} does not exist"),
            ));
        }
        let mut comments = self.comments.lock().unwrap();
        comments.push((key.to_string(), body.clone()));
        Ok(json!({ "id": comments.len().to_string(), "body": body }))
    }
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

/// Language model that replays canned replies in order.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::default(),
        }
    }

    /// `(system, user)` pairs received so far, in order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, system: &str, user: &str) -> AgentResult<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .map(|reply| reply.trim().to_string())
            .ok_or_else(|| AgentError::InvalidResponse("script exhausted".to_string()))
    }
}
