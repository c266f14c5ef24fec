//! Ticket simplification: raw ticket payload → flat briefing record.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adf::Node;
use crate::criteria::mine_acceptance_criteria;
use crate::error::{BriefError, Result};
use crate::extract::extract_text;
use crate::obs;
use crate::prompt::{issue_prompt, PromptFields};

/// Assignee shown when the ticket has none.
pub const UNASSIGNED: &str = "Unassigned";
/// Acceptance text used when no criteria could be mined.
pub const NO_CRITERIA: &str = "No explicit acceptance criteria provided.";
/// Comment text used when the ticket has no non-empty comments.
pub const NO_COMMENTS: &str = "No comments found.";

static SECTION_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)acceptance criteria").expect("static pattern compiles")
});

/// Flat, model-friendly view of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    /// Description text up to the acceptance criteria section.
    pub context: String,
    pub acceptance_criteria: Vec<String>,
    pub comments: Vec<String>,
    /// Briefing assembled from the fields above.
    pub prompt: String,
}

impl SimplifiedIssue {
    /// Acceptance criteria as `- item` lines, or the default sentence.
    pub fn acceptance_text(&self) -> String {
        if self.acceptance_criteria.is_empty() {
            NO_CRITERIA.to_string()
        } else {
            self.acceptance_criteria
                .iter()
                .map(|c| format!("- {c}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }

    /// Comments one per line, or the default sentence.
    pub fn comments_text(&self) -> String {
        if self.comments.is_empty() {
            NO_COMMENTS.to_string()
        } else {
            self.comments.join("\n").trim().to_string()
        }
    }
}

/// Simplify a raw ticket payload.
///
/// Missing or oddly shaped fields fall back to empty strings (and
/// [`UNASSIGNED`] for the assignee). Only a payload that is not a JSON object
/// is rejected.
pub fn simplify_issue(raw: &Value) -> Result<SimplifiedIssue> {
    let issue = raw.as_object().ok_or_else(|| {
        BriefError::InvalidInput(format!("expected a JSON object, got {}", kind_of(raw)))
    })?;
    let null = Value::Null;
    let fields = issue.get("fields").unwrap_or(&null);

    let key = string_at(raw, &["key"]);
    let summary = string_at(fields, &["summary"]);
    let status = string_at(fields, &["status", "name"]);
    let assignee = match fields.get("assignee") {
        Some(assignee) if !assignee.is_null() => assignee
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or(UNASSIGNED)
            .to_string(),
        _ => UNASSIGNED.to_string(),
    };

    let description = fields
        .get("description")
        .filter(|d| !d.is_null())
        .map(Node::from_value);
    let description_text = extract_text(description.as_ref());
    // Any tree-shaped description has top-level blocks, typed `doc` or not.
    let blocks: &[Node] = description.as_ref().map_or(&[][..], |d| d.children());
    let acceptance_criteria = mine_acceptance_criteria(blocks, &description_text);
    let context = context_before_criteria(&description_text);

    let comments = fields
        .get("comment")
        .and_then(|c| c.get("comments"))
        .and_then(Value::as_array)
        .map(|entries| collect_comments(entries))
        .unwrap_or_default();

    let mut simplified = SimplifiedIssue {
        key,
        summary,
        status,
        assignee,
        context,
        acceptance_criteria,
        comments,
        prompt: String::new(),
    };
    simplified.prompt = issue_prompt(&PromptFields {
        summary: &simplified.summary,
        status: &simplified.status,
        assignee: &simplified.assignee,
        context: &simplified.context,
        acceptance_text: &simplified.acceptance_text(),
        comments_text: &simplified.comments_text(),
    });

    obs::emit_issue_simplified(
        &simplified.key,
        simplified.acceptance_criteria.len(),
        simplified.comments.len(),
    );
    Ok(simplified)
}

/// Description text with everything from the first "acceptance criteria"
/// (any case) onwards removed.
pub fn context_before_criteria(description_text: &str) -> String {
    let end = SECTION_PHRASE
        .find(description_text)
        .map_or(description_text.len(), |m| m.start());
    description_text[..end].trim().to_string()
}

fn collect_comments(entries: &[Value]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| entry.get("body"))
        .filter(|body| is_truthy(body))
        .map(|body| extract_text(&Node::from_value(body)))
        .filter(|text| !text.is_empty())
        .collect()
}

fn string_at(value: &Value, path: &[&str]) -> String {
    path.iter()
        .try_fold(value, |current, key| current.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Comment bodies that are null, empty or zero carry nothing to extract.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
