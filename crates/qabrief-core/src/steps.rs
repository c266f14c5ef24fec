//! Recovery of test steps from a language model reply.
//!
//! Models are asked for a bare JSON array of `{step, expected_result}`
//! objects but routinely fence the JSON, wrap it in an object, or nest steps
//! inside test cases. [`parse_test_steps`] accepts all of those shapes and
//! never fails: unusable replies turn into a single placeholder step that
//! carries the diagnostic for a human reviewer.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::obs;

/// Step text of the placeholder returned for an empty reply.
pub const EMPTY_REPLY_STEP: &str = "Failed to generate test steps";
/// Expected result of the placeholder returned for an empty reply.
pub const EMPTY_REPLY_EXPECTED: &str = "Manual review required";
/// Step text of the placeholder returned for an unparseable reply.
pub const PARSE_FAILURE_STEP: &str = "Failed to parse test steps";
/// Number of reply characters kept in a parse-failure diagnostic.
pub const SNIPPET_CHARS: usize = 300;

const STEP_KEYS: [&str; 5] = ["step", "action", "description", "title", "name"];
const EXPECTED_KEYS: [&str; 5] = [
    "expected_result",
    "expectedResult",
    "expected",
    "expected_outcome",
    "result",
];

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\A```(?:json)?").expect("static pattern compiles"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\z").expect("static pattern compiles"));

/// A single generated test step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub step: String,
    #[serde(alias = "expectedResult")]
    pub expected_result: String,
}

impl TestStep {
    pub fn new(step: impl Into<String>, expected_result: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            expected_result: expected_result.into(),
        }
    }

    /// Normalise one element of a model reply.
    ///
    /// Objects are searched for the first known step and expected-result
    /// keys; any other value becomes the step text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                step: first_text(map, &STEP_KEYS),
                expected_result: first_text(map, &EXPECTED_KEYS),
            },
            other => Self {
                step: value_text(other),
                expected_result: String::new(),
            },
        }
    }
}

/// Why the parser fell back to a placeholder step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseRecoveryNotice {
    /// The reply was empty.
    EmptyReply,
    /// The reply was not valid JSON after fence stripping.
    InvalidJson { message: String, snippet: String },
}

impl ParseRecoveryNotice {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyReply => "empty_reply",
            Self::InvalidJson { .. } => "invalid_json",
        }
    }
}

/// Steps together with how they were obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepParseOutcome {
    pub steps: Vec<TestStep>,
    /// Name of the shape matcher that accepted the reply, if any.
    pub shape: Option<&'static str>,
    /// Set when `steps` is a single diagnostic placeholder.
    pub recovery: Option<ParseRecoveryNotice>,
}

/// Parse a model reply into an ordered list of test steps.
///
/// Never fails; see [`parse_test_steps_detailed`] for the recovery notice.
pub fn parse_test_steps(raw_reply: &str) -> Vec<TestStep> {
    parse_test_steps_detailed(raw_reply).steps
}

/// Parse a model reply, reporting which shape matched or why the parser
/// recovered.
pub fn parse_test_steps_detailed(raw_reply: &str) -> StepParseOutcome {
    if raw_reply.is_empty() {
        return recovered(
            TestStep::new(EMPTY_REPLY_STEP, EMPTY_REPLY_EXPECTED),
            ParseRecoveryNotice::EmptyReply,
        );
    }

    let body = strip_code_fence(raw_reply);
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            let message = err.to_string();
            let snippet = snippet(raw_reply);
            let placeholder = TestStep::new(
                PARSE_FAILURE_STEP,
                format!("Parsing error: {message}. Raw reply: {snippet}"),
            );
            return recovered(placeholder, ParseRecoveryNotice::InvalidJson { message, snippet });
        }
    };

    let (shape, elements) = normalize_shape(parsed);
    let steps: Vec<TestStep> = flatten_nested_steps(elements)
        .iter()
        .map(TestStep::from_value)
        .collect();

    obs::emit_steps_parsed(shape, steps.len());
    StepParseOutcome {
        steps,
        shape: Some(shape),
        recovery: None,
    }
}

fn recovered(placeholder: TestStep, notice: ParseRecoveryNotice) -> StepParseOutcome {
    obs::emit_steps_recovered(notice.kind());
    StepParseOutcome {
        steps: vec![placeholder],
        shape: None,
        recovery: Some(notice),
    }
}

/// Remove one leading and one trailing code fence (optionally tagged
/// `json`) and the whitespace around them.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let start = OPENING_FENCE.find(trimmed).map_or(0, |m| m.end());
    let rest = &trimmed[start..];
    let end = CLOSING_FENCE.find(rest).map_or(rest.len(), |m| m.start());
    rest[..end].trim()
}

fn snippet(raw: &str) -> String {
    raw.chars()
        .take(SNIPPET_CHARS)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

// ---------------------------------------------------------------------------
// Shape normalisation
// ---------------------------------------------------------------------------

type ShapeMatcher = fn(&Value) -> Option<Vec<Value>>;

/// Wrapping shapes in priority order. The first matcher that accepts the
/// parsed value decides the element sequence; `single` accepts anything.
const SHAPE_MATCHERS: [(&str, ShapeMatcher); 4] = [
    ("array", match_array),
    ("test_cases", match_test_cases),
    ("steps", match_steps),
    ("single", match_single),
];

fn normalize_shape(parsed: Value) -> (&'static str, Vec<Value>) {
    for (name, matcher) in SHAPE_MATCHERS {
        if let Some(elements) = matcher(&parsed) {
            debug!(shape = name, elements = elements.len(), "step reply shape matched");
            return (name, elements);
        }
    }
    ("single", vec![parsed])
}

fn match_array(value: &Value) -> Option<Vec<Value>> {
    value.as_array().cloned()
}

fn match_test_cases(value: &Value) -> Option<Vec<Value>> {
    value.as_object()?.get("test_cases").map(as_sequence)
}

fn match_steps(value: &Value) -> Option<Vec<Value>> {
    value.as_object()?.get("steps").map(as_sequence)
}

fn match_single(value: &Value) -> Option<Vec<Value>> {
    Some(vec![value.clone()])
}

/// Splice one level of `{"steps": [...]}` elements into the sequence.
fn flatten_nested_steps(elements: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::with_capacity(elements.len());
    for element in elements {
        match element.as_object().and_then(|map| map.get("steps")) {
            Some(nested) => flat.extend(as_sequence(nested)),
            None => flat.push(element),
        }
    }
    flat
}

fn as_sequence(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn first_text(map: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
        .map(value_text)
        .unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reply_placeholder() {
        let outcome = parse_test_steps_detailed("");
        assert_eq!(
            outcome.steps,
            vec![TestStep::new(EMPTY_REPLY_STEP, EMPTY_REPLY_EXPECTED)]
        );
        assert_eq!(outcome.recovery, Some(ParseRecoveryNotice::EmptyReply));
    }

    #[test]
    fn test_whitespace_reply_is_a_parse_failure() {
        let outcome = parse_test_steps_detailed("   \n ");
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.steps[0].step, PARSE_FAILURE_STEP);
        assert!(outcome.steps[0].expected_result.starts_with("Parsing error:"));
        assert!(matches!(
            outcome.recovery,
            Some(ParseRecoveryNotice::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_fenced_array() {
        let steps = parse_test_steps("```json\n[{\"step\":\"a\",\"expected_result\":\"b\"}]\n```");
        assert_eq!(steps, vec![TestStep::new("a", "b")]);
    }

    #[test]
    fn test_fence_tag_is_case_insensitive() {
        let steps = parse_test_steps("  ```JSON\n[{\"step\":\"a\",\"expected_result\":\"b\"}]```  ");
        assert_eq!(steps, vec![TestStep::new("a", "b")]);
    }

    #[test]
    fn test_untagged_fence() {
        assert_eq!(strip_code_fence("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_test_cases_wrapper() {
        let outcome =
            parse_test_steps_detailed(r#"{"test_cases":[{"step":"a","expected_result":"b"}]}"#);
        assert_eq!(outcome.steps, vec![TestStep::new("a", "b")]);
        assert_eq!(outcome.shape, Some("test_cases"));
    }

    #[test]
    fn test_steps_wrapper() {
        let outcome = parse_test_steps_detailed(r#"{"steps":[{"step":"x","expected":"y"}]}"#);
        assert_eq!(outcome.steps, vec![TestStep::new("x", "y")]);
        assert_eq!(outcome.shape, Some("steps"));
    }

    #[test]
    fn test_test_cases_take_precedence_over_steps() {
        let steps = parse_test_steps(
            r#"{"steps":[{"step":"ignored"}],"test_cases":[{"step":"kept","expected_result":"ok"}]}"#,
        );
        assert_eq!(steps, vec![TestStep::new("kept", "ok")]);
    }

    #[test]
    fn test_single_object_is_wrapped() {
        let outcome = parse_test_steps_detailed(r#"{"step":"only","expectedResult":"one"}"#);
        assert_eq!(outcome.steps, vec![TestStep::new("only", "one")]);
        assert_eq!(outcome.shape, Some("single"));
    }

    #[test]
    fn test_nested_steps_are_spliced_in_order() {
        let steps = parse_test_steps(
            r#"[
                {"step":"before","expected_result":"1"},
                {"name":"case","steps":[
                    {"step":"inner-a","expected_result":"2"},
                    {"step":"inner-b","expected_result":"3"}
                ]},
                {"step":"after","expected_result":"4"}
            ]"#,
        );
        let names: Vec<_> = steps.iter().map(|s| s.step.as_str()).collect();
        assert_eq!(names, vec!["before", "inner-a", "inner-b", "after"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let steps = parse_test_steps(r#"[{"step":"a"},{"step":"a"}]"#);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_string_elements_become_steps() {
        let steps = parse_test_steps(r#"{"steps":["Open page","Click save"]}"#);
        assert_eq!(
            steps,
            vec![TestStep::new("Open page", ""), TestStep::new("Click save", "")]
        );
    }

    #[test]
    fn test_invalid_json_placeholder_carries_diagnostic() {
        let outcome = parse_test_steps_detailed("not json");
        assert_eq!(outcome.steps.len(), 1);
        let step = &outcome.steps[0];
        assert_eq!(step.step, PARSE_FAILURE_STEP);
        assert!(step.expected_result.contains("Parsing error"));
        assert!(step.expected_result.contains("not json"));
        assert!(matches!(
            outcome.recovery,
            Some(ParseRecoveryNotice::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_snippet_is_bounded_and_single_line() {
        let raw = format!("oops\n{}", "x".repeat(1000));
        let steps = parse_test_steps(&raw);
        let ParseRecoveryNotice::InvalidJson { snippet, .. } =
            parse_test_steps_detailed(&raw).recovery.unwrap()
        else {
            panic!("expected invalid json notice");
        };
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS);
        assert!(!snippet.contains('\n'));
        assert!(steps[0].expected_result.contains("oops x"));
    }

    #[test]
    fn test_non_string_fields_are_stringified() {
        let steps = parse_test_steps(r#"[{"step":3,"expected_result":{"ok":true}}]"#);
        assert_eq!(steps, vec![TestStep::new("3", r#"{"ok":true}"#)]);
    }

    #[test]
    fn test_serializes_with_snake_case_and_accepts_camel_case() {
        let step = TestStep::new("a", "b");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, serde_json::json!({"step": "a", "expected_result": "b"}));

        let back: TestStep = serde_json::from_str(r#"{"step":"a","expectedResult":"b"}"#).unwrap();
        assert_eq!(back, step);
    }
}
