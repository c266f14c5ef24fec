//! Rendering of a labelled model summary into a rich-text comment.
//!
//! The model is asked to answer with `Summary:`, `Details:`,
//! `Overall Status:`, `Next Steps:` and `Disclaimer:` sections. The reply is
//! split at those labels and re-synthesised as a document with headings,
//! paragraphs and bullet lists, with pass/fail marks on result lines.
//! Absent sections are simply left out.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::adf::Node;
use crate::obs;

/// Mark prefixed to passing results.
pub const PASS_MARK: &str = "✅";
/// Mark prefixed to everything else.
pub const FAIL_MARK: &str = "❌";
/// Title heading of every rendered comment.
pub const TITLE: &str = "QA Feedback on Automated Test Execution";

const CASE_MARKER: &str = "Test Case ID:";

static LABEL_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:summary|details|overall status|next steps|disclaimer):")
        .expect("static pattern compiles")
});
static CASE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}\d+").expect("static pattern compiles"));

/// The section vocabulary recognised in a model reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionLabel {
    Summary,
    Details,
    OverallStatus,
    NextSteps,
    Disclaimer,
}

impl SectionLabel {
    /// Every label, in rendering order.
    pub const ALL: [SectionLabel; 5] = [
        SectionLabel::Summary,
        SectionLabel::Details,
        SectionLabel::OverallStatus,
        SectionLabel::NextSteps,
        SectionLabel::Disclaimer,
    ];

    /// Lower-cased label text as it appears before the colon.
    pub fn key(self) -> &'static str {
        match self {
            SectionLabel::Summary => "summary",
            SectionLabel::Details => "details",
            SectionLabel::OverallStatus => "overall status",
            SectionLabel::NextSteps => "next steps",
            SectionLabel::Disclaimer => "disclaimer",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.key() == key)
    }
}

/// Label → raw section text, as split out of a model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSections {
    sections: HashMap<SectionLabel, String>,
}

impl RenderedSections {
    /// Split a reply at every recognised label. A repeated label keeps its
    /// last occurrence; text before the first label is ignored.
    pub fn parse(raw_reply: &str) -> Self {
        let mut bounds: Vec<usize> = LABEL_START.find_iter(raw_reply).map(|m| m.start()).collect();
        bounds.push(raw_reply.len());

        let mut sections = HashMap::new();
        let mut start = 0;
        for end in bounds {
            let chunk = &raw_reply[start..end];
            start = end;
            let Some((label, value)) = chunk.split_once(':') else {
                continue;
            };
            if let Some(label) = SectionLabel::from_key(&label.trim().to_lowercase()) {
                sections.insert(label, value.to_string());
            }
        }
        Self { sections }
    }

    /// Section text with surrounding whitespace and emphasis markers removed.
    pub fn get(&self, label: SectionLabel) -> Option<&str> {
        self.sections.get(&label).map(|text| clean(text))
    }

    /// Labels present, in rendering order.
    pub fn labels(&self) -> Vec<SectionLabel> {
        SectionLabel::ALL
            .into_iter()
            .filter(|label| self.sections.contains_key(label))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Render a labelled model summary as a comment document.
///
/// Deterministic: the same reply always yields the same tree.
pub fn render_summary(raw_reply: &str) -> Node {
    let sections = RenderedSections::parse(raw_reply);
    let mut blocks = vec![Node::heading(2, TITLE), Node::spacer()];
    let mut case_count = 0;

    if let Some(summary) = sections.get(SectionLabel::Summary) {
        blocks.push(Node::heading(3, "Summary"));
        push_paragraph(&mut blocks, summary);
        blocks.push(Node::spacer());
    }

    if let Some(details) = sections.get(SectionLabel::Details) {
        blocks.push(Node::heading(3, "Detailed Test Case Results"));
        blocks.push(Node::spacer());
        for (index, segment) in case_segments(details).into_iter().enumerate() {
            render_case(index + 1, segment, &mut blocks);
            case_count += 1;
        }
    }

    if let Some(status) = sections.get(SectionLabel::OverallStatus) {
        blocks.push(Node::heading(3, "Overall Status"));
        if !status.is_empty() {
            blocks.push(Node::text_paragraph(format!("{} {status}", mark_for(status))));
        }
        blocks.push(Node::spacer());
    }

    if let Some(next_steps) = sections.get(SectionLabel::NextSteps) {
        blocks.push(Node::heading(3, "Next Steps"));
        let items = split_after_periods(next_steps);
        if !items.is_empty() {
            blocks.push(Node::bullet_list(items));
        }
        blocks.push(Node::spacer());
    }

    if let Some(disclaimer) = sections.get(SectionLabel::Disclaimer) {
        blocks.push(Node::heading(3, "Disclaimer"));
        push_paragraph(&mut blocks, disclaimer);
    }

    let present: Vec<&str> = sections.labels().into_iter().map(SectionLabel::key).collect();
    obs::emit_summary_rendered(&present, case_count);
    Node::document(blocks)
}

/// Pass mark when the text mentions "pass" (any case), fail mark otherwise.
pub fn mark_for(text: &str) -> &'static str {
    if text.to_lowercase().contains("pass") {
        PASS_MARK
    } else {
        FAIL_MARK
    }
}

/// Text runs and bullet lists must not be empty in a posted document, so a
/// labelled section with no text keeps only its heading.
fn push_paragraph(blocks: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        blocks.push(Node::text_paragraph(text));
    }
}

fn case_segments(details: &str) -> Vec<&str> {
    details
        .split(CASE_MARKER)
        .filter(|segment| !clean(segment).is_empty())
        .collect()
}

fn render_case(number: usize, segment: &str, blocks: &mut Vec<Node>) {
    let sentences = sentences_of(segment);
    let label = sentences
        .first()
        .and_then(|first| CASE_CODE.find(first))
        .map_or_else(|| format!("Case {number}"), |m| m.as_str().to_string());
    blocks.push(Node::heading(4, format!("Test Case {number}: {label}")));

    let mut lines = Vec::new();
    if let Some(purpose) = sentences.iter().find(|s| starts_with_ignore_case(s, "purpose:")) {
        lines.push(purpose.clone());
    }
    if let Some(result) = sentences.iter().find(|s| starts_with_ignore_case(s, "result:")) {
        lines.push(format!("{} {result}", mark_for(result)));
    }
    if !lines.is_empty() {
        blocks.push(Node::bullet_list(lines));
    }
    blocks.push(Node::spacer());
}

/// Sentences of a case segment, split on ". " and line breaks.
fn sentences_of(segment: &str) -> Vec<String> {
    segment
        .split(". ")
        .flat_map(str::lines)
        .map(|sentence| sentence.replace('*', "").trim().to_string())
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// Split after every period that is followed by whitespace, dropping list
/// markers and empty items.
fn split_after_periods(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut previous = None;
    for (index, c) in text.char_indices() {
        if c.is_whitespace() && previous == Some('.') {
            pieces.push(&text[start..index]);
            start = index;
        }
        previous = Some(c);
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(|piece| {
            piece
                .trim()
                .trim_start_matches(['#', '*', '-', '•'])
                .trim()
                .to_string()
        })
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn clean(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_split_at_labels() {
        let sections = RenderedSections::parse(
            "Summary: all good.\nDetails: Test Case ID: TC01. Result: Passed.\nDisclaimer: none",
        );
        assert_eq!(sections.get(SectionLabel::Summary), Some("all good."));
        assert_eq!(
            sections.get(SectionLabel::Details),
            Some("Test Case ID: TC01. Result: Passed.")
        );
        assert_eq!(sections.get(SectionLabel::Disclaimer), Some("none"));
        assert_eq!(sections.get(SectionLabel::NextSteps), None);
    }

    #[test]
    fn test_labels_are_case_insensitive_and_last_wins() {
        let sections = RenderedSections::parse("SUMMARY: first\nsummary: second");
        assert_eq!(sections.get(SectionLabel::Summary), Some("second"));
        assert_eq!(sections.labels(), vec![SectionLabel::Summary]);
    }

    #[test]
    fn test_preamble_is_ignored() {
        let sections = RenderedSections::parse("Note: hello\nOverall Status: Passed");
        assert_eq!(sections.labels(), vec![SectionLabel::OverallStatus]);
    }

    #[test]
    fn test_no_labels_renders_title_only() {
        let doc = render_summary("just some prose");
        assert_eq!(
            doc,
            Node::document(vec![Node::heading(2, TITLE), Node::spacer()])
        );
    }

    fn assert_no_empty_runs_or_lists(node: &Node) {
        match node {
            Node::Text { value } => assert!(!value.is_empty(), "empty text run"),
            Node::BulletList { items } => {
                assert!(!items.is_empty(), "bullet list without items");
                for item in items {
                    item.children.iter().for_each(assert_no_empty_runs_or_lists);
                }
            }
            other => other.children().iter().for_each(assert_no_empty_runs_or_lists),
        }
    }

    #[test]
    fn test_empty_sections_keep_only_headings() {
        let doc = render_summary("Summary:\nOverall Status: **\nNext Steps:   \nDisclaimer:");
        assert_no_empty_runs_or_lists(&doc);
        assert_eq!(
            doc,
            Node::document(vec![
                Node::heading(2, TITLE),
                Node::spacer(),
                Node::heading(3, "Summary"),
                Node::spacer(),
                Node::heading(3, "Overall Status"),
                Node::spacer(),
                Node::heading(3, "Next Steps"),
                Node::spacer(),
                Node::heading(3, "Disclaimer"),
            ])
        );
    }

    #[test]
    fn test_case_label_from_code_or_position() {
        let mut blocks = Vec::new();
        render_case(1, " TC07. Purpose: Check login. Result: Passed.", &mut blocks);
        render_case(2, " login flow. Result: Failed.", &mut blocks);
        assert_eq!(blocks[0], Node::heading(4, "Test Case 1: TC07"));
        assert_eq!(
            blocks[1],
            Node::bullet_list(["Purpose: Check login", "✅ Result: Passed."])
        );
        assert_eq!(blocks[3], Node::heading(4, "Test Case 2: Case 2"));
        assert_eq!(blocks[4], Node::bullet_list(["❌ Result: Failed."]));
    }

    #[test]
    fn test_case_without_purpose_or_result_has_no_list() {
        let mut blocks = Vec::new();
        render_case(1, " AB12 only an id", &mut blocks);
        assert_eq!(
            blocks,
            vec![Node::heading(4, "Test Case 1: AB12"), Node::spacer()]
        );
    }

    #[test]
    fn test_wiki_emphasis_is_tolerated() {
        let doc = render_summary(
            "*Details:*\n* *Test Case ID: TC01*\n  *Purpose:* Open settings.\n  *Result:* Passed.\n",
        );
        let Node::Document { children } = doc else {
            panic!("expected document");
        };
        assert!(children.contains(&Node::heading(4, "Test Case 1: TC01")));
        assert!(children.contains(&Node::bullet_list([
            "Purpose: Open settings.",
            "✅ Result: Passed."
        ])));
    }

    #[test]
    fn test_split_after_periods() {
        assert_eq!(
            split_after_periods("Deploy. Monitor staging.\n# Add tests.   "),
            vec!["Deploy.", "Monitor staging.", "Add tests."]
        );
        assert_eq!(split_after_periods("v1.2 rollout"), vec!["v1.2 rollout"]);
    }

    #[test]
    fn test_mark_for() {
        assert_eq!(mark_for("All tests PASSED"), PASS_MARK);
        assert_eq!(mark_for("2 tests failed"), FAIL_MARK);
    }
}
