//! Acceptance-criteria mining.
//!
//! The structured path scans the top-level blocks of a description for a
//! heading mentioning "acceptance" and harvests the bullet lists beneath it,
//! stopping at the next heading. When that yields nothing, the flattened
//! description is scanned line by line for bullet-like lines instead.

use tracing::trace;

use crate::adf::{ListItem, Node};
use crate::extract::extract_text;

const SECTION_MARKER: &str = "acceptance";
const SECTION_PHRASE: &str = "acceptance criteria";
const BULLET_MARKERS: [char; 3] = ['•', '-', '*'];

/// Where the structured scan currently is relative to the target section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InSection,
}

/// Mine acceptance criteria from a description.
///
/// `blocks` are the description's top-level children; `fallback_text` is the
/// flattened description, consulted only when the structured scan finds no
/// criteria. Order follows the document; empty entries are dropped.
pub fn mine_acceptance_criteria(blocks: &[Node], fallback_text: &str) -> Vec<String> {
    let mut criteria = scan_sections(blocks);
    if criteria.is_empty() {
        trace!("no structured acceptance section, scanning plain text");
        criteria = scan_lines(fallback_text);
    }
    criteria.retain(|c| !c.trim().is_empty());
    criteria
}

fn scan_sections(blocks: &[Node]) -> Vec<String> {
    let mut criteria = Vec::new();
    let mut state = ScanState::Outside;

    for block in blocks {
        match (state, block) {
            (ScanState::Outside, Node::Heading { .. }) => {
                if extract_text(block).to_lowercase().contains(SECTION_MARKER) {
                    state = ScanState::InSection;
                }
            }
            (ScanState::InSection, Node::Heading { .. }) => break,
            (ScanState::InSection, Node::BulletList { items }) => {
                criteria.extend(items.iter().flat_map(item_text_runs));
            }
            _ => {}
        }
    }
    criteria
}

/// Text runs one level inside each block of a list item. Deeper nesting
/// (sub-lists, marks wrapping text) is not descended into.
fn item_text_runs(item: &ListItem) -> Vec<String> {
    item.children
        .iter()
        .flat_map(Node::children)
        .filter_map(|run| match run {
            Node::Text { value } => Some(value.trim()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

fn scan_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.to_lowercase().contains(SECTION_PHRASE))
        .map(str::trim)
        .filter(|line| line.starts_with(BULLET_MARKERS) || line.starts_with("The "))
        .map(|line| {
            line.trim_start_matches(|c: char| BULLET_MARKERS.contains(&c) || c.is_whitespace())
                .trim()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blocks() -> Vec<Node> {
        vec![
            Node::heading(2, "Background"),
            Node::bullet_list(["not a criterion"]),
            Node::heading(2, "Acceptance Criteria"),
            Node::bullet_list(["User can log in", "User sees dashboard", "Errors are shown"]),
            Node::heading(2, "Notes"),
            Node::bullet_list(["after the section"]),
        ]
    }

    #[test]
    fn test_structured_section_is_harvested_in_order() {
        let criteria = mine_acceptance_criteria(&sample_blocks(), "");
        assert_eq!(
            criteria,
            vec!["User can log in", "User sees dashboard", "Errors are shown"]
        );
    }

    #[test]
    fn test_any_heading_ends_the_section() {
        let blocks = vec![
            Node::heading(3, "acceptance"),
            Node::bullet_list(["one"]),
            Node::heading(3, "More acceptance notes"),
            Node::bullet_list(["two"]),
        ];
        assert_eq!(mine_acceptance_criteria(&blocks, ""), vec!["one"]);
    }

    #[test]
    fn test_paragraphs_inside_section_are_ignored() {
        let blocks = vec![
            Node::heading(2, "Acceptance criteria"),
            Node::text_paragraph("- looks like a bullet"),
            Node::bullet_list(["real bullet"]),
        ];
        assert_eq!(mine_acceptance_criteria(&blocks, ""), vec!["real bullet"]);
    }

    #[test]
    fn test_nested_sublists_are_not_descended() {
        let nested = ListItem {
            children: vec![
                Node::text_paragraph("parent"),
                Node::bullet_list(["child"]),
            ],
        };
        let blocks = vec![
            Node::heading(2, "Acceptance criteria"),
            Node::BulletList {
                items: vec![nested],
            },
        ];
        assert_eq!(mine_acceptance_criteria(&blocks, ""), vec!["parent"]);
    }

    #[test]
    fn test_blank_runs_are_skipped() {
        let blocks = vec![
            Node::heading(2, "Acceptance criteria"),
            Node::bullet_list(["  ", " trimmed "]),
        ];
        assert_eq!(mine_acceptance_criteria(&blocks, ""), vec!["trimmed"]);
    }

    #[test]
    fn test_fallback_lines() {
        let text = "Intro line\nAcceptance Criteria:\n- first item\n• second item\n* third\nThe button is blue\nTheme unchanged";
        assert_eq!(
            mine_acceptance_criteria(&[], text),
            vec!["first item", "second item", "third", "The button is blue"]
        );
    }

    #[test]
    fn test_fallback_skips_lines_mentioning_the_phrase() {
        let text = "- ACCEPTANCE CRITERIA below\n- keep me";
        assert_eq!(mine_acceptance_criteria(&[], text), vec!["keep me"]);
    }

    #[test]
    fn test_nothing_found() {
        let blocks = vec![Node::heading(2, "Overview"), Node::text_paragraph("plain")];
        assert!(mine_acceptance_criteria(&blocks, "plain").is_empty());
    }

    #[test]
    fn test_bare_marker_lines_are_dropped() {
        assert!(mine_acceptance_criteria(&[], "-\n*  ").is_empty());
    }
}
