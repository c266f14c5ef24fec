//! Plain-text flattening of node trees.

use crate::adf::Node;

/// Flatten a node tree into trimmed plain text.
///
/// Children are visited depth-first in document order; each child's text is
/// followed by a newline and every level is trimmed, so blank runs collapse
/// at container boundaries. `None` yields an empty string.
///
/// Re-extracting the output wrapped in a single text node returns it
/// unchanged.
pub fn extract_text<'a>(node: impl Into<Option<&'a Node>>) -> String {
    node.into().map(flatten).unwrap_or_default()
}

fn flatten(node: &Node) -> String {
    match node {
        Node::Text { value } => value.trim().to_string(),
        Node::BulletList { items } => {
            let mut text = String::new();
            for item in items {
                text.push_str(&flatten_all(&item.children));
                text.push('\n');
            }
            text.trim().to_string()
        }
        container => flatten_all(container.children()),
    }
}

fn flatten_all(children: &[Node]) -> String {
    let mut text = String::new();
    for child in children {
        text.push_str(&flatten(child));
        text.push('\n');
    }
    text.trim().to_string()
}
