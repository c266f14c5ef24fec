//! Rich-text node tree and its JSON document codec.
//!
//! Tickets store descriptions and comments as a nested block/inline tree
//! (`doc` → `heading` / `paragraph` / `bulletList` → `listItem` → `text`).
//! [`Node`] is a closed sum type over the variants the transforms care about;
//! anything else is kept as [`Node::Other`] so text extraction can still
//! descend into it.
//!
//! Conversion from JSON is permissive: every value maps to *some* node and
//! never fails, since payloads come from an external service.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

/// A node in a rich-text document tree.
///
/// Only [`Node::Text`] carries literal text. Containers own their children
/// exclusively; trees are built fresh and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text { value: String },
    Paragraph { children: Vec<Node> },
    Heading { level: u8, children: Vec<Node> },
    BulletList { items: Vec<ListItem> },
    ListItem(ListItem),
    Document { children: Vec<Node> },
    /// Any node type outside the recognised vocabulary (ordered lists,
    /// panels, table cells, ...). `kind` is the raw `type` tag, empty when
    /// the source value was not an object.
    Other { kind: String, children: Vec<Node> },
}

/// A single bullet list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    pub children: Vec<Node>,
}

impl ListItem {
    /// List item holding one paragraph of plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            children: vec![Node::text_paragraph(text)],
        }
    }

    /// Convert a JSON value into a list item, wrapping non-item nodes.
    pub fn from_value(value: &Value) -> Self {
        match Node::from_value(value) {
            Node::ListItem(item) => item,
            node => Self {
                children: vec![node],
            },
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": "listItem",
            "content": to_values(&self.children),
        })
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    /// Paragraph containing a single text run.
    pub fn text_paragraph(value: impl Into<String>) -> Self {
        Node::Paragraph {
            children: vec![Node::text(value)],
        }
    }

    /// Heading with a single text run.
    pub fn heading(level: u8, value: impl Into<String>) -> Self {
        Node::Heading {
            level,
            children: vec![Node::text(value)],
        }
    }

    /// Bullet list with one text paragraph per item.
    pub fn bullet_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::BulletList {
            items: items.into_iter().map(ListItem::from_text).collect(),
        }
    }

    /// Empty paragraph used as vertical space between blocks.
    pub fn spacer() -> Self {
        Node::Paragraph {
            children: Vec::new(),
        }
    }

    pub fn document(children: Vec<Node>) -> Self {
        Node::Document { children }
    }

    /// Direct child nodes. Bullet lists hold their entries in `items`
    /// and report no children here.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::Document { children }
            | Node::Other { children, .. } => children,
            Node::ListItem(item) => &item.children,
            Node::Text { .. } | Node::BulletList { .. } => &[],
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Node::Heading { .. })
    }

    /// Build a node from the service's JSON document format.
    ///
    /// Strings become text nodes; arrays and unknown objects become
    /// [`Node::Other`] containers.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Node::text(s.clone()),
            Value::Array(values) => Node::Other {
                kind: String::new(),
                children: values.iter().map(Node::from_value).collect(),
            },
            Value::Object(map) => Self::from_object(map),
            _ => Node::Other {
                kind: String::new(),
                children: Vec::new(),
            },
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let kind = map.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "text" => Node::Text {
                value: map
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            "paragraph" => Node::Paragraph {
                children: child_nodes(map),
            },
            "heading" => Node::Heading {
                level: heading_level(map),
                children: child_nodes(map),
            },
            "bulletList" => Node::BulletList {
                items: content_of(map).iter().map(ListItem::from_value).collect(),
            },
            "listItem" => Node::ListItem(ListItem {
                children: child_nodes(map),
            }),
            "doc" => Node::Document {
                children: child_nodes(map),
            },
            other => Node::Other {
                kind: other.to_string(),
                children: child_nodes(map),
            },
        }
    }

    /// Serialize into the service's JSON document format.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Text { value } => json!({ "type": "text", "text": value }),
            Node::Paragraph { children } => json!({
                "type": "paragraph",
                "content": to_values(children),
            }),
            Node::Heading { level, children } => json!({
                "type": "heading",
                "attrs": { "level": level },
                "content": to_values(children),
            }),
            Node::BulletList { items } => json!({
                "type": "bulletList",
                "content": items.iter().map(ListItem::to_value).collect::<Vec<_>>(),
            }),
            Node::ListItem(item) => item.to_value(),
            Node::Document { children } => json!({
                "type": "doc",
                "version": 1,
                "content": to_values(children),
            }),
            Node::Other { kind, children } => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::String(kind.clone()));
                if !children.is_empty() {
                    map.insert("content".to_string(), Value::Array(to_values(children)));
                }
                Value::Object(map)
            }
        }
    }
}

fn content_of(map: &Map<String, Value>) -> &[Value] {
    map.get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn child_nodes(map: &Map<String, Value>) -> Vec<Node> {
    content_of(map).iter().map(Node::from_value).collect()
}

fn heading_level(map: &Map<String, Value>) -> u8 {
    map.get("attrs")
        .and_then(|attrs| attrs.get("level"))
        .and_then(Value::as_u64)
        .map(|level| level.clamp(1, 6) as u8)
        .unwrap_or(1)
}

fn to_values(nodes: &[Node]) -> Vec<Value> {
    nodes.iter().map(Node::to_value).collect()
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Node::from_value(&value))
    }
}
