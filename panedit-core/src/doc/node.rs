//! Document tree nodes and marks
//!
//! Nodes are plain values: a type name, an attribute bag, ordered children, and
//! for text nodes the text itself. Inline nodes carry the marks that apply to
//! them. Identity is positional, so everything that refers into a tree does so
//! with a [`Path`] of child indexes from the root.

use super::attrs::Attrs;
use serde::{Deserialize, Serialize};

/// Child indexes from the document root.
pub type Path = Vec<usize>;

pub const TEXT: &str = "text";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Mark {
            mark_type: mark_type.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(mark_type: impl Into<String>, attrs: Attrs) -> Self {
        Mark {
            mark_type: mark_type.into(),
            attrs,
        }
    }

    pub fn is(&self, mark_type: &str) -> bool {
        self.mark_type == mark_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Node {
    pub fn new(node_type: impl Into<String>) -> Self {
        Node {
            node_type: node_type.into(),
            attrs: Attrs::new(),
            content: Vec::new(),
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node {
            text: Some(text.into()),
            ..Node::new(TEXT)
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    pub fn is(&self, node_type: &str) -> bool {
        self.node_type == node_type
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn has_mark(&self, mark_type: &str) -> bool {
        self.marks.iter().any(|m| m.is(mark_type))
    }

    /// Width of this node inside inline content: characters for text, one for
    /// any other inline node.
    pub fn inline_len(&self) -> usize {
        match &self.text {
            Some(text) => text.chars().count(),
            None => 1,
        }
    }

    /// Width of this node's inline content, the offset range of a textblock.
    pub fn content_len(&self) -> usize {
        self.content.iter().map(Node::inline_len).sum()
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.text {
            Some(text) => out.push_str(text),
            None => {
                for child in &self.content {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.content.last()
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let mut node = self;
        for &index in path {
            node = node.content.get(index)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for &index in path {
            node = node.content.get_mut(index)?;
        }
        Some(node)
    }

    /// Nodes along `path`, root first, each with its own path.
    pub fn ancestors(&self, path: &[usize]) -> Vec<(Path, &Node)> {
        let mut out = vec![(Vec::new(), self)];
        let mut node = self;
        for (depth, &index) in path.iter().enumerate() {
            match node.content.get(index) {
                Some(child) => {
                    node = child;
                    out.push((path[..=depth].to_vec(), node));
                }
                None => break,
            }
        }
        out
    }

    /// Pre-order walk over every descendant (not including `self`).
    pub fn descendants(&self) -> Vec<(Path, &Node)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.walk(&mut path, &mut out);
        out
    }

    fn walk<'a>(&'a self, path: &mut Path, out: &mut Vec<(Path, &'a Node)>) {
        for (index, child) in self.content.iter().enumerate() {
            path.push(index);
            out.push((path.clone(), child));
            child.walk(path, out);
            path.pop();
        }
    }

    /// Descendants of the given type, in document order.
    pub fn find_all(&self, node_type: &str) -> Vec<(Path, &Node)> {
        self.descendants()
            .into_iter()
            .filter(|(_, node)| node.is(node_type))
            .collect()
    }

    /// Whether this node or any descendant has the given type.
    pub fn contains_type(&self, node_type: &str) -> bool {
        self.is(node_type) || self.content.iter().any(|c| c.contains_type(node_type))
    }

    /// Every node type appearing in this subtree, including `self`.
    pub fn collect_types(&self, out: &mut std::collections::BTreeSet<String>) {
        out.insert(self.node_type.clone());
        for child in &self.content {
            child.collect_types(out);
        }
    }
}
