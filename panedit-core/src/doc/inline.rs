//! Operations over the inline content of a textblock
//!
//! Inline content is a flat run of text nodes and inline atoms, each carrying
//! its own mark set. Offsets count characters: a text node is as wide as its
//! text, any other inline node is one wide. Every operation returns
//! normalized content: no empty text nodes and no two adjacent text nodes with
//! equal marks.

use super::node::{Mark, Node};
use super::schema::Schema;

pub fn inline_len(content: &[Node]) -> usize {
    content.iter().map(Node::inline_len).sum()
}

/// Drop empty text and merge adjacent text nodes with equal marks.
pub fn normalize(content: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(content.len());
    for node in content {
        if node.is_text() && node.text_str().is_empty() {
            continue;
        }
        if let Some(prev) = out.last_mut() {
            if prev.is_text() && node.is_text() && prev.marks == node.marks {
                let mut text = prev.text.take().unwrap_or_default();
                text.push_str(node.text_str());
                prev.text = Some(text);
                continue;
            }
        }
        out.push(node);
    }
    out
}

fn split_text(node: &Node, at: usize) -> (Node, Node) {
    let text = node.text_str();
    let byte = text
        .char_indices()
        .nth(at)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let mut left = node.clone();
    let mut right = node.clone();
    left.text = Some(text[..byte].to_string());
    right.text = Some(text[byte..].to_string());
    (left, right)
}

/// Split content at a character offset.
pub fn split_at(content: &[Node], offset: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;
    for node in content {
        let len = node.inline_len();
        if pos + len <= offset {
            left.push(node.clone());
        } else if pos >= offset {
            right.push(node.clone());
        } else {
            let (a, b) = split_text(node, offset - pos);
            left.push(a);
            right.push(b);
        }
        pos += len;
    }
    (left, right)
}

/// Split content into the parts before `from`, between, and after `to`.
pub fn split_range(content: &[Node], from: usize, to: usize) -> (Vec<Node>, Vec<Node>, Vec<Node>) {
    let (before, rest) = split_at(content, from);
    let (middle, after) = split_at(&rest, to.saturating_sub(from));
    (before, middle, after)
}

pub fn slice(content: &[Node], from: usize, to: usize) -> Vec<Node> {
    split_range(content, from, to).1
}

/// Replace the range `from..to` with `nodes`.
pub fn replace(content: &[Node], from: usize, to: usize, nodes: Vec<Node>) -> Vec<Node> {
    let (mut before, _, after) = split_range(content, from, to);
    before.extend(nodes);
    before.extend(after);
    normalize(before)
}

/// Apply `mark` to every node in `from..to` that may carry it.
pub fn add_mark(schema: &Schema, content: &[Node], from: usize, to: usize, mark: &Mark) -> Vec<Node> {
    let (mut before, middle, after) = split_range(content, from, to);
    before.extend(middle.into_iter().map(|mut node| {
        if schema.mark_allowed_on(&mark.mark_type, &node) {
            node.marks = schema.add_mark_to_set(&node.marks, mark);
        }
        node
    }));
    before.extend(after);
    normalize(before)
}

/// Remove every mark of `mark_type` in `from..to`.
pub fn remove_mark(content: &[Node], from: usize, to: usize, mark_type: &str) -> Vec<Node> {
    let (mut before, middle, after) = split_range(content, from, to);
    before.extend(middle.into_iter().map(|mut node| {
        node.marks.retain(|m| !m.is(mark_type));
        node
    }));
    before.extend(after);
    normalize(before)
}

/// Whether any node overlapping `from..to` carries the mark.
pub fn range_has_mark(content: &[Node], from: usize, to: usize, mark_type: &str) -> bool {
    slice(content, from, to).iter().any(|n| n.has_mark(mark_type))
}

fn node_around(content: &[Node], offset: usize) -> (Option<&Node>, Option<&Node>) {
    let mut pos = 0;
    let mut before = None;
    for node in content {
        let len = node.inline_len();
        if offset > pos && offset < pos + len {
            return (Some(node), Some(node));
        }
        if pos + len == offset {
            before = Some(node);
        }
        if pos == offset {
            return (before, Some(node));
        }
        pos += len;
    }
    (before, None)
}

/// Marks that text inserted at `offset` inherits.
///
/// Text inherits the marks of the character before it, except non-inclusive
/// marks that end at this boundary. At the very start it inherits only the
/// inclusive marks of what follows.
pub fn marks_for_insertion(schema: &Schema, content: &[Node], offset: usize) -> Vec<Mark> {
    let inclusive = |m: &Mark| schema.mark(&m.mark_type).is_some_and(|s| s.inclusive);
    match node_around(content, offset) {
        (Some(before), after) => before
            .marks
            .iter()
            .filter(|m| inclusive(m) || after.is_some_and(|a| a.marks.contains(m)))
            .cloned()
            .collect(),
        (None, Some(after)) => after.marks.iter().filter(|m| inclusive(m)).cloned().collect(),
        (None, None) => Vec::new(),
    }
}

/// Marks on the node covering `from..to`, or at the cursor when the range is empty.
pub fn marks_in_range(content: &[Node], from: usize, to: usize) -> Vec<Mark> {
    if from == to {
        return match node_around(content, from) {
            (Some(node), _) | (None, Some(node)) => node.marks.clone(),
            (None, None) => Vec::new(),
        };
    }
    let mut marks: Vec<Mark> = Vec::new();
    for node in slice(content, from, to) {
        for mark in node.marks {
            if !marks.contains(&mark) {
                marks.push(mark);
            }
        }
    }
    marks
}

/// Insert `text` at `offset` carrying `marks`.
pub fn insert_text(content: &[Node], offset: usize, text: &str, marks: Vec<Mark>) -> Vec<Node> {
    replace(content, offset, offset, vec![Node::text(text).with_marks(marks)])
}

/// The extent of the run around `offset` that carries an equal `mark_type` mark.
pub fn mark_extent(content: &[Node], offset: usize, mark_type: &str) -> Option<(usize, usize, Mark)> {
    let mut pos = 0;
    let mut spans = Vec::new();
    for node in content {
        let len = node.inline_len();
        spans.push((pos, pos + len, node.marks.iter().find(|m| m.is(mark_type)).cloned()));
        pos += len;
    }
    let hit = spans.iter().position(|(start, end, mark)| {
        mark.is_some() && *start <= offset && offset <= *end
    })?;
    let mark = spans[hit].2.clone()?;
    let mut first = hit;
    while first > 0 && spans[first - 1].2.as_ref() == Some(&mark) {
        first -= 1;
    }
    let mut last = hit;
    while last + 1 < spans.len() && spans[last + 1].2.as_ref() == Some(&mark) {
        last += 1;
    }
    Some((spans[first].0, spans[last].1, mark))
}
