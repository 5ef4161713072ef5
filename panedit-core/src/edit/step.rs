//! Primitive edits
//!
//! A [`Step`] is the smallest change the session understands. Applying one
//! never mutates its input: it returns a new tree, or a [`StepError`] when the
//! step does not fit the document (a stale path, an out-of-range offset, a
//! child the parent's content rule does not accept). Cardinality is not
//! checked per step so a transaction may pass through transiently short
//! containers that a later step or a repair fills again.

use crate::doc::{inline, Attrs, Mark, Node, Path, Schema};
use crate::error::StepError;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Replace children `from..to` of the node at `parent`.
    Replace {
        parent: Path,
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    },
    /// Replace the attributes of the node at `path`.
    SetAttrs { path: Path, attrs: Attrs },
    AddMark {
        block: Path,
        from: usize,
        to: usize,
        mark: Mark,
    },
    RemoveMark {
        block: Path,
        from: usize,
        to: usize,
        mark_type: String,
    },
    /// Insert text; without explicit marks it inherits them per inclusivity.
    InsertText {
        block: Path,
        offset: usize,
        text: String,
        marks: Option<Vec<Mark>>,
    },
    /// Replace the inline range `from..to` of a textblock.
    ReplaceInline {
        block: Path,
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    },
}

/// The part of the tree one step changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRegion {
    /// Container whose children (or inline content) changed.
    pub parent: Path,
    pub from: usize,
    pub to: usize,
    /// Node types removed, inserted, or on the ancestor chain of `parent`.
    pub touched: BTreeSet<String>,
}

impl ChangeRegion {
    /// A region covering the whole document.
    pub fn whole(doc: &Node) -> Self {
        let mut touched = BTreeSet::new();
        doc.collect_types(&mut touched);
        ChangeRegion {
            parent: Vec::new(),
            from: 0,
            to: doc.content.len(),
            touched,
        }
    }

    pub fn touches(&self, node_type: &str) -> bool {
        self.touched.contains(node_type)
    }
}

fn node_at<'a>(doc: &'a Node, path: &[usize]) -> Result<&'a Node, StepError> {
    doc.node_at(path)
        .ok_or_else(|| StepError::InvalidPath(path.to_vec()))
}

fn node_at_mut<'a>(doc: &'a mut Node, path: &[usize]) -> Result<&'a mut Node, StepError> {
    doc.node_at_mut(path)
        .ok_or_else(|| StepError::InvalidPath(path.to_vec()))
}

fn check_children(schema: &Schema, parent: &Node, nodes: &[Node]) -> Result<(), StepError> {
    for node in nodes {
        if schema.node(&node.node_type).is_none() {
            return Err(StepError::UnknownType(node.node_type.clone()));
        }
        if !schema.allows_child(&parent.node_type, node) {
            return Err(StepError::ContentNotAllowed {
                parent: parent.node_type.clone(),
                child: node.node_type.clone(),
            });
        }
        if let Some(mark) = node.marks.iter().find(|m| !schema.mark_allowed_on(&m.mark_type, node)) {
            return Err(StepError::ContentNotAllowed {
                parent: node.node_type.clone(),
                child: mark.mark_type.clone(),
            });
        }
    }
    Ok(())
}

fn textblock<'a>(schema: &Schema, doc: &'a Node, path: &[usize]) -> Result<&'a Node, StepError> {
    let node = node_at(doc, path)?;
    if !schema.is_textblock(node) {
        return Err(StepError::NotTextblock(path.to_vec()));
    }
    Ok(node)
}

fn check_inline_range(block: &Node, path: &[usize], from: usize, to: usize) -> Result<(), StepError> {
    if from > to || to > block.content_len() {
        return Err(StepError::InvalidRange {
            path: path.to_vec(),
            from,
            to,
        });
    }
    Ok(())
}

impl Step {
    /// Apply the step to `doc`, returning the new tree.
    pub fn apply(&self, schema: &Schema, doc: &Node) -> Result<Node, StepError> {
        let mut out = doc.clone();
        match self {
            Step::Replace {
                parent,
                from,
                to,
                nodes,
            } => {
                let target = node_at(doc, parent)?;
                if from > to || *to > target.content.len() {
                    return Err(StepError::InvalidRange {
                        path: parent.clone(),
                        from: *from,
                        to: *to,
                    });
                }
                check_children(schema, target, nodes)?;
                let target = node_at_mut(&mut out, parent)?;
                target.content.splice(*from..*to, nodes.iter().cloned());
                if schema.is_textblock(target) {
                    target.content = inline::normalize(std::mem::take(&mut target.content));
                }
            }
            Step::SetAttrs { path, attrs } => {
                node_at_mut(&mut out, path)?.attrs = attrs.clone();
            }
            Step::AddMark {
                block,
                from,
                to,
                mark,
            } => {
                let node = textblock(schema, doc, block)?;
                check_inline_range(node, block, *from, *to)?;
                if schema.mark(&mark.mark_type).is_none() {
                    return Err(StepError::UnknownType(mark.mark_type.clone()));
                }
                if !schema.allows_marks(&node.node_type) {
                    return Err(StepError::ContentNotAllowed {
                        parent: node.node_type.clone(),
                        child: mark.mark_type.clone(),
                    });
                }
                let content = inline::add_mark(schema, &node.content, *from, *to, mark);
                node_at_mut(&mut out, block)?.content = content;
            }
            Step::RemoveMark {
                block,
                from,
                to,
                mark_type,
            } => {
                let node = textblock(schema, doc, block)?;
                check_inline_range(node, block, *from, *to)?;
                let content = inline::remove_mark(&node.content, *from, *to, mark_type);
                node_at_mut(&mut out, block)?.content = content;
            }
            Step::InsertText {
                block,
                offset,
                text,
                marks,
            } => {
                let node = textblock(schema, doc, block)?;
                check_inline_range(node, block, *offset, *offset)?;
                let marks = if schema.allows_marks(&node.node_type) {
                    marks
                        .clone()
                        .unwrap_or_else(|| inline::marks_for_insertion(schema, &node.content, *offset))
                } else {
                    Vec::new()
                };
                let content = inline::insert_text(&node.content, *offset, text, marks);
                node_at_mut(&mut out, block)?.content = content;
            }
            Step::ReplaceInline {
                block,
                from,
                to,
                nodes,
            } => {
                let node = textblock(schema, doc, block)?;
                check_inline_range(node, block, *from, *to)?;
                check_children(schema, node, nodes)?;
                if !schema.allows_marks(&node.node_type) && nodes.iter().any(|n| !n.marks.is_empty()) {
                    return Err(StepError::ContentNotAllowed {
                        parent: node.node_type.clone(),
                        child: "marked text".to_string(),
                    });
                }
                let content = inline::replace(&node.content, *from, *to, nodes.clone());
                node_at_mut(&mut out, block)?.content = content;
            }
        }
        Ok(out)
    }

    /// The region this step changes, computed against the tree it applies to.
    pub fn region(&self, doc: &Node) -> ChangeRegion {
        let (parent, from, to) = match self {
            Step::Replace {
                parent, from, to, ..
            } => (parent.clone(), *from, *to),
            Step::SetAttrs { path, .. } => match path.split_last() {
                Some((&last, parent)) => (parent.to_vec(), last, last + 1),
                None => (Vec::new(), 0, doc.content.len()),
            },
            Step::AddMark {
                block, from, to, ..
            }
            | Step::RemoveMark {
                block, from, to, ..
            }
            | Step::ReplaceInline {
                block, from, to, ..
            } => (block.clone(), *from, *to),
            Step::InsertText { block, offset, .. } => (block.clone(), *offset, *offset),
        };

        let mut touched = BTreeSet::new();
        for (_, ancestor) in doc.ancestors(&parent) {
            touched.insert(ancestor.node_type.clone());
        }
        match self {
            Step::Replace { nodes, .. } => {
                if let Some(container) = doc.node_at(&parent) {
                    for child in container.content.iter().skip(from).take(to.saturating_sub(from)) {
                        child.collect_types(&mut touched);
                    }
                }
                for node in nodes {
                    node.collect_types(&mut touched);
                }
            }
            Step::SetAttrs { path, .. } => {
                if let Some(node) = doc.node_at(path) {
                    touched.insert(node.node_type.clone());
                }
            }
            Step::ReplaceInline { nodes, .. } => {
                if let Some(block) = doc.node_at(&parent) {
                    for child in inline::slice(&block.content, from, to) {
                        child.collect_types(&mut touched);
                    }
                }
                for node in nodes {
                    node.collect_types(&mut touched);
                }
            }
            Step::AddMark { .. } | Step::RemoveMark { .. } | Step::InsertText { .. } => {
                touched.insert(crate::doc::node::TEXT.to_string());
            }
        }

        let to = match self {
            Step::Replace { nodes, .. } => from + nodes.len(),
            _ => to,
        };
        ChangeRegion {
            parent,
            from,
            to,
            touched,
        }
    }
}
