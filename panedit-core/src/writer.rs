//! Document → interchange conversion
//!
//! # The High-Level Concept
//!
//! The inverse of the reader: marks on inline runs become wrapper tokens again
//! and footnote anchors pull their note body back inline as a `Note` token. The
//! output keeps the API version the document was loaded under.
//!
//! # The Algorithm
//!
//! Writers emit tokens through an append-only builder. The builder is a stack of
//! frames; [`WriterState::write_token`] and [`WriterState::write_array`] push a
//! frame, run the closure that fills it, and pop it into the parent as one value.
//!
//! Inline runs are written with a stack of open marks:
//!
//! 1. Sort the run's marks by writer priority (lowest outermost, ties by name).
//! 2. Keep the longest prefix shared with the currently open marks; close the
//!    rest innermost first. Closing a mark hands the collected tokens (and
//!    their plain text) to the mark's writer, which wraps them.
//! 3. Open the remaining marks of the run, then write the run itself.
//!
//! Since the nesting only depends on the mark sets, two documents that differ
//! only in the order marks were applied serialize identically.

use crate::doc::{self, Mark, MarkWriter, Node, PandocAttr, Schema};
use crate::error::WriteError;
use crate::pandoc::{tag, ApiVersion, PandocAst, Token, TokenValue};
use crate::registry::ConstructRegistry;
use serde_json::Value;
use std::collections::HashMap;

/// Tokens collected inside a mark, handed to its writer on close.
#[derive(Debug, Default)]
pub struct MarkContent {
    pub tokens: Vec<TokenValue>,
    /// Plain text of the run, for marks whose token holds a string (`Code`).
    pub text: String,
}

#[derive(Default)]
struct Frame {
    values: Vec<TokenValue>,
    text: String,
}

/// Append-only token builder for one write pass.
pub struct WriterState<'a> {
    registry: &'a ConstructRegistry,
    api_version: ApiVersion,
    frames: Vec<Frame>,
    notes: HashMap<&'a str, &'a Node>,
}

impl<'a> WriterState<'a> {
    fn new(registry: &'a ConstructRegistry, api_version: ApiVersion, notes: &'a Node) -> Self {
        let notes = notes
            .content
            .iter()
            .filter_map(|note| {
                note.attrs
                    .get_str(crate::constructs::footnote::ATTR_NOTE_ID)
                    .map(|id| (id, note))
            })
            .collect();
        WriterState {
            registry,
            api_version,
            frames: vec![Frame::default()],
            notes,
        }
    }

    pub fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    pub fn schema(&self) -> &'a Schema {
        self.registry.schema()
    }

    /// The note with the given id, if the document has one.
    pub fn note(&self, id: &str) -> Option<&'a Node> {
        self.notes.get(id).copied()
    }

    fn frame(&mut self) -> Result<&mut Frame, WriteError> {
        self.frames
            .last_mut()
            .ok_or(WriteError::Unbalanced("no open frame"))
    }

    fn pop_frame(&mut self) -> Result<Frame, WriteError> {
        if self.frames.len() < 2 {
            return Err(WriteError::Unbalanced("cannot close the root frame"));
        }
        self.frames
            .pop()
            .ok_or(WriteError::Unbalanced("no open frame"))
    }

    fn push(&mut self, value: TokenValue) -> Result<(), WriteError> {
        self.frame()?.values.push(value);
        Ok(())
    }

    fn push_text(&mut self, text: &str) -> Result<(), WriteError> {
        self.frame()?.text.push_str(text);
        Ok(())
    }

    /// Emit `t` with an array payload filled by `f`.
    pub fn write_token<F>(&mut self, t: &str, f: F) -> Result<(), WriteError>
    where
        F: FnOnce(&mut Self) -> Result<(), WriteError>,
    {
        self.frames.push(Frame::default());
        f(self)?;
        let frame = self.pop_frame()?;
        self.push(Token::with_children(t, frame.values).into())?;
        self.push_text(&frame.text)
    }

    /// Emit `t` without payload.
    pub fn write_leaf(&mut self, t: &str) -> Result<(), WriteError> {
        self.push(Token::new(t).into())
    }

    /// Emit an array filled by `f`.
    pub fn write_array<F>(&mut self, f: F) -> Result<(), WriteError>
    where
        F: FnOnce(&mut Self) -> Result<(), WriteError>,
    {
        self.frames.push(Frame::default());
        f(self)?;
        let frame = self.pop_frame()?;
        self.push(TokenValue::Array(frame.values))?;
        self.push_text(&frame.text)
    }

    pub fn write_attr(&mut self, attr: &PandocAttr) -> Result<(), WriteError> {
        self.push(attr.to_token_value())
    }

    pub fn write_string(&mut self, s: &str) -> Result<(), WriteError> {
        self.push(TokenValue::Str(s.to_string()))
    }

    pub fn write_int(&mut self, n: i64) -> Result<(), WriteError> {
        self.push(TokenValue::Int(n))
    }

    pub fn write_values(&mut self, values: Vec<TokenValue>) -> Result<(), WriteError> {
        self.frame()?.values.extend(values);
        Ok(())
    }

    /// Emit text as `Str` words separated by `Space` tokens.
    pub fn write_text(&mut self, text: &str) -> Result<(), WriteError> {
        let mut word = String::new();
        for ch in text.chars() {
            if ch == ' ' {
                if !word.is_empty() {
                    self.push(Token::str(std::mem::take(&mut word)).into())?;
                }
                self.write_leaf(tag::SPACE)?;
            } else {
                word.push(ch);
            }
        }
        if !word.is_empty() {
            self.push(Token::str(word).into())?;
        }
        self.push_text(text)
    }

    /// Write a node through its registered writer.
    pub fn write_node(&mut self, node: &Node) -> Result<(), WriteError> {
        let writer = self
            .registry
            .node_writer(&node.node_type)
            .ok_or_else(|| WriteError::NoNodeWriter(node.node_type.clone()))?;
        writer(self, node)
    }

    /// Write every child of `parent` as a block.
    pub fn write_blocks(&mut self, parent: &Node) -> Result<(), WriteError> {
        for child in &parent.content {
            self.write_node(child)?;
        }
        Ok(())
    }

    /// Emit a `Note` holding the live content of note `id`, or `fallback`
    /// when the document has no such note.
    pub fn write_note(&mut self, id: &str, fallback: &[Node]) -> Result<(), WriteError> {
        let note = self.note(id);
        self.write_token(tag::NOTE, |w| match note {
            Some(note) => w.write_blocks(note),
            None => fallback.iter().try_for_each(|block| w.write_node(block)),
        })
    }

    /// Write inline content, nesting mark tokens by priority.
    pub fn write_inlines(&mut self, content: &[Node]) -> Result<(), WriteError> {
        let mut open: Vec<Mark> = Vec::new();
        for node in content {
            let marks = self.sorted_marks(&node.marks)?;
            let keep = open
                .iter()
                .zip(&marks)
                .take_while(|(open, next)| open == next)
                .count();
            let closing: Vec<Mark> = open.drain(keep..).rev().collect();
            for mark in &closing {
                self.close_mark(mark)?;
            }
            for mark in &marks[keep..] {
                self.frames.push(Frame::default());
                open.push(mark.clone());
            }
            if node.is_text() {
                self.write_text(node.text_str())?;
            } else {
                let schema = self.schema();
                if let Some(mark) = marks.iter().find(|m| !schema.mark_allowed_on(&m.mark_type, node)) {
                    return Err(WriteError::MarkOnAtom {
                        node: node.node_type.clone(),
                        mark: mark.mark_type.clone(),
                    });
                }
                self.write_node(node)?;
            }
        }
        while let Some(mark) = open.pop() {
            self.close_mark(&mark)?;
        }
        Ok(())
    }

    fn mark_writer(&self, mark_type: &str) -> Result<MarkWriter, WriteError> {
        self.registry
            .mark_writer(mark_type)
            .ok_or_else(|| WriteError::NoMarkWriter(mark_type.to_string()))
    }

    fn sorted_marks(&self, marks: &[Mark]) -> Result<Vec<Mark>, WriteError> {
        let mut keyed = marks
            .iter()
            .map(|m| Ok((self.mark_writer(&m.mark_type)?.priority, m.clone())))
            .collect::<Result<Vec<_>, WriteError>>()?;
        keyed.sort_by(|(pa, a), (pb, b)| pa.cmp(pb).then_with(|| a.mark_type.cmp(&b.mark_type)));
        Ok(keyed.into_iter().map(|(_, m)| m).collect())
    }

    fn close_mark(&mut self, mark: &Mark) -> Result<(), WriteError> {
        let frame = self.pop_frame()?;
        let writer = self.mark_writer(&mark.mark_type)?;
        let text = frame.text.clone();
        (writer.write)(
            self,
            mark,
            MarkContent {
                tokens: frame.values,
                text: frame.text,
            },
        )?;
        self.push_text(&text)
    }

    fn finish(mut self) -> Result<Vec<Token>, WriteError> {
        if self.frames.len() != 1 {
            return Err(WriteError::Unbalanced("frames left open"));
        }
        let root = self.frame()?;
        std::mem::take(&mut root.values)
            .into_iter()
            .map(|value| match value {
                TokenValue::Token(token) => Ok(token),
                _ => Err(WriteError::Unbalanced("top level value is not a block token")),
            })
            .collect()
    }
}

/// Build an interchange tree from a document, tagged with `api_version`.
pub fn write_document(
    registry: &ConstructRegistry,
    doc: &Node,
    api_version: &ApiVersion,
) -> Result<PandocAst, WriteError> {
    let body = doc::body(doc).ok_or(WriteError::MissingContainer(doc::BODY))?;
    let notes = doc::notes(doc).ok_or(WriteError::MissingContainer(doc::NOTES))?;
    let mut state = WriterState::new(registry, api_version.clone(), notes);
    state.write_blocks(body)?;
    let blocks = state.finish()?;
    let meta = doc
        .attrs
        .get("meta")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Ok(PandocAst {
        api_version: api_version.clone(),
        meta,
        blocks,
    })
}
