//! Interchange → document conversion
//!
//! # The High-Level Concept
//!
//! The Pandoc AST nests blocks and inlines the same way the document tree does,
//! except for two things: formatting is expressed as wrapper tokens (`Strong`,
//! `Link`, ...) instead of marks on text, and footnote bodies sit inline inside
//! `Note` tokens instead of in a separate container. The reader undoes both.
//!
//! # The Algorithm
//!
//! Recursive descent over the token tree with an explicit stack of open nodes
//! and a set of active marks:
//!
//! 1. Each token is dispatched by its tag to the first registered
//!    [`TokenReader`] whose optional predicate accepts it. No reader means the
//!    whole conversion fails; content is never dropped.
//! 2. Block readers open a node, read the token's children into it, and close
//!    it into the parent.
//! 3. Mark readers add a mark to the active set while their children are read,
//!    then restore the previous set. Text and inline atoms pick up the active
//!    marks as they are added.
//! 4. Text is appended to the previous text node when the marks are equal, so
//!    `Str "Hello"`, `Space` becomes one text node `"Hello "`.
//! 5. Notes are read in isolation (no inherited marks) into the notes
//!    container; the inline anchor keeps a cached snapshot of the content.
//!
//! The finished tree is validated against the schema.

use crate::doc::{self, inline, Attrs, Mark, Node, Schema};
use crate::error::ReadError;
use crate::pandoc::{PandocAst, Token, TokenValue};
use crate::registry::ConstructRegistry;
use serde_json::Value;

/// What a reader reads into the node or mark it opens.
pub enum ReadContent<'a> {
    /// Child tokens.
    Values(&'a [TokenValue]),
    /// A literal string, added as text.
    Text(String),
    None,
}

pub type AttrsFn = fn(&Token) -> Result<Attrs, ReadError>;
pub type ContentFn = fn(&Token) -> Result<ReadContent<'_>, ReadError>;
pub type TextFn = fn(&Token) -> Result<String, ReadError>;
pub type HandlerFn = fn(&mut ReaderState<'_>, &Token) -> Result<(), ReadError>;
pub type MatchFn = fn(&Token) -> bool;

pub enum ReaderKind {
    Text(TextFn),
    Block {
        node: String,
        attrs: Option<AttrsFn>,
        content: ContentFn,
    },
    Node {
        node: String,
        attrs: Option<AttrsFn>,
    },
    Mark {
        mark: String,
        attrs: Option<AttrsFn>,
        content: ContentFn,
    },
    Handler(HandlerFn),
}

/// Maps one token tag to document content.
pub struct TokenReader {
    pub token: String,
    pub matches: Option<MatchFn>,
    pub kind: ReaderKind,
}

impl TokenReader {
    fn new(token: &str, kind: ReaderKind) -> Self {
        TokenReader {
            token: token.to_string(),
            matches: None,
            kind,
        }
    }

    pub fn text(token: &str, text: TextFn) -> Self {
        Self::new(token, ReaderKind::Text(text))
    }

    pub fn block(token: &str, node: &str, content: ContentFn) -> Self {
        Self::new(
            token,
            ReaderKind::Block {
                node: node.to_string(),
                attrs: None,
                content,
            },
        )
    }

    pub fn node(token: &str, node: &str) -> Self {
        Self::new(
            token,
            ReaderKind::Node {
                node: node.to_string(),
                attrs: None,
            },
        )
    }

    pub fn mark(token: &str, mark: &str, content: ContentFn) -> Self {
        Self::new(
            token,
            ReaderKind::Mark {
                mark: mark.to_string(),
                attrs: None,
                content,
            },
        )
    }

    pub fn handler(token: &str, handler: HandlerFn) -> Self {
        Self::new(token, ReaderKind::Handler(handler))
    }

    /// Compute attributes from the token.
    pub fn attrs(mut self, attrs_fn: AttrsFn) -> Self {
        match &mut self.kind {
            ReaderKind::Block { attrs, .. }
            | ReaderKind::Node { attrs, .. }
            | ReaderKind::Mark { attrs, .. } => *attrs = Some(attrs_fn),
            ReaderKind::Text(_) | ReaderKind::Handler(_) => {}
        }
        self
    }

    /// Only handle tokens the predicate accepts.
    pub fn when(mut self, predicate: MatchFn) -> Self {
        self.matches = Some(predicate);
        self
    }

    pub fn accepts(&self, token: &Token) -> bool {
        self.token == token.t && self.matches.map_or(true, |m| m(token))
    }
}

/// Every child of the token.
pub fn all_children(token: &Token) -> Result<ReadContent<'_>, ReadError> {
    Ok(ReadContent::Values(token.children()))
}

/// The array child at `index`, failing on malformed payloads.
pub fn array_child(token: &Token, index: usize) -> Result<&[TokenValue], ReadError> {
    token
        .array_at(index)
        .ok_or_else(|| ReadError::malformed(&token.t, format!("expected an array at {index}")))
}

pub fn str_child(token: &Token, index: usize) -> Result<&str, ReadError> {
    token
        .str_at(index)
        .ok_or_else(|| ReadError::malformed(&token.t, format!("expected a string at {index}")))
}

/// Plain text of an inline token list (`Str`, spaces, and nested wrappers).
pub fn plain_text(values: &[TokenValue]) -> String {
    let mut out = String::new();
    for value in values {
        match value {
            TokenValue::Token(token) => match token.t.as_str() {
                "Str" => out.push_str(token.str_at(0).unwrap_or_default()),
                "Space" | "SoftBreak" | "LineBreak" => out.push(' '),
                _ => {
                    for child in token.children() {
                        out.push_str(&plain_text(std::slice::from_ref(child)));
                    }
                }
            },
            TokenValue::Array(items) => out.push_str(&plain_text(items)),
            _ => {}
        }
    }
    out
}

/// Mutable state of one read pass.
pub struct ReaderState<'r> {
    registry: &'r ConstructRegistry,
    stack: Vec<Node>,
    marks: Vec<Mark>,
    notes: Vec<Node>,
}

impl<'r> ReaderState<'r> {
    fn new(registry: &'r ConstructRegistry) -> Self {
        ReaderState {
            registry,
            stack: Vec::new(),
            marks: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'r Schema {
        self.registry.schema()
    }

    pub fn open_node(&mut self, node_type: &str, attrs: Attrs) {
        let node = self.schema().create(node_type, attrs);
        self.stack.push(node);
    }

    /// Close the innermost open node into its parent.
    pub fn close_node(&mut self) -> Result<(), ReadError> {
        let node = self.pop_node()?;
        self.top()?.content.push(node);
        Ok(())
    }

    fn pop_node(&mut self) -> Result<Node, ReadError> {
        let mut node = self
            .stack
            .pop()
            .ok_or_else(|| ReadError::Unbalanced("close".to_string()))?;
        if self.schema().is_textblock(&node) {
            node.content = inline::normalize(std::mem::take(&mut node.content));
        }
        Ok(node)
    }

    fn top(&mut self) -> Result<&mut Node, ReadError> {
        self.stack
            .last_mut()
            .ok_or_else(|| ReadError::Unbalanced("add".to_string()))
    }

    /// Add a finished node; inline nodes pick up the active marks.
    pub fn add_node(&mut self, mut node: Node) -> Result<(), ReadError> {
        if node.marks.is_empty() && self.schema().node(&node.node_type).is_some_and(|s| {
            s.group == doc::NodeGroup::Inline
        }) {
            node.marks = self.marks.clone();
        }
        self.top()?.content.push(node);
        Ok(())
    }

    pub fn add_text(&mut self, text: &str) -> Result<(), ReadError> {
        if text.is_empty() {
            return Ok(());
        }
        let marks = self.marks.clone();
        let top = self.top()?;
        if let Some(last) = top.content.last_mut() {
            if last.is_text() && last.marks == marks {
                if let Some(existing) = last.text.as_mut() {
                    existing.push_str(text);
                    return Ok(());
                }
            }
        }
        top.content.push(Node::text(text).with_marks(marks));
        Ok(())
    }

    /// Activate a mark; returns the previous set for [`ReaderState::leave_mark`].
    pub fn enter_mark(&mut self, mark: Mark) -> Vec<Mark> {
        let previous = self.marks.clone();
        self.marks = self.schema().add_mark_to_set(&self.marks, &mark);
        previous
    }

    pub fn leave_mark(&mut self, previous: Vec<Mark>) {
        self.marks = previous;
    }

    pub fn read_values(&mut self, values: &[TokenValue]) -> Result<(), ReadError> {
        for value in values {
            match value {
                TokenValue::Token(token) => self.read_token(token)?,
                other => {
                    return Err(ReadError::malformed(
                        "content",
                        format!("expected a token, found {other:?}"),
                    ))
                }
            }
        }
        Ok(())
    }

    pub fn read_token(&mut self, token: &Token) -> Result<(), ReadError> {
        let reader = self
            .registry
            .reader_for(token)
            .ok_or_else(|| ReadError::UnhandledToken(token.t.clone()))?;
        tracing::trace!(token = %token.t, "reading token");

        match &reader.kind {
            ReaderKind::Text(text) => {
                let text = text(token)?;
                self.add_text(&text)
            }
            ReaderKind::Block {
                node,
                attrs,
                content,
            } => {
                let attrs = attrs.map(|f| f(token)).transpose()?.unwrap_or_default();
                self.open_node(node, attrs);
                self.read_content(content(token)?)?;
                self.close_node()
            }
            ReaderKind::Node { node, attrs } => {
                let attrs = attrs.map(|f| f(token)).transpose()?.unwrap_or_default();
                let node = self.schema().create(node, attrs);
                self.add_node(node)
            }
            ReaderKind::Mark {
                mark,
                attrs,
                content,
            } => {
                let attrs = attrs.map(|f| f(token)).transpose()?.unwrap_or_default();
                let mark = self.schema().create_mark(mark, attrs);
                let previous = self.enter_mark(mark);
                self.read_content(content(token)?)?;
                self.leave_mark(previous);
                Ok(())
            }
            ReaderKind::Handler(handler) => handler(self, token),
        }
    }

    fn read_content(&mut self, content: ReadContent<'_>) -> Result<(), ReadError> {
        match content {
            ReadContent::Values(values) => self.read_values(values),
            ReadContent::Text(text) => self.add_text(&text),
            ReadContent::None => Ok(()),
        }
    }

    /// Read `values` into a detached container and return its children.
    ///
    /// Active marks are not inherited.
    pub fn read_isolated(&mut self, values: &[TokenValue]) -> Result<Vec<Node>, ReadError> {
        let saved_marks = std::mem::take(&mut self.marks);
        self.stack.push(Node::new(doc::BODY));
        let result = self.read_values(values);
        let container = self.pop_node();
        self.marks = saved_marks;
        result?;
        Ok(container?.content)
    }

    /// Append a note to the notes container, returning its number.
    pub fn add_note(&mut self, id: String, content: Vec<Node>) -> i64 {
        let number = self.notes.len() as i64 + 1;
        let note = crate::constructs::footnote::note_node(self.schema(), &id, number, content);
        self.notes.push(note);
        number
    }

    fn finish(mut self, meta: Value) -> Result<Node, ReadError> {
        let mut body = self.pop_node()?;
        if !self.stack.is_empty() {
            return Err(ReadError::Unbalanced("document".to_string()));
        }
        let schema = self.registry.schema();
        if body.content.is_empty() {
            body.content
                .push(schema.create(crate::constructs::paragraph::PARAGRAPH, Attrs::new()));
        }
        let notes = schema.create(doc::NOTES, Attrs::new()).with_content(self.notes);
        Ok(schema
            .create(doc::DOC, Attrs::new().with("meta", meta))
            .with_content(vec![body, notes]))
    }
}

/// Build a document tree from an interchange tree.
pub fn read_document(registry: &ConstructRegistry, ast: &PandocAst) -> Result<Node, ReadError> {
    let mut state = ReaderState::new(registry);
    state.open_node(doc::BODY, Attrs::new());
    for token in &ast.blocks {
        state.read_token(token)?;
    }
    let doc = state.finish(Value::Object(ast.meta.clone()))?;
    registry.schema().check(&doc)?;
    tracing::debug!(
        blocks = ast.blocks.len(),
        version = %ast.api_version,
        "read interchange document"
    );
    Ok(doc)
}
