//! Node and mark specifications and the merged document schema
//!
//! Every construct describes its node and mark types with a [`NodeSpec`] or
//! [`MarkSpec`]. The registry merges them into one [`Schema`], which then
//! answers the structural questions the reader, the edit model, and the
//! commands ask: which children a node accepts, which marks exclude each
//! other, what a freshly created node's attributes look like.
//!
//! Content rules are a small closed grammar ([`ContentExpr`]) rather than a
//! parsed expression language; it covers every shape the constructs need.

use super::attrs::Attrs;
use super::node::{Mark, Node, Path};
use crate::error::{SchemaError, SchemaViolation, WriteError};
use crate::writer::{MarkContent, WriterState};
use serde_json::Value;
use std::collections::HashMap;

/// Writes one node into the token builder.
pub type NodeWriteFn = fn(&mut WriterState<'_>, &Node) -> Result<(), WriteError>;

/// Writes one closed mark around the tokens collected for its run.
pub type MarkWriteFn = fn(&mut WriterState<'_>, &Mark, MarkContent) -> Result<(), WriteError>;

#[derive(Debug, Clone, Copy)]
pub struct MarkWriter {
    /// Nesting priority; lower values are written outermost.
    pub priority: i32,
    pub write: MarkWriteFn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGroup {
    Block,
    Inline,
    /// Containers that only appear in fixed positions (doc, body, list items, notes).
    Structural,
}

/// Allowed children of a node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentExpr {
    /// Leaf node.
    Empty,
    /// Unmarked text only.
    Text,
    /// Zero or more inline nodes.
    Inline,
    /// One or more block nodes.
    Blocks,
    OneOrMore(String),
    ZeroOrMore(String),
    /// Exactly these types, in this order.
    Sequence(Vec<String>),
}

impl ContentExpr {
    fn referenced_types(&self) -> Vec<&str> {
        match self {
            ContentExpr::OneOrMore(t) | ContentExpr::ZeroOrMore(t) => vec![t.as_str()],
            ContentExpr::Sequence(types) => types.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    pub group: NodeGroup,
    pub content: ContentExpr,
    /// No editable interior.
    pub atom: bool,
    /// A root the user edits inside of (the document body, a note body).
    pub editing_root: bool,
    pub attrs: Vec<(String, Value)>,
    pub writer: Option<NodeWriteFn>,
}

impl NodeSpec {
    pub fn block(name: &str, content: ContentExpr) -> Self {
        Self::with_group(name, NodeGroup::Block, content)
    }

    pub fn inline(name: &str) -> Self {
        Self::with_group(name, NodeGroup::Inline, ContentExpr::Empty)
    }

    pub fn structural(name: &str, content: ContentExpr) -> Self {
        Self::with_group(name, NodeGroup::Structural, content)
    }

    fn with_group(name: &str, group: NodeGroup, content: ContentExpr) -> Self {
        NodeSpec {
            name: name.to_string(),
            group,
            content,
            atom: false,
            editing_root: false,
            attrs: Vec::new(),
            writer: None,
        }
    }

    pub fn atom(mut self) -> Self {
        self.atom = true;
        self
    }

    pub fn editing_root(mut self) -> Self {
        self.editing_root = true;
        self
    }

    pub fn attr(mut self, key: &str, default: impl Into<Value>) -> Self {
        self.attrs.push((key.to_string(), default.into()));
        self
    }

    pub fn attrs(mut self, defaults: Vec<(String, Value)>) -> Self {
        self.attrs.extend(defaults);
        self
    }

    pub fn writer(mut self, writer: NodeWriteFn) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Holds inline content or text directly.
    pub fn is_textblock(&self) -> bool {
        matches!(self.content, ContentExpr::Inline | ContentExpr::Text)
    }
}

/// Which marks a mark type cannot coexist with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Excludes {
    SameType,
    All,
    /// These types, plus its own type.
    Types(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct MarkSpec {
    pub name: String,
    /// Text typed at the mark's end boundary inherits it.
    pub inclusive: bool,
    pub excludes: Excludes,
    /// Only text nodes may carry the mark; inline atoms never do.
    pub text_only: bool,
    pub attrs: Vec<(String, Value)>,
    pub writer: Option<MarkWriter>,
}

impl MarkSpec {
    pub fn new(name: &str) -> Self {
        MarkSpec {
            name: name.to_string(),
            inclusive: true,
            excludes: Excludes::SameType,
            text_only: false,
            attrs: Vec::new(),
            writer: None,
        }
    }

    pub fn non_inclusive(mut self) -> Self {
        self.inclusive = false;
        self
    }

    pub fn text_only(mut self) -> Self {
        self.text_only = true;
        self
    }

    pub fn excludes(mut self, excludes: Excludes) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn attrs(mut self, defaults: Vec<(String, Value)>) -> Self {
        self.attrs.extend(defaults);
        self
    }

    pub fn writer(mut self, priority: i32, write: MarkWriteFn) -> Self {
        self.writer = Some(MarkWriter { priority, write });
        self
    }

    fn excludes_type(&self, other: &str) -> bool {
        match &self.excludes {
            Excludes::SameType => self.name == other,
            Excludes::All => true,
            Excludes::Types(types) => self.name == other || types.iter().any(|t| t == other),
        }
    }
}

/// Merged node and mark specifications.
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<NodeSpec>,
    node_index: HashMap<String, usize>,
    marks: Vec<MarkSpec>,
    mark_index: HashMap<String, usize>,
}

impl Schema {
    /// Merge specs, failing on duplicate names or dangling content references.
    pub fn new(nodes: Vec<NodeSpec>, marks: Vec<MarkSpec>) -> Result<Self, SchemaError> {
        let mut node_index = HashMap::new();
        for (i, spec) in nodes.iter().enumerate() {
            if node_index.insert(spec.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateNode(spec.name.clone()));
            }
        }
        let mut mark_index = HashMap::new();
        for (i, spec) in marks.iter().enumerate() {
            if mark_index.insert(spec.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateMark(spec.name.clone()));
            }
        }
        for spec in &nodes {
            for child in spec.content.referenced_types() {
                if !node_index.contains_key(child) {
                    return Err(SchemaError::UnknownContentType {
                        node: spec.name.clone(),
                        child: child.to_string(),
                    });
                }
            }
        }
        Ok(Schema {
            nodes,
            node_index,
            marks,
            mark_index,
        })
    }

    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.node_index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn mark(&self, name: &str) -> Option<&MarkSpec> {
        self.mark_index.get(name).map(|&i| &self.marks[i])
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn marks(&self) -> &[MarkSpec] {
        &self.marks
    }

    /// Registration rank, used to keep mark sets in a canonical order.
    pub fn mark_rank(&self, name: &str) -> usize {
        self.mark_index.get(name).copied().unwrap_or(usize::MAX)
    }

    pub fn is_textblock(&self, node: &Node) -> bool {
        self.node(&node.node_type).is_some_and(NodeSpec::is_textblock)
    }

    pub fn is_editing_root(&self, node: &Node) -> bool {
        self.node(&node.node_type).is_some_and(|s| s.editing_root)
    }

    pub fn is_block(&self, node: &Node) -> bool {
        self.group_of(node) == Some(NodeGroup::Block)
    }

    fn group_of(&self, node: &Node) -> Option<NodeGroup> {
        self.node(&node.node_type).map(|s| s.group)
    }

    /// Whether textblocks of this type accept marked inline content.
    /// Whether `node` may carry a mark of `mark_type`.
    pub fn mark_allowed_on(&self, mark_type: &str, node: &Node) -> bool {
        self.mark(mark_type)
            .is_some_and(|spec| node.is_text() || !spec.text_only)
    }

    pub fn allows_marks(&self, node_type: &str) -> bool {
        self.node(node_type)
            .is_some_and(|s| s.content == ContentExpr::Inline)
    }

    /// Whether `parent_type` may hold `child`, ignoring cardinality.
    pub fn allows_child(&self, parent_type: &str, child: &Node) -> bool {
        let Some(spec) = self.node(parent_type) else {
            return false;
        };
        match &spec.content {
            ContentExpr::Empty => false,
            ContentExpr::Text => child.is_text() && child.marks.is_empty(),
            ContentExpr::Inline => self.group_of(child) == Some(NodeGroup::Inline),
            ContentExpr::Blocks => self.group_of(child) == Some(NodeGroup::Block),
            ContentExpr::OneOrMore(t) | ContentExpr::ZeroOrMore(t) => child.is(t),
            ContentExpr::Sequence(types) => types.iter().any(|t| child.is(t)),
        }
    }

    /// A node of `node_type` with default attributes overlaid by `attrs`.
    pub fn create(&self, node_type: &str, attrs: Attrs) -> Node {
        let attrs = match self.node(node_type) {
            Some(spec) => attrs.with_defaults(&spec.attrs),
            None => attrs,
        };
        Node::new(node_type).with_attrs(attrs)
    }

    pub fn create_mark(&self, mark_type: &str, attrs: Attrs) -> Mark {
        let attrs = match self.mark(mark_type) {
            Some(spec) => attrs.with_defaults(&spec.attrs),
            None => attrs,
        };
        Mark::with_attrs(mark_type, attrs)
    }

    pub fn excludes(&self, mark: &str, other: &str) -> bool {
        match self.mark(mark) {
            Some(spec) => spec.excludes_type(other),
            None => mark == other,
        }
    }

    /// Add `mark` to a mark set, honouring exclusions and keeping rank order.
    ///
    /// A mark that is excluded by one already present is not added; marks the
    /// new one excludes are dropped.
    pub fn add_mark_to_set(&self, set: &[Mark], mark: &Mark) -> Vec<Mark> {
        if set.contains(mark) {
            return set.to_vec();
        }
        let mut out = Vec::with_capacity(set.len() + 1);
        for existing in set {
            if existing.mark_type != mark.mark_type
                && self.excludes(&existing.mark_type, &mark.mark_type)
            {
                return set.to_vec();
            }
            if !self.excludes(&mark.mark_type, &existing.mark_type) {
                out.push(existing.clone());
            }
        }
        let rank = self.mark_rank(&mark.mark_type);
        let at = out
            .iter()
            .position(|m| self.mark_rank(&m.mark_type) > rank)
            .unwrap_or(out.len());
        out.insert(at, mark.clone());
        out
    }

    /// Validate a whole subtree, including cardinality.
    pub fn check(&self, node: &Node) -> Result<(), SchemaViolation> {
        let mut path = Vec::new();
        self.check_at(node, &mut path)
    }

    fn check_at(&self, node: &Node, path: &mut Path) -> Result<(), SchemaViolation> {
        let violation = |reason: String, path: &Path| SchemaViolation {
            node: node.node_type.clone(),
            path: path.clone(),
            reason,
        };

        let spec = self
            .node(&node.node_type)
            .ok_or_else(|| violation("unknown node type".to_string(), path))?;

        for mark in &node.marks {
            if self.mark(&mark.mark_type).is_none() {
                return Err(violation(format!("unknown mark '{}'", mark.mark_type), path));
            }
            if !self.mark_allowed_on(&mark.mark_type, node) {
                return Err(violation(format!("mark '{}' only applies to text", mark.mark_type), path));
            }
        }

        if node.is_text() {
            if node.text_str().is_empty() {
                return Err(violation("empty text node".to_string(), path));
            }
            return Ok(());
        }

        let len = node.content.len();
        match &spec.content {
            ContentExpr::Empty if len > 0 => {
                return Err(violation("leaf node has children".to_string(), path));
            }
            ContentExpr::Blocks | ContentExpr::OneOrMore(_) if len == 0 => {
                return Err(violation("requires at least one child".to_string(), path));
            }
            ContentExpr::Sequence(types) if types.len() != len => {
                return Err(violation(format!("expected {} children", types.len()), path));
            }
            _ => {}
        }

        for (i, child) in node.content.iter().enumerate() {
            let allowed = match &spec.content {
                ContentExpr::Sequence(types) => child.is(&types[i]),
                _ => self.allows_child(&node.node_type, child),
            };
            if !allowed {
                return Err(violation(
                    format!("child '{}' at index {i} is not allowed", child.node_type),
                    path,
                ));
            }
            if !child.marks.is_empty() && spec.content != ContentExpr::Inline {
                return Err(violation(format!("marks not allowed at index {i}"), path));
            }
            path.push(i);
            self.check_at(child, path)?;
            path.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(
            vec![
                NodeSpec::structural("doc", ContentExpr::Blocks),
                NodeSpec::block("paragraph", ContentExpr::Inline),
                NodeSpec::block("code_block", ContentExpr::Text),
                NodeSpec::with_group("text", NodeGroup::Inline, ContentExpr::Empty),
                NodeSpec::with_group("hard_break", NodeGroup::Inline, ContentExpr::Empty),
                NodeSpec::block("list", ContentExpr::OneOrMore("item".into())),
                NodeSpec::structural("item", ContentExpr::Blocks),
            ],
            vec![
                MarkSpec::new("strong"),
                MarkSpec::new("superscript").excludes(Excludes::Types(vec!["subscript".into()])),
                MarkSpec::new("subscript").excludes(Excludes::Types(vec!["superscript".into()])),
                MarkSpec::new("link").non_inclusive(),
                MarkSpec::new("code").text_only(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let err = Schema::new(
            vec![
                NodeSpec::block("paragraph", ContentExpr::Inline),
                NodeSpec::block("paragraph", ContentExpr::Inline),
            ],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateNode("paragraph".into()));
    }

    #[test]
    fn test_duplicate_mark_is_rejected() {
        let err = Schema::new(vec![], vec![MarkSpec::new("emph"), MarkSpec::new("emph")]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateMark("emph".into()));
    }

    #[test]
    fn test_unknown_content_reference_is_rejected() {
        let err = Schema::new(
            vec![NodeSpec::block("list", ContentExpr::OneOrMore("item".into()))],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownContentType { .. }));
    }

    #[test]
    fn test_add_mark_keeps_rank_order() {
        let schema = schema();
        let set = schema.add_mark_to_set(&[Mark::new("link")], &Mark::new("strong"));
        let names: Vec<_> = set.iter().map(|m| m.mark_type.as_str()).collect();
        assert_eq!(names, vec!["strong", "link"]);
    }

    #[test]
    fn test_exclusive_marks_replace_each_other() {
        let schema = schema();
        let set = schema.add_mark_to_set(&[Mark::new("superscript")], &Mark::new("subscript"));
        assert_eq!(set, vec![Mark::new("superscript")]);
    }

    #[test]
    fn test_same_type_with_new_attrs_replaces() {
        let schema = schema();
        let old = Mark::with_attrs("link", Attrs::new().with("href", "a"));
        let new = Mark::with_attrs("link", Attrs::new().with("href", "b"));
        assert_eq!(schema.add_mark_to_set(&[old], &new), vec![new]);
    }

    #[test]
    fn test_check_reports_cardinality_and_membership() {
        let schema = schema();
        let empty_list = Node::new("doc").with_content(vec![Node::new("list")]);
        assert!(schema.check(&empty_list).is_err());

        let marked_code = Node::new("doc").with_content(vec![Node::new("code_block")
            .with_content(vec![Node::text("x").with_marks(vec![Mark::new("strong")])])]);
        assert!(schema.check(&marked_code).is_err());

        let ok = Node::new("doc").with_content(vec![Node::new("paragraph")
            .with_content(vec![Node::text("x").with_marks(vec![Mark::new("strong")])])]);
        assert!(schema.check(&ok).is_ok());
    }

    #[test]
    fn test_text_only_mark_rejected_on_atoms() {
        let schema = schema();
        let code = || vec![Mark::new("code")];
        let on_text = Node::new("doc").with_content(vec![Node::new("paragraph")
            .with_content(vec![Node::text("x").with_marks(code())])]);
        assert!(schema.check(&on_text).is_ok());

        let on_break = Node::new("doc").with_content(vec![Node::new("paragraph")
            .with_content(vec![Node::new("hard_break").with_marks(code())])]);
        let violation = schema.check(&on_break).unwrap_err();
        assert_eq!(violation.node, "hard_break");
        assert_eq!(violation.path, vec![0, 0]);
        assert!(!schema.mark_allowed_on("code", &Node::new("hard_break")));
        assert!(schema.mark_allowed_on("strong", &Node::new("hard_break")));
    }

    #[test]
    fn test_unknown_mark_on_text_is_reported() {
        let schema = schema();
        let doc = Node::new("doc").with_content(vec![Node::new("paragraph")
            .with_content(vec![Node::text("x").with_marks(vec![Mark::new("blink")])])]);
        assert!(schema.check(&doc).is_err());
    }
}
