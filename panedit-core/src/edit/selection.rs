//! Selections over the document tree

use crate::doc::{Node, Path, Schema};

/// A character offset inside a textblock.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextPosition {
    pub block: Path,
    pub offset: usize,
}

impl TextPosition {
    pub fn new(block: Path, offset: usize) -> Self {
        TextPosition { block, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A text range; `anchor` stays put while `head` moves.
    Text {
        anchor: TextPosition,
        head: TextPosition,
    },
    /// A single selected node (an image, a footnote anchor, a rule).
    Node { path: Path },
}

impl Selection {
    pub fn cursor(block: Path, offset: usize) -> Self {
        let pos = TextPosition::new(block, offset);
        Selection::Text {
            anchor: pos.clone(),
            head: pos,
        }
    }

    pub fn text(anchor: TextPosition, head: TextPosition) -> Self {
        Selection::Text { anchor, head }
    }

    pub fn range(block: Path, from: usize, to: usize) -> Self {
        Selection::Text {
            anchor: TextPosition::new(block.clone(), from),
            head: TextPosition::new(block, to),
        }
    }

    pub fn node(path: Path) -> Self {
        Selection::Node { path }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Text { anchor, head } => anchor == head,
            Selection::Node { .. } => false,
        }
    }

    /// Start and end of a text selection in document order.
    pub fn ordered(&self) -> Option<(&TextPosition, &TextPosition)> {
        match self {
            Selection::Text { anchor, head } if anchor <= head => Some((anchor, head)),
            Selection::Text { anchor, head } => Some((head, anchor)),
            Selection::Node { .. } => None,
        }
    }

    /// Path of the node the selection starts in.
    pub fn start_path(&self) -> &[usize] {
        match self {
            Selection::Text { anchor, head } => {
                if anchor <= head {
                    &anchor.block
                } else {
                    &head.block
                }
            }
            Selection::Node { path } => path,
        }
    }

    /// Textblocks covered by the selection, in document order.
    pub fn block_range(&self, schema: &Schema, doc: &Node) -> Vec<Path> {
        match self {
            Selection::Text { .. } => {
                let Some((from, to)) = self.ordered() else {
                    return Vec::new();
                };
                doc.descendants()
                    .into_iter()
                    .filter(|(path, node)| {
                        schema.is_textblock(node) && *path >= from.block && *path <= to.block
                    })
                    .map(|(path, _)| path)
                    .collect()
            }
            Selection::Node { path } => {
                let Some(node) = doc.node_at(path) else {
                    return Vec::new();
                };
                if schema.is_textblock(node) {
                    return vec![path.clone()];
                }
                node.descendants()
                    .into_iter()
                    .filter(|(_, n)| schema.is_textblock(n))
                    .map(|(sub, _)| path.iter().copied().chain(sub).collect())
                    .collect()
            }
        }
    }

    /// Rewrite every path in the selection, e.g. after nodes moved.
    pub fn map_paths<F>(&self, f: F) -> Selection
    where
        F: Fn(&[usize]) -> Path,
    {
        match self {
            Selection::Text { anchor, head } => Selection::Text {
                anchor: TextPosition::new(f(&anchor.block), anchor.offset),
                head: TextPosition::new(f(&head.block), head.offset),
            },
            Selection::Node { path } => Selection::Node { path: f(path) },
        }
    }

    /// Whether every position still exists in `doc`.
    pub fn is_valid(&self, schema: &Schema, doc: &Node) -> bool {
        let position_ok = |pos: &TextPosition| {
            doc.node_at(&pos.block)
                .is_some_and(|n| schema.is_textblock(n) && pos.offset <= n.content_len())
        };
        match self {
            Selection::Text { anchor, head } => position_ok(anchor) && position_ok(head),
            Selection::Node { path } => !path.is_empty() && doc.node_at(path).is_some(),
        }
    }

    /// Cursor at the start of the first textblock under `root`.
    pub fn at_start(schema: &Schema, doc: &Node, root: &[usize]) -> Option<Self> {
        let node = doc.node_at(root)?;
        node.descendants()
            .into_iter()
            .find(|(_, n)| schema.is_textblock(n))
            .map(|(sub, _)| Selection::cursor(root.iter().copied().chain(sub).collect(), 0))
    }

    /// This selection if it is still valid, else the start of the body.
    pub fn clamped(self, schema: &Schema, doc: &Node) -> Self {
        if self.is_valid(schema, doc) {
            return self;
        }
        Selection::at_start(schema, doc, &crate::doc::BODY_PATH)
            .unwrap_or_else(|| Selection::cursor(crate::doc::BODY_PATH.to_vec(), 0))
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::cursor(vec![0, 0], 0)
    }
}
