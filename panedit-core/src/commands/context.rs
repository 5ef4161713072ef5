use crate::doc::{self, inline, ContentExpr, Mark, Node, Path, Schema};
use crate::edit::{EditorState, Selection};

/// Sibling range of blocks inside one block container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRange {
    pub parent: Path,
    pub from: usize,
    pub to: usize,
}

/// The part of a textblock a text selection covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRange {
    pub block: Path,
    pub from: usize,
    pub to: usize,
}

/// Read-only view of the editor a command is evaluated against.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub schema: &'a Schema,
    pub state: &'a EditorState,
}

impl<'a> CommandContext<'a> {
    pub fn new(schema: &'a Schema, state: &'a EditorState) -> Self {
        CommandContext { schema, state }
    }

    pub fn doc(&self) -> &'a Node {
        &self.state.doc
    }

    pub fn selection(&self) -> &'a Selection {
        &self.state.selection
    }

    /// Textblocks covered by the selection, in document order.
    pub fn selected_blocks(&self) -> Vec<Path> {
        self.selection().block_range(self.schema, self.doc())
    }

    /// Per-textblock inline ranges of a text selection.
    pub fn inline_ranges(&self) -> Vec<InlineRange> {
        let Some((from, to)) = self.selection().ordered() else {
            return Vec::new();
        };
        self.selected_blocks()
            .into_iter()
            .filter_map(|block| {
                let len = self.doc().node_at(&block)?.content_len();
                let start = if block == from.block { from.offset } else { 0 };
                let end = if block == to.block { to.offset } else { len };
                Some(InlineRange {
                    block,
                    from: start.min(len),
                    to: end.min(len),
                })
            })
            .collect()
    }

    /// The inline range when the selection lies inside one textblock.
    pub fn single_range(&self) -> Option<InlineRange> {
        let (from, to) = self.selection().ordered()?;
        if from.block != to.block {
            return None;
        }
        let node = self.doc().node_at(&from.block)?;
        if !self.schema.is_textblock(node) || to.offset > node.content_len() {
            return None;
        }
        Some(InlineRange {
            block: from.block.clone(),
            from: from.offset,
            to: to.offset,
        })
    }

    /// Marks typed text would get at the cursor.
    pub fn cursor_marks(&self) -> Vec<Mark> {
        if let Some(stored) = &self.state.stored_marks {
            return stored.clone();
        }
        match self.single_range() {
            Some(range) => match self.doc().node_at(&range.block) {
                Some(block) => inline::marks_for_insertion(self.schema, &block.content, range.from),
                None => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// Nearest node on the selection's start path (self included) matching `pred`.
    pub fn find_ancestor<F>(&self, pred: F) -> Option<(Path, &'a Node)>
    where
        F: Fn(&Node) -> bool,
    {
        self.doc()
            .ancestors(self.selection().start_path())
            .into_iter()
            .rev()
            .find(|(_, node)| pred(node))
    }

    /// Whether the selection sits inside the notes container.
    pub fn in_note(&self) -> bool {
        self.selection().start_path().starts_with(&doc::NOTES_PATH)
    }

    /// The smallest sibling range of blocks containing the selection.
    pub fn block_range(&self) -> Option<BlockRange> {
        let blocks = self.selected_blocks();
        let first = blocks.first()?;
        let last = blocks.last()?;
        let shared = first
            .iter()
            .zip(last.iter())
            .take_while(|(a, b)| a == b)
            .count()
            .min(first.len() - 1)
            .min(last.len() - 1);
        let mut parent: Path = first[..shared].to_vec();
        loop {
            let node = self.doc().node_at(&parent)?;
            let accepts_blocks = self
                .schema
                .node(&node.node_type)
                .is_some_and(|spec| spec.content == ContentExpr::Blocks);
            if accepts_blocks {
                break;
            }
            parent.pop()?;
        }
        let depth = parent.len();
        Some(BlockRange {
            from: *first.get(depth)?,
            to: *last.get(depth)? + 1,
            parent,
        })
    }

    /// The node a node selection points at.
    pub fn selected_node(&self) -> Option<(Path, &'a Node)> {
        match self.selection() {
            Selection::Node { path } => Some((path.clone(), self.doc().node_at(path)?)),
            Selection::Text { .. } => None,
        }
    }
}
