//! Footnotes
//!
//! In the interchange format a footnote is a `Note` token carrying its blocks
//! inline. In the document it is split in two: an inline `footnote` anchor in
//! the body that refers by id to a `note` in the notes container. The anchor
//! also caches a JSON snapshot of the note's blocks so a note lost by an edit
//! (cut and paste of the anchor, for instance) can be restored.
//!
//! Keeping anchors and notes consistent is the job of the footnote repair in
//! [`crate::transforms::footnotes`].

use crate::commands::blocks::insert_inline;
use crate::commands::{edit, Command, CommandContext, CommandKind, CommandOutcome};
use crate::construct::Construct;
use crate::constructs::paragraph::PARAGRAPH;
use crate::doc::{self, Attrs, Node, NodeSpec, Schema};
use crate::edit::{Selection, Step};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token};
use crate::reader::{ReaderState, TokenReader};
use crate::writer::WriterState;
use uuid::Uuid;

pub const FOOTNOTE: &str = "footnote";
pub const NOTE: &str = "note";

/// Id of a note; anchors refer to it through [`ATTR_REF`].
pub const ATTR_NOTE_ID: &str = "id";
pub const ATTR_NOTE_NUMBER: &str = "number";

pub const ATTR_REF: &str = "ref";
pub const ATTR_NUMBER: &str = "number";
/// Serialized blocks of the note, as of the last sync.
pub const ATTR_CONTENT: &str = "content";

pub struct Footnote;

pub fn new_note_id() -> String {
    Uuid::new_v4().to_string()
}

/// Build a note node.
pub fn note_node(schema: &Schema, id: &str, number: i64, content: Vec<Node>) -> Node {
    schema
        .create(
            NOTE,
            Attrs::new()
                .with(ATTR_NOTE_ID, id)
                .with(ATTR_NOTE_NUMBER, number),
        )
        .with_content(content)
}

/// Build an anchor node referring to note `id`.
pub fn footnote_node(schema: &Schema, id: &str, number: i64, content: &[Node]) -> Node {
    schema.create(
        FOOTNOTE,
        Attrs::new()
            .with(ATTR_REF, id)
            .with(ATTR_NUMBER, number)
            .with(ATTR_CONTENT, snapshot(content)),
    )
}

/// Serialize note blocks for an anchor's cache.
pub fn snapshot(blocks: &[Node]) -> String {
    serde_json::to_string(blocks).unwrap_or_default()
}

/// Recover note blocks from an anchor's cache.
///
/// Anything that is not a serialized block list is taken as plain text.
pub fn snapshot_blocks(schema: &Schema, snapshot: &str) -> Vec<Node> {
    let mut paragraph = schema.create(PARAGRAPH, Attrs::new());
    match serde_json::from_str::<Vec<Node>>(snapshot) {
        Ok(blocks) if !blocks.is_empty() => return blocks.into_iter().map(strip_footnotes).collect(),
        Ok(_) => {}
        Err(_) if !snapshot.is_empty() => paragraph.content.push(Node::text(snapshot)),
        Err(_) => {}
    }
    vec![paragraph]
}

/// Notes cannot nest, so anchors in a snapshot are dropped.
fn strip_footnotes(mut node: Node) -> Node {
    if node.content.iter().any(|child| child.contains_type(FOOTNOTE)) {
        let content = std::mem::take(&mut node.content)
            .into_iter()
            .filter(|child| !child.is(FOOTNOTE))
            .map(strip_footnotes)
            .collect();
        node.content = doc::inline::normalize(content);
    }
    node
}

fn read_note(state: &mut ReaderState<'_>, token: &Token) -> Result<(), ReadError> {
    let mut blocks = state.read_isolated(token.children())?;
    if blocks.iter().any(|block| block.contains_type(FOOTNOTE)) {
        return Err(ReadError::malformed(&token.t, "a note cannot contain footnotes"));
    }
    if blocks.is_empty() {
        blocks.push(state.schema().create(PARAGRAPH, Attrs::new()));
    }
    let id = new_note_id();
    let mut anchor = footnote_node(state.schema(), &id, 0, &blocks);
    let number = state.add_note(id, blocks);
    anchor.attrs.set(ATTR_NUMBER, number);
    state.add_node(anchor)
}

fn write_footnote(w: &mut WriterState<'_>, node: &Node) -> Result<(), WriteError> {
    let id = node.attrs.get_str(ATTR_REF).unwrap_or_default();
    let fallback = snapshot_blocks(w.schema(), node.attrs.get_str(ATTR_CONTENT).unwrap_or_default());
    w.write_note(id, &fallback)
}

/// Insert an anchor with a fresh empty note and move into the note.
fn insert_footnote(ctx: &CommandContext<'_>) -> Option<CommandOutcome> {
    if ctx.in_note() {
        return None;
    }
    let notes = doc::notes(ctx.doc())?;
    let id = new_note_id();
    let content = vec![ctx.schema.create(PARAGRAPH, Attrs::new())];
    let anchor = footnote_node(ctx.schema, &id, 0, &content);
    let note = note_node(ctx.schema, &id, 0, content);
    let at = notes.content.len();
    let tr = insert_inline(ctx, anchor)?
        .step(Step::Replace {
            parent: doc::NOTES_PATH.to_vec(),
            from: at,
            to: at,
            nodes: vec![note],
        })
        .with_selection(Selection::cursor(vec![doc::NOTES_PATH[0], at, 0], 0));
    edit(Some(tr))
}

impl Construct for Footnote {
    fn name(&self) -> &str {
        FOOTNOTE
    }

    fn description(&self) -> &str {
        "Inline footnote anchors and their notes"
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::inline(FOOTNOTE)
            .atom()
            .attr(ATTR_REF, "")
            .attr(ATTR_NUMBER, 0)
            .attr(ATTR_CONTENT, "")
            .writer(write_footnote)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::handler(tag::NOTE, read_note)]
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(FOOTNOTE, CommandKind::Insert, insert_footnote).with_keys(&["Mod-Alt-f"])]
    }
}
