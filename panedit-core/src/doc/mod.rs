//! Editable document tree
//!
//! The document is a tree of typed nodes with attribute bags; inline content
//! carries marks. The fixed outer shape is
//!
//! ```text
//! doc
//! ├─ body     (one or more blocks, editing root)
//! └─ notes    (zero or more note, each an editing root)
//! ```
//!
//! Footnote anchors live inline in the body and refer to notes by id.

pub mod attrs;
pub mod inline;
pub mod node;
pub mod schema;

pub use attrs::{Attrs, PandocAttr, ATTR_CLASSES, ATTR_ID, ATTR_KEYVALUE};
pub use node::{Mark, Node, Path};
pub use schema::{
    ContentExpr, Excludes, MarkSpec, MarkWriteFn, MarkWriter, NodeGroup, NodeSpec, NodeWriteFn,
    Schema,
};

pub const DOC: &str = "doc";
pub const BODY: &str = "body";
pub const NOTES: &str = "notes";

/// Position of the body within the document root.
pub const BODY_PATH: [usize; 1] = [0];
/// Position of the notes container within the document root.
pub const NOTES_PATH: [usize; 1] = [1];

pub fn body(doc: &Node) -> Option<&Node> {
    doc.node_at(&BODY_PATH)
}

pub fn notes(doc: &Node) -> Option<&Node> {
    doc.node_at(&NOTES_PATH)
}
