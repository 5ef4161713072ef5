//! Edit model
//!
//! The visual engine that owns the cursor and turns key presses into edits is
//! an external collaborator. This module is the minimal vocabulary the core
//! shares with it: positional [`Selection`]s, primitive [`Step`]s grouped into
//! [`Transaction`]s, and the [`ChangeRegion`]s a transaction leaves behind for
//! the maintenance pipeline.

pub mod selection;
pub mod step;
pub mod transaction;

pub use selection::{Selection, TextPosition};
pub use step::{ChangeRegion, Step};
pub use transaction::{Origin, Transaction};

use crate::doc::{Mark, Node};

/// Everything the session tracks about the document being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub doc: Node,
    pub selection: Selection,
    /// Marks typed text will receive, overriding inheritance.
    pub stored_marks: Option<Vec<Mark>>,
}

impl EditorState {
    pub fn new(doc: Node, selection: Selection) -> Self {
        EditorState {
            doc,
            selection,
            stored_marks: None,
        }
    }
}
