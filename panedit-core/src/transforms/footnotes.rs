//! Footnote anchors and notes
//!
//! Anchors are numbered 1..N in document order and each one owns exactly one
//! note. Edits break that in a few ways the repair undoes:
//!
//! - moving or deleting anchors leaves numbers out of order;
//! - pasting an anchor twice makes two anchors share one note id, so every
//!   repeat gets a fresh id and a copy of the note;
//! - pasting an anchor from elsewhere leaves it without a note, so one is
//!   rebuilt from the anchor's cached snapshot;
//! - editing a note makes the anchor's snapshot stale.
//!
//! Notes whose anchor is gone stay where they are.

use super::{EditFilter, Fix, Repair, RepairContext};
use crate::constructs::footnote::{
    new_note_id, note_node, snapshot, snapshot_blocks, ATTR_CONTENT, ATTR_NOTE_ID,
    ATTR_NOTE_NUMBER, ATTR_NUMBER, ATTR_REF, FOOTNOTE, NOTE,
};
use crate::doc::{self, Node, Path, NOTES};
use crate::edit::{Selection, Step};
use std::collections::{HashMap, HashSet};

/// Rejects any edit that leaves a footnote anchor inside a note.
pub struct NoFootnoteInNote;

impl EditFilter for NoFootnoteInNote {
    fn name(&self) -> &str {
        "no_footnote_in_note"
    }

    fn accepts(&self, ctx: &RepairContext<'_>) -> bool {
        if !ctx.touches(FOOTNOTE) {
            return true;
        }
        !doc::notes(ctx.doc).is_some_and(|notes| notes.contains_type(FOOTNOTE))
    }
}

pub struct FootnoteRepair;

fn notes_by_id(doc: &Node) -> HashMap<&str, (usize, &Node)> {
    doc::notes(doc)
        .map(|notes| {
            notes
                .content
                .iter()
                .enumerate()
                .filter_map(|(i, note)| note.attrs.get_str(ATTR_NOTE_ID).map(|id| (id, (i, note))))
                .collect()
        })
        .unwrap_or_default()
}

fn anchors(doc: &Node) -> Vec<(Path, &Node)> {
    doc::body(doc)
        .map(|body| {
            body.find_all(FOOTNOTE)
                .into_iter()
                .map(|(path, node)| (doc::BODY_PATH.iter().copied().chain(path).collect(), node))
                .collect()
        })
        .unwrap_or_default()
}

fn selected_anchor<'a>(ctx: &RepairContext<'a>) -> Option<&'a Node> {
    match ctx.selection {
        Selection::Node { path } => ctx.doc.node_at(path).filter(|n| n.is(FOOTNOTE)),
        Selection::Text { .. } => None,
    }
}

impl Repair for FootnoteRepair {
    fn name(&self) -> &str {
        "footnotes"
    }

    fn is_relevant(&self, ctx: &RepairContext<'_>) -> bool {
        ctx.touches(FOOTNOTE) || ctx.touches(NOTE) || ctx.touches(NOTES) || selected_anchor(ctx).is_some()
    }

    fn repair(&self, ctx: &RepairContext<'_>) -> Option<Fix> {
        let notes = notes_by_id(ctx.doc);
        let old_notes = notes_by_id(ctx.old_doc);
        let note_count = doc::notes(ctx.doc)?.content.len();

        let mut steps = Vec::new();
        let mut added: Vec<Node> = Vec::new();
        let mut consumed: HashSet<String> = HashSet::new();
        // Final note index per anchor path, for moving the selection.
        let mut note_of: HashMap<Path, usize> = HashMap::new();

        for (rank, (path, anchor)) in anchors(ctx.doc).into_iter().enumerate() {
            let number = rank as i64 + 1;
            let reference = anchor.attrs.get_str(ATTR_REF).unwrap_or_default().to_string();
            let cached = anchor.attrs.get_str(ATTR_CONTENT).unwrap_or_default();
            let mut attrs = anchor.attrs.clone();
            attrs.set(ATTR_NUMBER, number);

            let resolved = notes.get(reference.as_str());
            if consumed.contains(&reference) || reference.is_empty() {
                let id = new_note_id();
                let content = match resolved {
                    Some((_, note)) => note.content.clone(),
                    None => snapshot_blocks(ctx.schema, cached),
                };
                attrs.set(ATTR_REF, id.clone());
                attrs.set(ATTR_CONTENT, snapshot(&content));
                note_of.insert(path.clone(), note_count + added.len());
                added.push(note_node(ctx.schema, &id, number, content));
                consumed.insert(id);
            } else if let Some(&(index, note)) = resolved {
                let changed = old_notes
                    .get(reference.as_str())
                    .map_or(true, |(_, old)| old.content != note.content);
                if changed {
                    attrs.set(ATTR_CONTENT, snapshot(&note.content));
                }
                if note.attrs.get_i64(ATTR_NOTE_NUMBER) != Some(number) {
                    let mut note_attrs = note.attrs.clone();
                    note_attrs.set(ATTR_NOTE_NUMBER, number);
                    steps.push(Step::SetAttrs {
                        path: vec![doc::NOTES_PATH[0], index],
                        attrs: note_attrs,
                    });
                }
                note_of.insert(path.clone(), index);
                consumed.insert(reference);
            } else {
                let content = snapshot_blocks(ctx.schema, cached);
                note_of.insert(path.clone(), note_count + added.len());
                added.push(note_node(ctx.schema, &reference, number, content));
                consumed.insert(reference);
            }

            if attrs != anchor.attrs {
                steps.push(Step::SetAttrs { path, attrs });
            }
        }

        if !added.is_empty() {
            tracing::debug!(notes = added.len(), "restoring footnote notes");
            steps.push(Step::Replace {
                parent: doc::NOTES_PATH.to_vec(),
                from: note_count,
                to: note_count,
                nodes: added,
            });
        }

        let selection = match ctx.selection {
            Selection::Node { path } if selected_anchor(ctx).is_some() => note_of
                .get(path)
                .map(|&index| Selection::cursor(vec![doc::NOTES_PATH[0], index, 0], 0)),
            _ => None,
        };

        let fix = Fix { steps, selection };
        (!fix.is_empty()).then_some(fix)
    }
}
