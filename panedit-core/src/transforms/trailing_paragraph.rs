//! Trailing empty paragraph
//!
//! The body and every note end with an empty paragraph, so there is always a
//! place to put the cursor after the last block (below a list, a code block,
//! a rule). Only roots whose end the edit could have changed are checked.

use super::{Fix, Repair, RepairContext};
use crate::constructs::paragraph::PARAGRAPH;
use crate::doc::{self, Attrs, Node, Path};
use crate::edit::Step;

pub struct TrailingParagraph;

fn is_empty_paragraph(node: &Node) -> bool {
    node.is(PARAGRAPH) && node.content.is_empty()
}

/// Paths of the body and of every note.
fn editing_roots(doc: &Node) -> Vec<Path> {
    let mut roots = vec![doc::BODY_PATH.to_vec()];
    if let Some(notes) = doc::notes(doc) {
        roots.extend((0..notes.content.len()).map(|i| vec![doc::NOTES_PATH[0], i]));
    }
    roots
}

/// Whether a region may have changed the end of the root at `root`.
fn reaches_end(ctx: &RepairContext<'_>, root: &[usize]) -> bool {
    let Some(last) = ctx.doc.node_at(root).map(|n| n.content.len().saturating_sub(1)) else {
        return false;
    };
    ctx.regions.iter().any(|region| {
        root.starts_with(&region.parent)
            || (region.parent.starts_with(root)
                && region.parent.get(root.len()).map_or(false, |&i| i >= last))
    })
}

impl Repair for TrailingParagraph {
    fn name(&self) -> &str {
        "trailing_paragraph"
    }

    fn is_relevant(&self, ctx: &RepairContext<'_>) -> bool {
        editing_roots(ctx.doc)
            .iter()
            .any(|root| reaches_end(ctx, root))
    }

    fn repair(&self, ctx: &RepairContext<'_>) -> Option<Fix> {
        let steps: Vec<Step> = editing_roots(ctx.doc)
            .into_iter()
            .filter(|root| reaches_end(ctx, root))
            .filter_map(|root| {
                let node = ctx.doc.node_at(&root)?;
                if node.last_child().is_some_and(is_empty_paragraph) {
                    return None;
                }
                let end = node.content.len();
                Some(Step::Replace {
                    parent: root,
                    from: end,
                    to: end,
                    nodes: vec![ctx.schema.create(PARAGRAPH, Attrs::new())],
                })
            })
            .collect();
        (!steps.is_empty()).then(|| Fix {
            steps,
            selection: None,
        })
    }
}
