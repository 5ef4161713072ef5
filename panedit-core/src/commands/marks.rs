//! Mark toggling

use super::context::CommandContext;
use super::{edit, Command, CommandKind};
use crate::doc::{inline, Attrs};
use crate::edit::{Step, Transaction};

/// Whether the selection already carries the mark.
pub fn mark_active(ctx: &CommandContext<'_>, mark_type: &str) -> bool {
    if ctx.selection().is_empty() {
        return ctx.cursor_marks().iter().any(|m| m.is(mark_type));
    }
    ctx.inline_ranges().iter().any(|range| {
        ctx.doc()
            .node_at(&range.block)
            .is_some_and(|block| inline::range_has_mark(&block.content, range.from, range.to, mark_type))
    })
}

/// Add or remove a mark over the selection.
///
/// An empty selection toggles the stored marks instead. When any selected
/// text carries the mark it is removed everywhere, otherwise added.
pub fn toggle_mark(ctx: &CommandContext<'_>, mark_type: &str, attrs: Attrs) -> Option<Transaction> {
    let schema = ctx.schema;
    let ranges: Vec<_> = ctx
        .inline_ranges()
        .into_iter()
        .filter(|range| {
            ctx.doc()
                .node_at(&range.block)
                .is_some_and(|block| schema.allows_marks(&block.node_type))
        })
        .collect();
    if ranges.is_empty() || schema.mark(mark_type).is_none() {
        return None;
    }
    let mark = schema.create_mark(mark_type, attrs);

    if ctx.selection().is_empty() {
        let mut marks = ctx.cursor_marks();
        if marks.iter().any(|m| m.is(mark_type)) {
            marks.retain(|m| !m.is(mark_type));
        } else {
            marks = schema.add_mark_to_set(&marks, &mark);
        }
        return Some(Transaction::new().with_stored_marks(marks));
    }

    let remove = mark_active(ctx, mark_type);
    let mut tr = Transaction::new();
    for range in ranges.into_iter().filter(|r| r.from < r.to) {
        tr.steps.push(if remove {
            Step::RemoveMark {
                block: range.block,
                from: range.from,
                to: range.to,
                mark_type: mark_type.to_string(),
            }
        } else {
            Step::AddMark {
                block: range.block,
                from: range.from,
                to: range.to,
                mark: mark.clone(),
            }
        });
    }
    Some(tr)
}

/// A mark toggle command named after its mark.
pub fn mark_command(mark_type: &'static str, keys: &[&str]) -> Command {
    Command::new(mark_type, CommandKind::Mark, move |ctx| {
        edit(toggle_mark(ctx, mark_type, Attrs::new()))
    })
    .with_keys(keys)
    .with_active(move |ctx| mark_active(ctx, mark_type))
}
