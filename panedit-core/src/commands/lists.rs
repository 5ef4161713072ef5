//! List toggling
//!
//! Toggling a list type never nests a new list inside an existing one. Inside
//! a list of the requested type the whole list is lifted back into plain
//! blocks; inside a list of another type the list is converted in place,
//! keeping its items; elsewhere each selected block becomes one item of a new
//! list.

use super::blocks::split_path;
use super::context::CommandContext;
use crate::constructs::lists::{is_list, ATTR_TIGHT, LIST_ITEM};
use crate::doc::{Attrs, Node, Path};
use crate::edit::{Step, Transaction};

/// Nearest enclosing list.
pub fn list_ancestor<'a>(ctx: &CommandContext<'a>) -> Option<(Path, &'a Node)> {
    ctx.find_ancestor(is_list)
}

pub fn list_active(ctx: &CommandContext<'_>, list_type: &str) -> bool {
    list_ancestor(ctx).is_some_and(|(_, list)| list.is(list_type))
}

pub fn toggle_list(ctx: &CommandContext<'_>, list_type: &str) -> Option<Transaction> {
    ctx.schema.node(list_type)?;
    match list_ancestor(ctx) {
        Some((path, list)) if list.is(list_type) => lift_list(ctx, &path, list),
        Some((path, list)) => convert_list(ctx, &path, list, list_type),
        None => wrap_in_list(ctx, list_type),
    }
}

fn lift_list(ctx: &CommandContext<'_>, path: &[usize], list: &Node) -> Option<Transaction> {
    let (parent, index) = split_path(path)?;
    let blocks: Vec<Node> = list
        .content
        .iter()
        .flat_map(|item| item.content.iter().cloned())
        .collect();
    let mut offsets = Vec::with_capacity(list.content.len());
    let mut total = 0;
    for item in &list.content {
        offsets.push(total);
        total += item.content.len();
    }
    let depth = path.len();
    let selection = ctx.selection().map_paths(|p| {
        if p.len() > depth + 1 && p.starts_with(path) {
            let item = p[depth];
            let mut mapped = parent.to_vec();
            mapped.push(index + offsets.get(item).copied().unwrap_or(0) + p[depth + 1]);
            mapped.extend_from_slice(&p[depth + 2..]);
            mapped
        } else {
            p.to_vec()
        }
    });
    Some(
        Transaction::new()
            .step(Step::Replace {
                parent: parent.to_vec(),
                from: index,
                to: index + 1,
                nodes: blocks,
            })
            .with_selection(selection),
    )
}

fn convert_list(ctx: &CommandContext<'_>, path: &[usize], list: &Node, list_type: &str) -> Option<Transaction> {
    let (parent, index) = split_path(path)?;
    let mut attrs = Attrs::new();
    if let Some(tight) = list.attrs.get(ATTR_TIGHT) {
        attrs.set(ATTR_TIGHT, tight.clone());
    }
    let converted = ctx
        .schema
        .create(list_type, attrs)
        .with_content(list.content.clone());
    if !list.content.iter().all(|item| ctx.schema.allows_child(list_type, item)) {
        return None;
    }
    Some(Transaction::new().step(Step::Replace {
        parent: parent.to_vec(),
        from: index,
        to: index + 1,
        nodes: vec![converted],
    }))
}

fn wrap_in_list(ctx: &CommandContext<'_>, list_type: &str) -> Option<Transaction> {
    let schema = ctx.schema;
    let range = ctx.block_range()?;
    let parent = ctx.doc().node_at(&range.parent)?;
    let items: Vec<Node> = parent
        .content
        .get(range.from..range.to)?
        .iter()
        .map(|block| {
            schema
                .create(LIST_ITEM, Attrs::new())
                .with_content(vec![block.clone()])
        })
        .collect();
    let list = schema
        .create(list_type, Attrs::new().with(ATTR_TIGHT, true))
        .with_content(items);
    if !schema.allows_child(&parent.node_type, &list) {
        return None;
    }
    let depth = range.parent.len();
    let selection = ctx.selection().map_paths(|p| {
        if p.len() > depth && p.starts_with(&range.parent) && (range.from..range.to).contains(&p[depth]) {
            let mut mapped = range.parent.clone();
            mapped.extend([range.from, p[depth] - range.from, 0]);
            mapped.extend_from_slice(&p[depth + 1..]);
            mapped
        } else {
            p.to_vec()
        }
    });
    Some(
        Transaction::new()
            .step(Step::Replace {
                parent: range.parent,
                from: range.from,
                to: range.to,
                nodes: vec![list],
            })
            .with_selection(selection),
    )
}
