//! Block-level commands: set type, wrap and lift, insert

use super::context::CommandContext;
use crate::constructs::hard_break::HARD_BREAK;
use crate::constructs::paragraph::PARAGRAPH;
use crate::doc::{Attrs, ContentExpr, Node, Path, PandocAttr};
use crate::doc::attrs::{ATTR_CLASSES, ATTR_ID, ATTR_KEYVALUE};
use crate::edit::{Step, Transaction};

fn attrs_match(node: &Node, attrs: &Attrs) -> bool {
    attrs.iter().all(|(k, v)| node.attrs.get(k) == Some(v))
}

/// Whether every selected textblock already is `node_type` with `attrs`.
pub fn block_type_active(ctx: &CommandContext<'_>, node_type: &str, attrs: &Attrs) -> bool {
    let blocks = ctx.selected_blocks();
    !blocks.is_empty()
        && blocks.iter().all(|path| {
            ctx.doc()
                .node_at(path)
                .is_some_and(|n| n.is(node_type) && attrs_match(n, attrs))
        })
}

/// Inline content converted for a textblock with the given content rule.
fn convert_content(content: &[Node], to: &ContentExpr, allows_breaks: bool) -> Vec<Node> {
    match to {
        ContentExpr::Text => {
            let mut text = String::new();
            for node in content {
                if node.is_text() {
                    text.push_str(node.text_str());
                } else if node.is(HARD_BREAK) {
                    text.push('\n');
                }
            }
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Node::text(text)]
            }
        }
        _ => {
            let mut out = Vec::new();
            for node in content {
                if !node.is_text() || !allows_breaks {
                    out.push(node.clone());
                    continue;
                }
                for (i, line) in node.text_str().split('\n').enumerate() {
                    if i > 0 {
                        out.push(Node::new(HARD_BREAK).with_marks(node.marks.clone()));
                    }
                    if !line.is_empty() {
                        out.push(Node::text(line).with_marks(node.marks.clone()));
                    }
                }
            }
            out
        }
    }
}

/// Turn every selected textblock into `node_type`, or back into paragraphs
/// when they all already are.
pub fn set_block_type(ctx: &CommandContext<'_>, node_type: &str, attrs: Attrs) -> Option<Transaction> {
    let schema = ctx.schema;
    let blocks = ctx.selected_blocks();
    if blocks.is_empty() {
        return None;
    }
    let (target, attrs) = if block_type_active(ctx, node_type, &attrs) {
        if node_type == PARAGRAPH {
            return None;
        }
        (PARAGRAPH, Attrs::new())
    } else {
        (node_type, attrs)
    };
    let spec = schema.node(target).filter(|s| s.is_textblock())?;
    let allows_breaks = spec.content == ContentExpr::Inline && schema.node(HARD_BREAK).is_some();

    let mut tr = Transaction::new();
    for path in blocks {
        let (parent, index) = split_path(&path)?;
        let node = ctx.doc().node_at(&path)?;
        let parent_node = ctx.doc().node_at(parent)?;
        let mut new_attrs = attrs.clone();
        for key in [ATTR_ID, ATTR_CLASSES, ATTR_KEYVALUE] {
            let declared = spec.attrs.iter().any(|(k, _)| k == key);
            if let (true, Some(value)) = (declared, node.attrs.get(key)) {
                if new_attrs.get(key).is_none() {
                    new_attrs.set(key, value.clone());
                }
            }
        }
        let converted = schema
            .create(target, new_attrs)
            .with_content(convert_content(&node.content, &spec.content, allows_breaks));
        if !schema.allows_child(&parent_node.node_type, &converted) {
            return None;
        }
        tr.steps.push(Step::Replace {
            parent: parent.to_vec(),
            from: index,
            to: index + 1,
            nodes: vec![converted],
        });
    }
    Some(tr)
}

pub(crate) fn split_path(path: &[usize]) -> Option<(&[usize], usize)> {
    let (&last, parent) = path.split_last()?;
    Some((parent, last))
}

/// Wrap the selected sibling blocks into a new `node_type` container.
pub fn wrap_in(ctx: &CommandContext<'_>, node_type: &str, attrs: Attrs) -> Option<Transaction> {
    let schema = ctx.schema;
    let range = ctx.block_range()?;
    let parent = ctx.doc().node_at(&range.parent)?;
    let children = parent.content.get(range.from..range.to)?.to_vec();
    let wrapper = schema.create(node_type, attrs).with_content(children);
    if !schema.allows_child(&parent.node_type, &wrapper)
        || !wrapper.content.iter().all(|c| schema.allows_child(node_type, c))
    {
        return None;
    }
    let depth = range.parent.len();
    let selection = ctx.selection().map_paths(|path| {
        if path.len() > depth && path.starts_with(&range.parent) && (range.from..range.to).contains(&path[depth]) {
            let mut mapped = range.parent.clone();
            mapped.push(range.from);
            mapped.push(path[depth] - range.from);
            mapped.extend_from_slice(&path[depth + 1..]);
            mapped
        } else {
            path.to_vec()
        }
    });
    Some(
        Transaction::new()
            .step(Step::Replace {
                parent: range.parent,
                from: range.from,
                to: range.to,
                nodes: vec![wrapper],
            })
            .with_selection(selection),
    )
}

/// Replace the container at `path` with its children.
pub fn lift_out(ctx: &CommandContext<'_>, path: &[usize]) -> Option<Transaction> {
    let schema = ctx.schema;
    let (parent, index) = split_path(path)?;
    let container = ctx.doc().node_at(path)?;
    let parent_node = ctx.doc().node_at(parent)?;
    if !container
        .content
        .iter()
        .all(|c| schema.allows_child(&parent_node.node_type, c))
    {
        return None;
    }
    let depth = path.len();
    let selection = ctx.selection().map_paths(|p| {
        if p.len() > depth && p.starts_with(path) {
            let mut mapped = parent.to_vec();
            mapped.push(index + p[depth]);
            mapped.extend_from_slice(&p[depth + 1..]);
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
                nodes: container.content.clone(),
            })
            .with_selection(selection),
    )
}

/// Lift out of the nearest `node_type` ancestor, or wrap into a new one.
pub fn toggle_wrap(ctx: &CommandContext<'_>, node_type: &str) -> Option<Transaction> {
    match ctx.find_ancestor(|n| n.is(node_type)) {
        Some((path, _)) => lift_out(ctx, &path),
        None => wrap_in(ctx, node_type, Attrs::new()),
    }
}

/// Insert a block after the selected blocks.
pub fn insert_block(ctx: &CommandContext<'_>, node: Node) -> Option<Transaction> {
    let range = ctx.block_range()?;
    let parent = ctx.doc().node_at(&range.parent)?;
    if !ctx.schema.allows_child(&parent.node_type, &node) {
        return None;
    }
    Some(Transaction::new().step(Step::Replace {
        parent: range.parent,
        from: range.to,
        to: range.to,
        nodes: vec![node],
    }))
}

/// Replace the selection inside one textblock with an inline node.
pub fn insert_inline(ctx: &CommandContext<'_>, node: Node) -> Option<Transaction> {
    let range = ctx.single_range()?;
    let block = ctx.doc().node_at(&range.block)?;
    if !ctx.schema.allows_marks(&block.node_type) || !ctx.schema.allows_child(&block.node_type, &node) {
        return None;
    }
    let node = node.with_marks(ctx.cursor_marks());
    Some(Transaction::new().step(Step::ReplaceInline {
        block: range.block,
        from: range.from,
        to: range.to,
        nodes: vec![node],
    }))
}

/// The Pandoc attribute of the nearest node that carries one.
pub fn attr_target(ctx: &CommandContext<'_>) -> Option<(Path, PandocAttr)> {
    let schema = ctx.schema;
    let carries_attr = |node: &Node| {
        schema
            .node(&node.node_type)
            .is_some_and(|s| s.attrs.iter().any(|(k, _)| k == ATTR_CLASSES))
    };
    if let Some((path, node)) = ctx.selected_node().filter(|(_, n)| carries_attr(n)) {
        return Some((path, PandocAttr::from_attrs(&node.attrs)));
    }
    ctx.find_ancestor(carries_attr)
        .map(|(path, node)| (path, PandocAttr::from_attrs(&node.attrs)))
}
