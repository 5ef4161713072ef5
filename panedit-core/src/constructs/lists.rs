//! Bullet and ordered lists
//!
//! Pandoc marks a tight list by holding each item's inlines in `Plain` instead
//! of `Para`. The reader records that as the list's `tight` attribute and the
//! writer turns item paragraphs back into `Plain` for tight lists.

use super::paragraph::PARAGRAPH;
use crate::commands::dialogs::OrderedListProps;
use crate::commands::lists::{list_active, list_ancestor, toggle_list};
use crate::commands::{edit, Command, CommandKind, CommandOutcome, DialogProps, DialogRequest, DialogTarget};
use crate::construct::Construct;
use crate::doc::{Attrs, ContentExpr, Node, NodeSpec};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token, TokenValue};
use crate::reader::{array_child, ReaderState, TokenReader};
use crate::writer::WriterState;

pub const BULLET_LIST: &str = "bullet_list";
pub const ORDERED_LIST: &str = "ordered_list";
pub const LIST_ITEM: &str = "list_item";

pub const ATTR_TIGHT: &str = "tight";
pub const ATTR_ORDER: &str = "order";
pub const ATTR_NUMBER_STYLE: &str = "number_style";
pub const ATTR_NUMBER_DELIM: &str = "number_delim";

/// Number style whose lists share one counter across the document.
pub const EXAMPLE_STYLE: &str = "Example";
pub const DEFAULT_STYLE: &str = "DefaultStyle";
pub const DEFAULT_DELIM: &str = "DefaultDelim";

pub fn is_list(node: &Node) -> bool {
    node.is(BULLET_LIST) || node.is(ORDERED_LIST)
}

pub fn is_example_list(node: &Node) -> bool {
    node.is(ORDERED_LIST) && node.attrs.get_str(ATTR_NUMBER_STYLE) == Some(EXAMPLE_STYLE)
}

pub struct Lists;

fn is_tight(items: &[TokenValue]) -> bool {
    items.iter().any(|item| {
        item.as_array()
            .and_then(|blocks| blocks.first())
            .and_then(TokenValue::as_token)
            .is_some_and(|block| block.t == tag::PLAIN)
    })
}

fn read_items(state: &mut ReaderState<'_>, token: &Token, items: &[TokenValue]) -> Result<(), ReadError> {
    for item in items {
        let blocks = item
            .as_array()
            .ok_or_else(|| ReadError::malformed(&token.t, "list item must be an array of blocks"))?;
        state.open_node(LIST_ITEM, Attrs::new());
        if blocks.is_empty() {
            state.open_node(PARAGRAPH, Attrs::new());
            state.close_node()?;
        } else {
            state.read_values(blocks)?;
        }
        state.close_node()?;
    }
    Ok(())
}

fn read_bullet_list(state: &mut ReaderState<'_>, token: &Token) -> Result<(), ReadError> {
    let items = token.children();
    state.open_node(BULLET_LIST, Attrs::new().with(ATTR_TIGHT, is_tight(items)));
    read_items(state, token, items)?;
    state.close_node()
}

fn read_ordered_list(state: &mut ReaderState<'_>, token: &Token) -> Result<(), ReadError> {
    let list_attrs = array_child(token, 0)?;
    let items = array_child(token, 1)?;
    let (order, style, delim) = match list_attrs {
        [TokenValue::Int(order), TokenValue::Token(style), TokenValue::Token(delim)] => {
            (*order, style.t.clone(), delim.t.clone())
        }
        _ => return Err(ReadError::malformed(&token.t, "list attributes must be [start, style, delim]")),
    };
    let attrs = Attrs::new()
        .with(ATTR_ORDER, order)
        .with(ATTR_NUMBER_STYLE, style)
        .with(ATTR_NUMBER_DELIM, delim)
        .with(ATTR_TIGHT, is_tight(items));
    state.open_node(ORDERED_LIST, attrs);
    read_items(state, token, items)?;
    state.close_node()
}

fn write_items(w: &mut WriterState<'_>, list: &Node) -> Result<(), WriteError> {
    let tight = list.attrs.get_bool(ATTR_TIGHT).unwrap_or(false);
    for item in &list.content {
        w.write_array(|w| {
            for block in &item.content {
                if tight && block.is(PARAGRAPH) {
                    w.write_token(tag::PLAIN, |w| w.write_inlines(&block.content))?;
                } else {
                    w.write_node(block)?;
                }
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn write_bullet_list(w: &mut WriterState<'_>, node: &Node) -> Result<(), WriteError> {
    w.write_token(tag::BULLET_LIST, |w| write_items(w, node))
}

fn write_ordered_list(w: &mut WriterState<'_>, node: &Node) -> Result<(), WriteError> {
    let order = node.attrs.get_i64(ATTR_ORDER).unwrap_or(1);
    let style = node.attrs.get_str(ATTR_NUMBER_STYLE).unwrap_or(DEFAULT_STYLE);
    let delim = node.attrs.get_str(ATTR_NUMBER_DELIM).unwrap_or(DEFAULT_DELIM);
    w.write_token(tag::ORDERED_LIST, |w| {
        w.write_values(vec![TokenValue::Array(vec![
            TokenValue::Int(order),
            Token::new(style).into(),
            Token::new(delim).into(),
        ])])?;
        w.write_array(|w| write_items(w, node))
    })
}

fn ordered_list_request(ctx: &crate::commands::CommandContext<'_>) -> Option<CommandOutcome> {
    let (path, list) = list_ancestor(ctx).filter(|(_, list)| list.is(ORDERED_LIST))?;
    let props = OrderedListProps {
        order: list.attrs.get_i64(ATTR_ORDER).unwrap_or(1),
        number_style: list.attrs.get_str(ATTR_NUMBER_STYLE).unwrap_or(DEFAULT_STYLE).to_string(),
        number_delim: list.attrs.get_str(ATTR_NUMBER_DELIM).unwrap_or(DEFAULT_DELIM).to_string(),
    };
    Some(CommandOutcome::Dialog(DialogRequest {
        command: "ordered_list_attrs".to_string(),
        props: DialogProps::OrderedList(props),
        target: DialogTarget::Node {
            path,
            node_type: ORDERED_LIST.to_string(),
        },
    }))
}

impl Construct for Lists {
    fn name(&self) -> &str {
        "lists"
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![
            NodeSpec::block(BULLET_LIST, ContentExpr::OneOrMore(LIST_ITEM.into()))
                .attr(ATTR_TIGHT, false)
                .writer(write_bullet_list),
            NodeSpec::block(ORDERED_LIST, ContentExpr::OneOrMore(LIST_ITEM.into()))
                .attr(ATTR_ORDER, 1)
                .attr(ATTR_NUMBER_STYLE, DEFAULT_STYLE)
                .attr(ATTR_NUMBER_DELIM, DEFAULT_DELIM)
                .attr(ATTR_TIGHT, false)
                .writer(write_ordered_list),
            NodeSpec::structural(LIST_ITEM, ContentExpr::Blocks),
        ]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![
            TokenReader::handler(tag::BULLET_LIST, read_bullet_list),
            TokenReader::handler(tag::ORDERED_LIST, read_ordered_list),
        ]
    }

    fn commands(&self) -> Vec<Command> {
        vec![
            Command::new(BULLET_LIST, CommandKind::List, |ctx| {
                edit(toggle_list(ctx, BULLET_LIST))
            })
            .with_keys(&["Shift-Mod-8"])
            .with_active(|ctx| list_active(ctx, BULLET_LIST)),
            Command::new(ORDERED_LIST, CommandKind::List, |ctx| {
                edit(toggle_list(ctx, ORDERED_LIST))
            })
            .with_keys(&["Shift-Mod-9"])
            .with_active(|ctx| list_active(ctx, ORDERED_LIST)),
            Command::new("ordered_list_attrs", CommandKind::Dialog, ordered_list_request),
        ]
    }
}
