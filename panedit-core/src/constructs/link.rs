//! Links
//!
//! A non-inclusive mark: typing at the end of a link does not extend it. The
//! link command opens a dialog prefilled from the link under the cursor (or
//! inside the selection) and applies the result to that extent.

use crate::commands::dialogs::LinkProps;
use crate::commands::marks::mark_active;
use crate::commands::{Command, CommandContext, CommandKind, CommandOutcome, DialogProps, DialogRequest, DialogTarget};
use crate::construct::Construct;
use crate::doc::{inline, Attrs, Mark, MarkSpec, Node, PandocAttr};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token, TokenValue};
use crate::reader::{array_child, ReadContent, TokenReader};
use crate::writer::{MarkContent, WriterState};

pub const LINK: &str = "link";
pub const ATTR_HREF: &str = "href";
pub const ATTR_TITLE: &str = "title";

pub struct Link;

/// Decode a `[url, title]` target pair.
pub(crate) fn target(token: &Token, index: usize) -> Result<(String, String), ReadError> {
    match array_child(token, index)? {
        [TokenValue::Str(url), TokenValue::Str(title)] => Ok((url.clone(), title.clone())),
        _ => Err(ReadError::malformed(&token.t, "target must be [url, title]")),
    }
}

fn link_attrs(token: &Token) -> Result<Attrs, ReadError> {
    let attr = token
        .child(0)
        .ok_or_else(|| ReadError::malformed(&token.t, "missing attribute"))?;
    let (href, title) = target(token, 2)?;
    Ok(PandocAttr::from_token_value(attr, &token.t)?
        .to_attrs()
        .with(ATTR_HREF, href)
        .with(ATTR_TITLE, title))
}

fn link_content(token: &Token) -> Result<ReadContent<'_>, ReadError> {
    Ok(ReadContent::Values(array_child(token, 1)?))
}

fn write_link(w: &mut WriterState<'_>, mark: &Mark, content: MarkContent) -> Result<(), WriteError> {
    let href = mark.attrs.get_str(ATTR_HREF).unwrap_or_default();
    let title = mark.attrs.get_str(ATTR_TITLE).unwrap_or_default();
    w.write_token(tag::LINK, |w| {
        w.write_attr(&PandocAttr::from_attrs(&mark.attrs))?;
        w.write_values(vec![TokenValue::Array(content.tokens)])?;
        w.write_array(|w| {
            w.write_string(href)?;
            w.write_string(title)
        })
    })
}

fn link_request(ctx: &CommandContext<'_>) -> Option<CommandOutcome> {
    let range = ctx.single_range()?;
    let block = ctx.doc().node_at(&range.block)?;
    if !ctx.schema.allows_marks(&block.node_type) {
        return None;
    }
    let (from, to, existing) = if range.from == range.to {
        match inline::mark_extent(&block.content, range.from, LINK) {
            Some((from, to, mark)) => (from, to, Some(mark)),
            None => (range.from, range.to, None),
        }
    } else {
        let existing = inline::marks_in_range(&block.content, range.from, range.to)
            .into_iter()
            .find(|m| m.is(LINK));
        (range.from, range.to, existing)
    };
    let text = inline::slice(&block.content, from, to)
        .iter()
        .map(Node::text_content)
        .collect();
    let props = match existing {
        Some(mark) => LinkProps {
            href: mark.attrs.get_str(ATTR_HREF).unwrap_or_default().to_string(),
            title: mark.attrs.get_str(ATTR_TITLE).unwrap_or_default().to_string(),
            text,
            attr: PandocAttr::from_attrs(&mark.attrs),
        },
        None => LinkProps {
            text,
            ..LinkProps::default()
        },
    };
    Some(CommandOutcome::Dialog(DialogRequest {
        command: LINK.to_string(),
        props: DialogProps::Link(props),
        target: DialogTarget::Range {
            block: range.block,
            from,
            to,
        },
    }))
}

impl Construct for Link {
    fn name(&self) -> &str {
        LINK
    }

    fn marks(&self) -> Vec<MarkSpec> {
        vec![MarkSpec::new(LINK)
            .non_inclusive()
            .attrs(PandocAttr::spec_defaults())
            .attrs(vec![
                (ATTR_HREF.to_string(), "".into()),
                (ATTR_TITLE.to_string(), "".into()),
            ])
            .writer(0, write_link)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::mark(tag::LINK, LINK, link_content).attrs(link_attrs)]
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(LINK, CommandKind::Dialog, link_request)
            .with_keys(&["Mod-k"])
            .with_active(|ctx| mark_active(ctx, LINK))]
    }
}
