//! Inline images
//!
//! The alt text is kept as plain text; formatting inside Pandoc's alt inlines
//! is flattened on read.

use super::link::{target, ATTR_TITLE};
use crate::commands::dialogs::ImageProps;
use crate::commands::{Command, CommandContext, CommandKind, CommandOutcome, DialogProps, DialogRequest, DialogTarget};
use crate::construct::Construct;
use crate::doc::{Attrs, Node, NodeSpec, PandocAttr};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token};
use crate::reader::{array_child, plain_text, TokenReader};
use crate::writer::WriterState;

pub const IMAGE: &str = "image";
pub const ATTR_SRC: &str = "src";
pub const ATTR_ALT: &str = "alt";

pub struct Image;

fn image_attrs(token: &Token) -> Result<Attrs, ReadError> {
    let attr = token
        .child(0)
        .ok_or_else(|| ReadError::malformed(&token.t, "missing attribute"))?;
    let alt = plain_text(array_child(token, 1)?);
    let (src, title) = target(token, 2)?;
    Ok(PandocAttr::from_token_value(attr, &token.t)?
        .to_attrs()
        .with(ATTR_SRC, src)
        .with(ATTR_TITLE, title)
        .with(ATTR_ALT, alt))
}

fn write_image(w: &mut WriterState<'_>, node: &Node) -> Result<(), WriteError> {
    let attr = |key| node.attrs.get_str(key).unwrap_or_default();
    w.write_token(tag::IMAGE, |w| {
        w.write_attr(&PandocAttr::from_attrs(&node.attrs))?;
        w.write_array(|w| w.write_text(attr(ATTR_ALT)))?;
        w.write_array(|w| {
            w.write_string(attr(ATTR_SRC))?;
            w.write_string(attr(ATTR_TITLE))
        })
    })
}

fn props_of(node: &Node) -> ImageProps {
    let attr = |key| node.attrs.get_str(key).unwrap_or_default().to_string();
    ImageProps {
        src: attr(ATTR_SRC),
        title: attr(ATTR_TITLE),
        alt: attr(ATTR_ALT),
        attr: PandocAttr::from_attrs(&node.attrs),
    }
}

fn image_request(ctx: &CommandContext<'_>) -> Option<CommandOutcome> {
    if let Some((path, node)) = ctx.selected_node().filter(|(_, n)| n.is(IMAGE)) {
        return Some(CommandOutcome::Dialog(DialogRequest {
            command: IMAGE.to_string(),
            props: DialogProps::Image(props_of(node)),
            target: DialogTarget::Node {
                path,
                node_type: IMAGE.to_string(),
            },
        }));
    }
    let range = ctx.single_range()?;
    let block = ctx.doc().node_at(&range.block)?;
    if !ctx.schema.allows_marks(&block.node_type) {
        return None;
    }
    Some(CommandOutcome::Dialog(DialogRequest {
        command: IMAGE.to_string(),
        props: DialogProps::Image(ImageProps::default()),
        target: DialogTarget::Range {
            block: range.block,
            from: range.from,
            to: range.to,
        },
    }))
}

impl Construct for Image {
    fn name(&self) -> &str {
        IMAGE
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::inline(IMAGE)
            .atom()
            .attr(ATTR_SRC, "")
            .attr(ATTR_TITLE, "")
            .attr(ATTR_ALT, "")
            .attrs(PandocAttr::spec_defaults())
            .writer(write_image)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::node(tag::IMAGE, IMAGE).attrs(image_attrs)]
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(IMAGE, CommandKind::Dialog, image_request)
            .with_active(|ctx| ctx.selected_node().is_some_and(|(_, n)| n.is(IMAGE)))]
    }
}
