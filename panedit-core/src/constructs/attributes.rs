//! Attribute editing
//!
//! Headings, code blocks, and the inline wrappers carry a Pandoc attribute
//! (`id`, classes, key/value pairs). This construct defines no types of its
//! own, only the dialog command that edits the attribute of the selected node
//! or the nearest ancestor that has one.

use crate::commands::blocks::attr_target;
use crate::commands::{Command, CommandContext, CommandKind, CommandOutcome, DialogProps, DialogRequest, DialogTarget};
use crate::construct::Construct;

pub const ATTRIBUTES: &str = "attributes";

pub struct Attributes;

fn attributes_request(ctx: &CommandContext<'_>) -> Option<CommandOutcome> {
    let (path, attr) = attr_target(ctx)?;
    let node = ctx.doc().node_at(&path)?;
    Some(CommandOutcome::Dialog(DialogRequest {
        command: ATTRIBUTES.to_string(),
        props: DialogProps::Attr(attr),
        target: DialogTarget::Node {
            node_type: node.node_type.clone(),
            path,
        },
    }))
}

impl Construct for Attributes {
    fn name(&self) -> &str {
        ATTRIBUTES
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(ATTRIBUTES, CommandKind::Dialog, attributes_request)
            .with_keys(&["Mod-Alt-a"])
            .with_active(|ctx| attr_target(ctx).is_some_and(|(_, attr)| attr.is_available()))]
    }
}
