use crate::commands::blocks::{block_type_active, set_block_type};
use crate::commands::{edit, Command, CommandKind};
use crate::construct::Construct;
use crate::doc::{Attrs, ContentExpr, Node, NodeSpec};
use crate::error::WriteError;
use crate::pandoc::tag;
use crate::reader::{all_children, TokenReader};
use crate::writer::WriterState;

pub const PARAGRAPH: &str = "paragraph";

pub struct Paragraph;

fn write_paragraph(w: &mut WriterState<'_>, node: &Node) -> Result<(), WriteError> {
    w.write_token(tag::PARA, |w| w.write_inlines(&node.content))
}

impl Construct for Paragraph {
    fn name(&self) -> &str {
        PARAGRAPH
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::block(PARAGRAPH, ContentExpr::Inline).writer(write_paragraph)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        // Plain is how tight list items and table cells hold inlines.
        vec![
            TokenReader::block(tag::PARA, PARAGRAPH, all_children),
            TokenReader::block(tag::PLAIN, PARAGRAPH, all_children),
        ]
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(PARAGRAPH, CommandKind::Node, |ctx| {
            edit(set_block_type(ctx, PARAGRAPH, Attrs::new()))
        })
        .with_keys(&["Mod-Alt-0"])
        .with_active(|ctx| block_type_active(ctx, PARAGRAPH, &Attrs::new()))]
    }
}
