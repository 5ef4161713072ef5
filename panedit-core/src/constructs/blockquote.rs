use crate::commands::blocks::toggle_wrap;
use crate::commands::{edit, Command, CommandKind};
use crate::construct::Construct;
use crate::doc::{ContentExpr, Node, NodeSpec};
use crate::error::WriteError;
use crate::pandoc::tag;
use crate::reader::{all_children, TokenReader};
use crate::writer::WriterState;

pub const BLOCKQUOTE: &str = "blockquote";

pub struct Blockquote;

fn write_blockquote(w: &mut WriterState<'_>, node: &Node) -> Result<(), WriteError> {
    w.write_token(tag::BLOCK_QUOTE, |w| w.write_blocks(node))
}

impl Construct for Blockquote {
    fn name(&self) -> &str {
        BLOCKQUOTE
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::block(BLOCKQUOTE, ContentExpr::Blocks).writer(write_blockquote)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::block(tag::BLOCK_QUOTE, BLOCKQUOTE, all_children)]
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(BLOCKQUOTE, CommandKind::Wrap, |ctx| {
            edit(toggle_wrap(ctx, BLOCKQUOTE))
        })
        .with_keys(&["Mod->"])
        .with_active(|ctx| ctx.find_ancestor(|n| n.is(BLOCKQUOTE)).is_some())]
    }
}
