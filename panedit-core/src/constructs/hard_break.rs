use crate::commands::blocks::insert_inline;
use crate::commands::{edit, Command, CommandKind};
use crate::construct::Construct;
use crate::doc::{Attrs, Node, NodeSpec};
use crate::error::WriteError;
use crate::pandoc::tag;
use crate::reader::TokenReader;
use crate::writer::WriterState;

pub const HARD_BREAK: &str = "hard_break";

pub struct HardBreak;

fn write_hard_break(w: &mut WriterState<'_>, _node: &Node) -> Result<(), WriteError> {
    w.write_leaf(tag::LINE_BREAK)
}

impl Construct for HardBreak {
    fn name(&self) -> &str {
        HARD_BREAK
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::inline(HARD_BREAK).atom().writer(write_hard_break)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::node(tag::LINE_BREAK, HARD_BREAK)]
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(HARD_BREAK, CommandKind::Insert, |ctx| {
            let node = ctx.schema.create(HARD_BREAK, Attrs::new());
            edit(insert_inline(ctx, node))
        })
        .with_keys(&["Shift-Enter", "Mod-Enter"])]
    }
}
