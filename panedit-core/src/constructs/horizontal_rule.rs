use crate::commands::blocks::insert_block;
use crate::commands::{edit, Command, CommandKind};
use crate::construct::Construct;
use crate::doc::{Attrs, ContentExpr, Node, NodeSpec};
use crate::error::WriteError;
use crate::pandoc::tag;
use crate::reader::TokenReader;
use crate::writer::WriterState;

pub const HORIZONTAL_RULE: &str = "horizontal_rule";

pub struct HorizontalRule;

fn write_rule(w: &mut WriterState<'_>, _node: &Node) -> Result<(), WriteError> {
    w.write_leaf(tag::HORIZONTAL_RULE)
}

impl Construct for HorizontalRule {
    fn name(&self) -> &str {
        HORIZONTAL_RULE
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::block(HORIZONTAL_RULE, ContentExpr::Empty)
            .atom()
            .writer(write_rule)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::node(tag::HORIZONTAL_RULE, HORIZONTAL_RULE)]
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(HORIZONTAL_RULE, CommandKind::Insert, |ctx| {
            let rule = ctx.schema.create(HORIZONTAL_RULE, Attrs::new());
            edit(insert_block(ctx, rule))
        })
        .with_keys(&["Mod-_"])]
    }
}
