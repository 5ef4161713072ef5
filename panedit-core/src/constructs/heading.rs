use crate::commands::blocks::{block_type_active, set_block_type};
use crate::commands::{edit, Command, CommandKind};
use crate::construct::Construct;
use crate::doc::{Attrs, ContentExpr, Node, NodeSpec, PandocAttr};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token};
use crate::reader::{array_child, ReadContent, TokenReader};
use crate::writer::WriterState;

pub const HEADING: &str = "heading";
pub const ATTR_LEVEL: &str = "level";

/// Levels Pandoc supports for `Header`.
const LEVELS: std::ops::RangeInclusive<i64> = 1..=6;

pub struct Heading;

fn heading_attrs(token: &Token) -> Result<Attrs, ReadError> {
    let level = token
        .int_at(0)
        .ok_or_else(|| ReadError::malformed(&token.t, "level must be an integer"))?;
    let attr = token
        .child(1)
        .ok_or_else(|| ReadError::malformed(&token.t, "missing attribute"))
        .and_then(|value| PandocAttr::from_token_value(value, &token.t))?;
    Ok(attr.to_attrs().with(ATTR_LEVEL, level))
}

fn heading_content(token: &Token) -> Result<ReadContent<'_>, ReadError> {
    Ok(ReadContent::Values(array_child(token, 2)?))
}

fn write_heading(w: &mut WriterState<'_>, node: &Node) -> Result<(), WriteError> {
    let level = node.attrs.get_i64(ATTR_LEVEL).unwrap_or(1);
    w.write_token(tag::HEADER, |w| {
        w.write_int(level)?;
        w.write_attr(&PandocAttr::from_attrs(&node.attrs))?;
        w.write_array(|w| w.write_inlines(&node.content))
    })
}

impl Construct for Heading {
    fn name(&self) -> &str {
        HEADING
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::block(HEADING, ContentExpr::Inline)
            .attr(ATTR_LEVEL, 1)
            .attrs(PandocAttr::spec_defaults())
            .writer(write_heading)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::block(tag::HEADER, HEADING, heading_content).attrs(heading_attrs)]
    }

    fn commands(&self) -> Vec<Command> {
        LEVELS
            .map(|level| {
                let attrs = Attrs::new().with(ATTR_LEVEL, level);
                let active_attrs = attrs.clone();
                let key = format!("Mod-Alt-{level}");
                Command::new(&format!("heading_{level}"), CommandKind::Node, move |ctx| {
                    edit(set_block_type(ctx, HEADING, attrs.clone()))
                })
                .with_keys(&[key.as_str()])
                .with_active(move |ctx| block_type_active(ctx, HEADING, &active_attrs))
            })
            .collect()
    }
}
