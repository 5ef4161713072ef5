use crate::commands::blocks::{block_type_active, set_block_type};
use crate::commands::{edit, Command, CommandKind};
use crate::construct::Construct;
use crate::doc::{Attrs, ContentExpr, Node, NodeSpec, PandocAttr};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token};
use crate::reader::{str_child, ReadContent, TokenReader};
use crate::writer::WriterState;

pub const CODE_BLOCK: &str = "code_block";

pub struct CodeBlock;

fn code_block_attrs(token: &Token) -> Result<Attrs, ReadError> {
    let attr = token
        .child(0)
        .ok_or_else(|| ReadError::malformed(&token.t, "missing attribute"))?;
    Ok(PandocAttr::from_token_value(attr, &token.t)?.to_attrs())
}

fn code_block_text(token: &Token) -> Result<ReadContent<'_>, ReadError> {
    Ok(ReadContent::Text(str_child(token, 1)?.to_string()))
}

fn write_code_block(w: &mut WriterState<'_>, node: &Node) -> Result<(), WriteError> {
    w.write_token(tag::CODE_BLOCK, |w| {
        w.write_attr(&PandocAttr::from_attrs(&node.attrs))?;
        w.write_string(&node.text_content())
    })
}

impl Construct for CodeBlock {
    fn name(&self) -> &str {
        CODE_BLOCK
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::block(CODE_BLOCK, ContentExpr::Text)
            .attrs(PandocAttr::spec_defaults())
            .writer(write_code_block)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::block(tag::CODE_BLOCK, CODE_BLOCK, code_block_text).attrs(code_block_attrs)]
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(CODE_BLOCK, CommandKind::Node, |ctx| {
            edit(set_block_type(ctx, CODE_BLOCK, Attrs::new()))
        })
        .with_keys(&["Shift-Mod-\\"])
        .with_active(|ctx| block_type_active(ctx, CODE_BLOCK, &Attrs::new()))]
    }
}
