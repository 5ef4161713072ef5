//! Inline code
//!
//! `Code` holds a plain string, so the mark is written innermost and its run is
//! emitted as the collected plain text rather than as `Str`/`Space` tokens.
//! Only text carries the mark; an image or break inside a code run would have
//! nowhere to go.

use crate::commands::marks::mark_command;
use crate::commands::Command;
use crate::construct::Construct;
use crate::doc::{Attrs, Mark, MarkSpec, PandocAttr};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token};
use crate::reader::{str_child, ReadContent, TokenReader};
use crate::writer::{MarkContent, WriterState};

pub const CODE: &str = "code";

pub struct Code;

fn code_attrs(token: &Token) -> Result<Attrs, ReadError> {
    let attr = token
        .child(0)
        .ok_or_else(|| ReadError::malformed(&token.t, "missing attribute"))?;
    Ok(PandocAttr::from_token_value(attr, &token.t)?.to_attrs())
}

fn code_text(token: &Token) -> Result<ReadContent<'_>, ReadError> {
    Ok(ReadContent::Text(str_child(token, 1)?.to_string()))
}

fn write_code(w: &mut WriterState<'_>, mark: &Mark, content: MarkContent) -> Result<(), WriteError> {
    w.write_token(tag::CODE, |w| {
        w.write_attr(&PandocAttr::from_attrs(&mark.attrs))?;
        w.write_string(&content.text)
    })
}

impl Construct for Code {
    fn name(&self) -> &str {
        CODE
    }

    fn marks(&self) -> Vec<MarkSpec> {
        vec![MarkSpec::new(CODE)
            .text_only()
            .attrs(PandocAttr::spec_defaults())
            .writer(20, write_code)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::mark(tag::CODE, CODE, code_text).attrs(code_attrs)]
    }

    fn commands(&self) -> Vec<Command> {
        vec![mark_command(CODE, &["Mod-`"])]
    }
}
