use crate::construct::Construct;
use crate::doc::{Attrs, Mark, MarkSpec, PandocAttr};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token, TokenValue};
use crate::reader::{array_child, ReadContent, TokenReader};
use crate::writer::{MarkContent, WriterState};

pub const SPAN: &str = "span";

/// Generic `Span` carrying only a Pandoc attribute.
pub struct Span;

fn span_attrs(token: &Token) -> Result<Attrs, ReadError> {
    let attr = token
        .child(0)
        .ok_or_else(|| ReadError::malformed(&token.t, "missing attribute"))?;
    Ok(PandocAttr::from_token_value(attr, &token.t)?.to_attrs())
}

fn span_content(token: &Token) -> Result<ReadContent<'_>, ReadError> {
    Ok(ReadContent::Values(array_child(token, 1)?))
}

fn write_span(w: &mut WriterState<'_>, mark: &Mark, content: MarkContent) -> Result<(), WriteError> {
    w.write_token(tag::SPAN, |w| {
        w.write_attr(&PandocAttr::from_attrs(&mark.attrs))?;
        w.write_values(vec![TokenValue::Array(content.tokens)])
    })
}

impl Construct for Span {
    fn name(&self) -> &str {
        SPAN
    }

    fn marks(&self) -> Vec<MarkSpec> {
        vec![MarkSpec::new(SPAN)
            .attrs(PandocAttr::spec_defaults())
            .writer(1, write_span)]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![TokenReader::mark(tag::SPAN, SPAN, span_content).attrs(span_attrs)]
    }
}
