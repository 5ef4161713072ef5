//! Character formatting marks
//!
//! Each mark maps to one wrapper token. Superscript and subscript exclude each
//! other. Underline has two interchange forms: the `Underline` token, which
//! exists from API version 1.21 on, and the older convention of a `Span` with
//! the class `underline`. Both are read; the writer picks by version.

use crate::commands::marks::mark_command;
use crate::commands::Command;
use crate::construct::Construct;
use crate::doc::{Excludes, Mark, MarkSpec, PandocAttr};
use crate::error::{ReadError, WriteError};
use crate::pandoc::{tag, Token, TokenValue};
use crate::reader::{all_children, array_child, ReadContent, TokenReader};
use crate::writer::{MarkContent, WriterState};

pub const EMPH: &str = "emph";
pub const STRONG: &str = "strong";
pub const STRIKEOUT: &str = "strikeout";
pub const SUPERSCRIPT: &str = "superscript";
pub const SUBSCRIPT: &str = "subscript";
pub const SMALLCAPS: &str = "smallcaps";
pub const UNDERLINE: &str = "underline";

/// First API version with a native `Underline` token.
const UNDERLINE_SINCE: [u32; 2] = [1, 21];
const UNDERLINE_CLASS: &str = "underline";

pub struct Formatting;

fn wrap(w: &mut WriterState<'_>, t: &str, content: MarkContent) -> Result<(), WriteError> {
    w.write_token(t, |w| w.write_values(content.tokens))
}

fn write_emph(w: &mut WriterState<'_>, _: &Mark, content: MarkContent) -> Result<(), WriteError> {
    wrap(w, tag::EMPH, content)
}

fn write_strong(w: &mut WriterState<'_>, _: &Mark, content: MarkContent) -> Result<(), WriteError> {
    wrap(w, tag::STRONG, content)
}

fn write_strikeout(w: &mut WriterState<'_>, _: &Mark, content: MarkContent) -> Result<(), WriteError> {
    wrap(w, tag::STRIKEOUT, content)
}

fn write_superscript(w: &mut WriterState<'_>, _: &Mark, content: MarkContent) -> Result<(), WriteError> {
    wrap(w, tag::SUPERSCRIPT, content)
}

fn write_subscript(w: &mut WriterState<'_>, _: &Mark, content: MarkContent) -> Result<(), WriteError> {
    wrap(w, tag::SUBSCRIPT, content)
}

fn write_smallcaps(w: &mut WriterState<'_>, _: &Mark, content: MarkContent) -> Result<(), WriteError> {
    wrap(w, tag::SMALL_CAPS, content)
}

fn write_underline(w: &mut WriterState<'_>, _: &Mark, content: MarkContent) -> Result<(), WriteError> {
    if w.api_version().at_least(&UNDERLINE_SINCE) {
        return wrap(w, tag::UNDERLINE, content);
    }
    let attr = PandocAttr {
        classes: vec![UNDERLINE_CLASS.to_string()],
        ..PandocAttr::default()
    };
    w.write_token(tag::SPAN, |w| {
        w.write_attr(&attr)?;
        w.write_values(vec![TokenValue::Array(content.tokens)])
    })
}

fn is_underline_span(token: &Token) -> bool {
    token
        .child(0)
        .and_then(|attr| PandocAttr::from_token_value(attr, &token.t).ok())
        .is_some_and(|attr| attr.has_class(UNDERLINE_CLASS))
}

fn span_content(token: &Token) -> Result<ReadContent<'_>, ReadError> {
    Ok(ReadContent::Values(array_child(token, 1)?))
}

impl Construct for Formatting {
    fn name(&self) -> &str {
        "formatting"
    }

    fn description(&self) -> &str {
        "Emphasis, strong, strikeout, super/subscript, small caps, underline"
    }

    fn marks(&self) -> Vec<MarkSpec> {
        vec![
            MarkSpec::new(EMPH).writer(4, write_emph),
            MarkSpec::new(STRONG).writer(3, write_strong),
            MarkSpec::new(STRIKEOUT).writer(5, write_strikeout),
            MarkSpec::new(SUPERSCRIPT)
                .excludes(Excludes::Types(vec![SUBSCRIPT.into()]))
                .writer(6, write_superscript),
            MarkSpec::new(SUBSCRIPT)
                .excludes(Excludes::Types(vec![SUPERSCRIPT.into()]))
                .writer(7, write_subscript),
            MarkSpec::new(SMALLCAPS).writer(8, write_smallcaps),
            MarkSpec::new(UNDERLINE).writer(2, write_underline),
        ]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![
            TokenReader::mark(tag::EMPH, EMPH, all_children),
            TokenReader::mark(tag::STRONG, STRONG, all_children),
            TokenReader::mark(tag::STRIKEOUT, STRIKEOUT, all_children),
            TokenReader::mark(tag::SUPERSCRIPT, SUPERSCRIPT, all_children),
            TokenReader::mark(tag::SUBSCRIPT, SUBSCRIPT, all_children),
            TokenReader::mark(tag::SMALL_CAPS, SMALLCAPS, all_children),
            TokenReader::mark(tag::UNDERLINE, UNDERLINE, all_children),
            TokenReader::mark(tag::SPAN, UNDERLINE, span_content).when(is_underline_span),
        ]
    }

    fn commands(&self) -> Vec<Command> {
        vec![
            mark_command(EMPH, &["Mod-i"]),
            mark_command(STRONG, &["Mod-b"]),
            mark_command(STRIKEOUT, &["Mod-d"]),
            mark_command(SUPERSCRIPT, &["Mod-."]),
            mark_command(SUBSCRIPT, &["Mod-,"]),
            mark_command(SMALLCAPS, &[]),
            mark_command(UNDERLINE, &["Mod-u"]),
        ]
    }
}
