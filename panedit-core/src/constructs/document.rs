//! The fixed document shape and plain text
//!
//! `doc` holds exactly one `body` and one `notes` container. The body and every
//! note are editing roots. Text arrives as `Str` words separated by `Space` and
//! `SoftBreak` tokens; all three become characters of one text run.

use super::footnote::{ATTR_NOTE_ID, ATTR_NOTE_NUMBER, NOTE};
use crate::construct::Construct;
use crate::doc::node::TEXT;
use crate::doc::{ContentExpr, NodeSpec, BODY, DOC, NOTES};
use crate::pandoc::tag;
use crate::reader::{str_child, TokenReader};
use serde_json::{Map, Value};

pub const ATTR_META: &str = "meta";

pub struct Document;

impl Construct for Document {
    fn name(&self) -> &str {
        "document"
    }

    fn description(&self) -> &str {
        "Document root, body, notes container, and text"
    }

    fn nodes(&self) -> Vec<NodeSpec> {
        vec![
            NodeSpec::structural(DOC, ContentExpr::Sequence(vec![BODY.into(), NOTES.into()]))
                .attr(ATTR_META, Value::Object(Map::new())),
            NodeSpec::structural(BODY, ContentExpr::Blocks).editing_root(),
            NodeSpec::structural(NOTES, ContentExpr::ZeroOrMore(NOTE.into())),
            NodeSpec::structural(NOTE, ContentExpr::Blocks)
                .editing_root()
                .attr(ATTR_NOTE_ID, "")
                .attr(ATTR_NOTE_NUMBER, 0),
            NodeSpec::inline(TEXT),
        ]
    }

    fn readers(&self) -> Vec<TokenReader> {
        vec![
            TokenReader::text(tag::STR, |token| Ok(str_child(token, 0)?.to_string())),
            TokenReader::text(tag::SPACE, |_| Ok(" ".to_string())),
            TokenReader::text(tag::SOFT_BREAK, |_| Ok(" ".to_string())),
        ]
    }
}
