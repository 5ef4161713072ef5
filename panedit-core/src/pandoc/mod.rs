//! Pandoc JSON interchange format
//!
//! The interchange tree is what the external conversion service produces and
//! consumes. It is immutable once decoded: readers only borrow it, writers build
//! a fresh one.

pub mod token;

pub use token::{ApiVersion, PandocAst, Token, TokenValue};

use crate::error::{ReadError, WriteError};

/// Token tags used by the built-in constructs.
pub mod tag {
    pub const STR: &str = "Str";
    pub const SPACE: &str = "Space";
    pub const SOFT_BREAK: &str = "SoftBreak";
    pub const LINE_BREAK: &str = "LineBreak";
    pub const PARA: &str = "Para";
    pub const PLAIN: &str = "Plain";
    pub const HEADER: &str = "Header";
    pub const BLOCK_QUOTE: &str = "BlockQuote";
    pub const CODE_BLOCK: &str = "CodeBlock";
    pub const HORIZONTAL_RULE: &str = "HorizontalRule";
    pub const BULLET_LIST: &str = "BulletList";
    pub const ORDERED_LIST: &str = "OrderedList";
    pub const EMPH: &str = "Emph";
    pub const STRONG: &str = "Strong";
    pub const STRIKEOUT: &str = "Strikeout";
    pub const SUPERSCRIPT: &str = "Superscript";
    pub const SUBSCRIPT: &str = "Subscript";
    pub const SMALL_CAPS: &str = "SmallCaps";
    pub const UNDERLINE: &str = "Underline";
    pub const CODE: &str = "Code";
    pub const SPAN: &str = "Span";
    pub const LINK: &str = "Link";
    pub const IMAGE: &str = "Image";
    pub const NOTE: &str = "Note";
}

/// Decode an interchange tree from Pandoc JSON.
pub fn from_json(json: &str) -> Result<PandocAst, ReadError> {
    serde_json::from_str(json).map_err(|e| ReadError::Json(e.to_string()))
}

/// Encode an interchange tree as compact Pandoc JSON.
pub fn to_json(ast: &PandocAst) -> Result<String, WriteError> {
    serde_json::to_string(ast).map_err(|e| WriteError::Json(e.to_string()))
}

/// Encode an interchange tree as indented JSON, for inspection.
pub fn to_json_pretty(ast: &PandocAst) -> Result<String, WriteError> {
    serde_json::to_string_pretty(ast).map_err(|e| WriteError::Json(e.to_string()))
}
