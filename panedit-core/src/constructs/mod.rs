//! Built-in constructs
//!
//! Each module defines one construct: its node and mark types, the readers for
//! its interchange tokens, its writers, and its commands. Order matters for
//! reading, since the first reader that accepts a token wins: the underline
//! reader for `Span` sits in `formatting` ahead of the generic `span` one.

pub mod attributes;
pub mod blockquote;
pub mod code;
pub mod code_block;
pub mod document;
pub mod footnote;
pub mod formatting;
pub mod hard_break;
pub mod heading;
pub mod horizontal_rule;
pub mod image;
pub mod link;
pub mod lists;
pub mod paragraph;
pub mod span;

pub use attributes::Attributes;
pub use blockquote::Blockquote;
pub use code::Code;
pub use code_block::CodeBlock;
pub use document::Document;
pub use footnote::Footnote;
pub use formatting::Formatting;
pub use hard_break::HardBreak;
pub use heading::Heading;
pub use horizontal_rule::HorizontalRule;
pub use image::Image;
pub use link::Link;
pub use lists::Lists;
pub use paragraph::Paragraph;
pub use span::Span;

use crate::construct::Construct;

/// The built-in constructs in registration order.
pub fn default_constructs() -> Vec<Box<dyn Construct>> {
    vec![
        Box::new(Document),
        Box::new(Paragraph),
        Box::new(Heading),
        Box::new(Blockquote),
        Box::new(CodeBlock),
        Box::new(HorizontalRule),
        Box::new(Lists),
        Box::new(HardBreak),
        Box::new(Formatting),
        Box::new(Code),
        Box::new(Span),
        Box::new(Link),
        Box::new(Image),
        Box::new(Footnote),
        Box::new(Attributes),
    ]
}
