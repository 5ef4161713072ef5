//! Construct trait definition
//!
//! A construct is one semantic unit of markup (heading, link, footnote, ...).
//! It bundles the document types it defines, the readers that map interchange
//! tokens onto them, the writers attached to its node and mark specs, and the
//! editing commands that operate on it. The registry assembles constructs once
//! at startup.

use crate::commands::Command;
use crate::doc::{MarkSpec, NodeSpec};
use crate::reader::TokenReader;

/// Trait for document constructs
///
/// Every contribution defaults to empty, so a construct only overrides what
/// it provides.
///
/// # Examples
///
/// ```ignore
/// struct Highlight;
///
/// impl Construct for Highlight {
///     fn name(&self) -> &str {
///         "highlight"
///     }
///
///     fn marks(&self) -> Vec<MarkSpec> {
///         vec![MarkSpec::new("highlight").writer(9, write_highlight)]
///     }
///
///     fn readers(&self) -> Vec<TokenReader> {
///         vec![TokenReader::mark("Span", "highlight", all_inlines).when(is_highlight)]
///     }
/// }
/// ```
pub trait Construct: Send + Sync {
    /// The name of this construct (e.g., "heading", "link")
    fn name(&self) -> &str;

    /// Optional description of this construct
    fn description(&self) -> &str {
        ""
    }

    /// Node types defined by this construct, each with its writer
    fn nodes(&self) -> Vec<NodeSpec> {
        Vec::new()
    }

    /// Mark types defined by this construct, each with its writer
    fn marks(&self) -> Vec<MarkSpec> {
        Vec::new()
    }

    /// Token readers, in priority order
    fn readers(&self) -> Vec<TokenReader> {
        Vec::new()
    }

    /// Editing commands
    fn commands(&self) -> Vec<Command> {
        Vec::new()
    }
}
