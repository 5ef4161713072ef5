//! Inspect transforms
//!
//! Each transform renders one view of a document loaded by the CLI:
//!
//! - `doc-treeviz`: the document tree with Unicode icons (default)
//! - `doc-json`: the document tree as JSON
//! - `token-json`: the interchange tree as Pandoc JSON, as it was read
//!
//! Example: `panedit inspect notes.md doc-json`

use panedit_core::inspect::to_treeviz;
use panedit_core::pandoc::to_json_pretty;
use panedit_core::{Node, PandocAst};

/// All available inspect transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &["doc-treeviz", "doc-json", "token-json"];

pub const DEFAULT_TRANSFORM: &str = "doc-treeviz";

/// Render `doc` (read from `ast`) with the named transform.
pub fn execute_transform(ast: &PandocAst, doc: &Node, transform: &str) -> Result<String, String> {
    match transform {
        "doc-treeviz" => Ok(to_treeviz(doc)),
        "doc-json" => serde_json::to_string_pretty(doc)
            .map(|json| format!("{json}\n"))
            .map_err(|e| format!("JSON serialization failed: {e}")),
        "token-json" => to_json_pretty(ast)
            .map(|json| format!("{json}\n"))
            .map_err(|e| e.to_string()),
        other => Err(format!(
            "Unknown transform '{other}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}
