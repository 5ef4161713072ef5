//! Treeviz rendering of document trees
//!
//! A compact, line based view of a document for debugging and snapshot tests.
//! Nesting is drawn with box connectors; each line is
//!
//! `<prefix><connector> <icon> <label>`
//!
//! where the label is a node's text (truncated to 30 characters) or a short
//! summary of its attributes. Marks are listed in braces after text.
//!
//! Example:
//!
//! ```text
//! ⧉ doc
//! ├─ Ψ body
//! │ ├─ ¶ paragraph
//! │ │ ├─ ◦ Hello
//! │ │ └─ ◦ world {strong}
//! │ └─ ¶ paragraph
//! └─ ☷ notes
//! ```
//!
//! Icons
//!     doc ⧉, body Ψ, notes ☷, note ³, paragraph ¶, heading §, blockquote ❝,
//!     code_block 𝒱, horizontal_rule ―, bullet_list ☰, ordered_list ☰,
//!     list_item •, text ◦, hard_break ↵, image ▣, footnote †, anything else ○

use crate::doc::Node;

const LABEL_WIDTH: usize = 30;

fn icon(node_type: &str) -> &'static str {
    match node_type {
        "doc" => "⧉",
        "body" => "Ψ",
        "notes" => "☷",
        "note" => "³",
        "paragraph" => "¶",
        "heading" => "§",
        "blockquote" => "❝",
        "code_block" => "𝒱",
        "horizontal_rule" => "―",
        "bullet_list" | "ordered_list" => "☰",
        "list_item" => "•",
        "text" => "◦",
        "hard_break" => "↵",
        "image" => "▣",
        "footnote" => "†",
        _ => "○",
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= LABEL_WIDTH {
        return text.to_string();
    }
    let mut out: String = text.chars().take(LABEL_WIDTH - 1).collect();
    out.push('…');
    out
}

fn label(node: &Node) -> String {
    let mut label = match &node.text {
        Some(text) => truncate(text),
        None => node.node_type.clone(),
    };
    let summary: Vec<String> = node
        .attrs
        .iter()
        .filter(|(key, value)| {
            !matches!(key.as_str(), "meta" | "content" | "classes" | "keyvalue")
                && !value.as_str().is_some_and(str::is_empty)
        })
        .map(|(key, value)| match value.as_str() {
            Some(s) => format!("{key}={}", truncate(s)),
            None => format!("{key}={value}"),
        })
        .collect();
    if !summary.is_empty() {
        label.push_str(&format!(" ({})", summary.join(", ")));
    }
    if !node.marks.is_empty() {
        let marks: Vec<&str> = node.marks.iter().map(|m| m.mark_type.as_str()).collect();
        label.push_str(&format!(" {{{}}}", marks.join(", ")));
    }
    label
}

fn format_node(node: &Node, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    output.push_str(&format!("{prefix}{connector} {} {}\n", icon(&node.node_type), label(node)));
    let child_prefix = format!("{prefix}{}", if is_last { "  " } else { "│ " });
    format_children(node, &child_prefix, output);
}

fn format_children(node: &Node, prefix: &str, output: &mut String) {
    let count = node.content.len();
    for (i, child) in node.content.iter().enumerate() {
        format_node(child, prefix, i + 1 == count, output);
    }
}

/// Render `doc` as a treeviz string.
pub fn to_treeviz(doc: &Node) -> String {
    let mut output = format!("{} {}\n", icon(&doc.node_type), label(doc));
    format_children(doc, "", &mut output);
    output
}
