//! Shared helpers: fixtures, registry, and note id canonicalization.

use panedit_core::constructs::footnote::{ATTR_NOTE_ID, ATTR_REF, FOOTNOTE, NOTE};
use panedit_core::pandoc::from_json;
use panedit_core::{read_document, ConstructRegistry, Editor, Node, PandocAst};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

pub fn registry() -> Arc<ConstructRegistry> {
    Arc::new(ConstructRegistry::with_defaults().expect("default constructs must not conflict"))
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> PandocAst {
    let json = fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"));
    from_json(&json).unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
}

pub fn read_fixture(name: &str) -> Node {
    read_document(&registry(), &load_fixture(name)).expect("fixture should read")
}

pub fn editor_for(name: &str) -> Editor {
    Editor::from_interchange(registry(), &load_fixture(name)).expect("fixture should load")
}

/// Replace note ids and footnote refs with `n1`, `n2`, ... in order of first
/// appearance, so documents read at different times compare equal.
pub fn canonical_ids(doc: &Node) -> Node {
    let mut ids: HashMap<String, String> = HashMap::new();
    let mut out = doc.clone();
    rename(&mut out, &mut ids);
    out
}

fn rename(node: &mut Node, ids: &mut HashMap<String, String>) {
    let key = if node.is(FOOTNOTE) {
        Some(ATTR_REF)
    } else if node.is(NOTE) {
        Some(ATTR_NOTE_ID)
    } else {
        None
    };
    if let Some(key) = key {
        if let Some(id) = node.attrs.get_str(key).map(str::to_string) {
            let next = format!("n{}", ids.len() + 1);
            let canonical = ids.entry(id).or_insert(next).clone();
            node.attrs.set(key, canonical);
        }
    }
    for child in &mut node.content {
        rename(child, ids);
    }
}

/// Paths of every node of `node_type`, relative to the document root.
pub fn paths_of(doc: &Node, node_type: &str) -> Vec<Vec<usize>> {
    doc.find_all(node_type).into_iter().map(|(path, _)| path).collect()
}
