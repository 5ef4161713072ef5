use crate::common::{editor_for, paths_of};
use panedit_core::constructs::footnote::{ATTR_CONTENT, ATTR_NUMBER, ATTR_REF, FOOTNOTE};
use panedit_core::doc::{self, Attrs, Node};
use panedit_core::{Dispatched, Step, Transaction};

fn paste_anchor() -> Transaction {
    let anchor = Node::new(FOOTNOTE).with_attrs(
        Attrs::new()
            .with(ATTR_REF, "pasted")
            .with(ATTR_NUMBER, 0)
            .with(ATTR_CONTENT, ""),
    );
    Transaction::new().step(Step::ReplaceInline {
        block: vec![0, 0],
        from: 0,
        to: 0,
        nodes: vec![anchor],
    })
}

fn insert(text: &str) -> Transaction {
    Transaction::new().step(Step::InsertText {
        block: vec![0, 0],
        offset: 0,
        text: text.to_string(),
        marks: None,
    })
}

#[test]
fn test_undo_reverts_edit_and_repairs_together() {
    let editor = editor_for("hello_world.json");
    let before = editor.doc();

    assert_eq!(editor.dispatch(paste_anchor()).unwrap(), Dispatched::Committed);
    let after = editor.doc();
    assert_eq!(paths_of(&after, FOOTNOTE).len(), 1);
    assert_eq!(doc::notes(&after).unwrap().content.len(), 1);

    assert!(editor.undo());
    assert_eq!(editor.doc(), before);
    assert!(!editor.can_undo());

    assert!(editor.redo());
    assert_eq!(editor.doc(), after);
}

#[test]
fn test_new_edit_clears_redo() {
    let editor = editor_for("hello_world.json");
    editor.dispatch(insert("a")).unwrap();
    assert!(editor.undo());
    assert!(editor.can_redo());

    editor.dispatch(insert("b")).unwrap();
    assert!(!editor.can_redo());
    assert!(!editor.redo());
}

#[test]
fn test_history_is_bounded() {
    let editor = editor_for("hello_world.json").with_history_limit(2);
    for text in ["a", "b", "c"] {
        editor.dispatch(insert(text)).unwrap();
    }
    assert!(editor.undo());
    assert!(editor.undo());
    assert!(!editor.undo());
    assert_eq!(
        editor.doc().node_at(&[0, 0]).unwrap().content[0].text_str(),
        "aHello "
    );
}

#[test]
fn test_rejected_edit_is_not_recorded() {
    let editor = editor_for("footnotes.json");
    let anchor = Node::new(FOOTNOTE).with_attrs(Attrs::new().with(ATTR_REF, "x"));
    let dispatched = editor
        .dispatch(Transaction::new().step(Step::ReplaceInline {
            block: vec![1, 0, 0],
            from: 0,
            to: 0,
            nodes: vec![anchor],
        }))
        .unwrap();
    assert!(matches!(dispatched, Dispatched::Rejected { .. }));
    assert!(!editor.can_undo());
}

#[test]
fn test_writes_at_the_loaded_version() {
    let editor = editor_for("hello_world.json");
    editor.dispatch(insert("Oh ")).unwrap();
    let ast = editor.to_interchange().unwrap();
    assert_eq!(ast.api_version, *editor.api_version());
    assert_eq!(ast.blocks[0].t, "Para");
}
