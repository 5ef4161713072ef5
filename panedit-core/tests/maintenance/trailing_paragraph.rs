use crate::common::{editor_for, registry};
use panedit_core::constructs::code_block::CODE_BLOCK;
use panedit_core::constructs::horizontal_rule::HORIZONTAL_RULE;
use panedit_core::constructs::paragraph::PARAGRAPH;
use panedit_core::doc::{self, Attrs};
use panedit_core::{Dispatched, Step, Transaction};

#[test]
fn test_body_ending_in_a_rule_gets_a_paragraph() {
    let editor = editor_for("kitchen_sink.json");
    let blocks = doc::body(&editor.doc()).unwrap().content.len();
    let rule = registry().schema().create(HORIZONTAL_RULE, Attrs::new());
    let dispatched = editor
        .dispatch(Transaction::new().step(Step::Replace {
            parent: doc::BODY_PATH.to_vec(),
            from: blocks - 1,
            to: blocks,
            nodes: vec![rule],
        }))
        .unwrap();
    assert_eq!(dispatched, Dispatched::Committed);

    let doc = editor.doc();
    let body = doc::body(&doc).unwrap();
    assert_eq!(body.content.len(), blocks + 1);
    assert!(body.content[blocks - 1].is(HORIZONTAL_RULE));
    let last = body.last_child().unwrap();
    assert!(last.is(PARAGRAPH));
    assert!(last.content.is_empty());

    assert_eq!(editor.normalize().unwrap(), Dispatched::Unchanged);
}

#[test]
fn test_note_ending_in_a_code_block_gets_a_paragraph() {
    let editor = editor_for("footnotes.json");
    let code = registry()
        .schema()
        .create(CODE_BLOCK, Attrs::new())
        .with_content(vec![panedit_core::Node::text("x")]);
    editor
        .dispatch(Transaction::new().step(Step::Replace {
            parent: vec![1, 0],
            from: 0,
            to: 1,
            nodes: vec![code],
        }))
        .unwrap();

    let doc = editor.doc();
    let note = doc.node_at(&[1, 0]).unwrap();
    assert_eq!(note.content.len(), 2);
    assert!(note.content[0].is(CODE_BLOCK));
    assert!(note.content[1].is(PARAGRAPH));
}

#[test]
fn test_loading_is_already_normalized() {
    let editor = editor_for("kitchen_sink.json");
    assert_eq!(editor.normalize().unwrap(), Dispatched::Unchanged);
}
