use crate::common::editor_for;
use panedit_core::constructs::lists::{ATTR_ORDER, ORDERED_LIST};
use panedit_core::{Dispatched, Editor, Step, Transaction};

fn orders(editor: &Editor) -> Vec<Option<i64>> {
    let doc = editor.doc();
    doc.find_all(ORDERED_LIST)
        .iter()
        .map(|(_, list)| list.attrs.get_i64(ATTR_ORDER))
        .collect()
}

#[test]
fn test_example_lists_continue_numbering() {
    let editor = editor_for("example_lists.json");
    assert_eq!(orders(&editor), vec![Some(1), Some(4)]);
}

#[test]
fn test_removing_items_renumbers_later_lists() {
    let editor = editor_for("example_lists.json");
    let dispatched = editor
        .dispatch(Transaction::new().step(Step::Replace {
            parent: vec![0, 0],
            from: 0,
            to: 1,
            nodes: vec![],
        }))
        .unwrap();
    assert_eq!(dispatched, Dispatched::Committed);
    assert_eq!(orders(&editor), vec![Some(1), Some(3)]);
}

#[test]
fn test_removing_the_first_list_restarts_at_one() {
    let editor = editor_for("example_lists.json");
    editor
        .dispatch(Transaction::new().step(Step::Replace {
            parent: vec![0],
            from: 0,
            to: 1,
            nodes: vec![],
        }))
        .unwrap();
    assert_eq!(orders(&editor), vec![Some(1)]);
}

#[test]
fn test_undo_restores_numbering_with_the_edit() {
    let editor = editor_for("example_lists.json");
    editor
        .dispatch(Transaction::new().step(Step::Replace {
            parent: vec![0],
            from: 0,
            to: 1,
            nodes: vec![],
        }))
        .unwrap();
    assert!(editor.undo());
    assert_eq!(orders(&editor), vec![Some(1), Some(4)]);
}
