use crate::common::{editor_for, paths_of};
use panedit_core::constructs::footnote::{
    snapshot_blocks, ATTR_CONTENT, ATTR_NOTE_ID, ATTR_NOTE_NUMBER, ATTR_NUMBER, ATTR_REF,
    FOOTNOTE,
};
use panedit_core::doc::{self, Attrs, Node};
use panedit_core::edit::Selection;
use panedit_core::{Dispatched, Editor, Executed, Step, Transaction};

fn pasted_anchor(reference: &str, content: &str) -> Node {
    Node::new(FOOTNOTE).with_attrs(
        Attrs::new()
            .with(ATTR_REF, reference)
            .with(ATTR_NUMBER, 0)
            .with(ATTR_CONTENT, content),
    )
}

fn anchors(editor: &Editor) -> Vec<Node> {
    let doc = editor.doc();
    paths_of(&doc, FOOTNOTE)
        .iter()
        .filter_map(|path| doc.node_at(path).cloned())
        .collect()
}

fn note_for(doc: &Node, id: &str) -> Option<Node> {
    doc::notes(doc)?
        .content
        .iter()
        .find(|note| note.attrs.get_str(ATTR_NOTE_ID) == Some(id))
        .cloned()
}

fn insert_at(editor: &Editor, block: Vec<usize>, offset: usize, node: Node) -> Dispatched {
    editor
        .dispatch(Transaction::new().step(Step::ReplaceInline {
            block,
            from: offset,
            to: offset,
            nodes: vec![node],
        }))
        .unwrap()
}

#[test]
fn test_pasted_anchor_without_note_gets_one_from_snapshot() {
    let editor = editor_for("hello_world.json");
    let snapshot = r#"[{"type":"paragraph","content":[{"type":"text","text":"note text"}]}]"#;
    assert_eq!(
        insert_at(&editor, vec![0, 0], 5, pasted_anchor("a", snapshot)),
        Dispatched::Committed
    );

    let doc = editor.doc();
    let note = note_for(&doc, "a").expect("note should be synthesized");
    assert_eq!(note.attrs.get_i64(ATTR_NOTE_NUMBER), Some(1));
    assert_eq!(note.content[0].text_content(), "note text");
    assert_eq!(anchors(&editor)[0].attrs.get_i64(ATTR_NUMBER), Some(1));
}

#[test]
fn test_numbers_follow_anchor_order_after_deletion() {
    let editor = editor_for("footnotes.json");
    let before = anchors(&editor);
    assert_eq!(before.len(), 2);
    let second_ref = before[1].attrs.get_str(ATTR_REF).unwrap().to_string();

    // "First" is five characters; the first anchor sits right after it.
    let dispatched = editor
        .dispatch(Transaction::new().step(Step::ReplaceInline {
            block: vec![0, 0],
            from: 5,
            to: 6,
            nodes: vec![],
        }))
        .unwrap();
    assert_eq!(dispatched, Dispatched::Committed);

    let after = anchors(&editor);
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].attrs.get_i64(ATTR_NUMBER), Some(1));
    let note = note_for(&editor.doc(), &second_ref).unwrap();
    assert_eq!(note.attrs.get_i64(ATTR_NOTE_NUMBER), Some(1));
    assert_eq!(note.content[0].text_content(), "two");
}

#[test]
fn test_copied_anchor_gets_its_own_note() {
    let editor = editor_for("footnotes.json");
    let first = anchors(&editor)[0].clone();
    let first_ref = first.attrs.get_str(ATTR_REF).unwrap().to_string();

    insert_at(&editor, vec![0, 0], 0, first);

    let refs: Vec<String> = anchors(&editor)
        .iter()
        .map(|a| a.attrs.get_str(ATTR_REF).unwrap().to_string())
        .collect();
    assert_eq!(refs.len(), 3);
    assert_eq!(refs.iter().filter(|r| **r == first_ref).count(), 1);

    let doc = editor.doc();
    for reference in &refs {
        assert!(note_for(&doc, reference).is_some(), "anchor {reference} has no note");
    }
    let numbers: Vec<Option<i64>> = anchors(&editor)
        .iter()
        .map(|a| a.attrs.get_i64(ATTR_NUMBER))
        .collect();
    assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn test_editing_a_note_refreshes_the_anchor_snapshot() {
    let editor = editor_for("footnotes.json");
    let dispatched = editor
        .dispatch(Transaction::new().step(Step::InsertText {
            block: vec![1, 0, 0],
            offset: 3,
            text: "!".to_string(),
            marks: None,
        }))
        .unwrap();
    assert_eq!(dispatched, Dispatched::Committed);

    let anchor = &anchors(&editor)[0];
    let registry = editor.registry();
    let blocks = snapshot_blocks(registry.schema(), anchor.attrs.get_str(ATTR_CONTENT).unwrap());
    assert_eq!(blocks[0].text_content(), "one!");
}

#[test]
fn test_footnote_inside_note_is_rejected() {
    let editor = editor_for("footnotes.json");
    let before = editor.doc();
    let dispatched = insert_at(&editor, vec![1, 0, 0], 0, pasted_anchor("x", ""));
    assert_eq!(
        dispatched,
        Dispatched::Rejected {
            filter: "no_footnote_in_note".to_string()
        }
    );
    assert_eq!(editor.doc(), before);
    assert!(!editor.can_undo());
}

#[test]
fn test_footnote_command_moves_into_the_new_note() {
    let editor = editor_for("hello_world.json");
    editor.set_selection(Selection::cursor(vec![0, 0], 5));
    assert_eq!(
        editor.execute(FOOTNOTE).unwrap(),
        Executed::Done(Dispatched::Committed)
    );

    let state = editor.state();
    let notes = doc::notes(&state.doc).unwrap();
    assert_eq!(notes.content.len(), 1);
    assert_eq!(state.selection.start_path(), &[1, 0, 0]);
}

#[test]
fn test_footnote_command_is_disabled_inside_a_note() {
    let editor = editor_for("footnotes.json");
    editor.set_selection(Selection::cursor(vec![1, 0, 0], 0));
    assert_eq!(editor.execute(FOOTNOTE).unwrap(), Executed::Disabled);
}

#[test]
fn test_selecting_an_anchor_moves_into_its_note() {
    let editor = editor_for("footnotes.json");
    let second = paths_of(&editor.doc(), FOOTNOTE)[1].clone();
    assert_eq!(second, vec![0, 0, 3]);
    let reference = anchors(&editor)[1]
        .attrs
        .get_str(ATTR_REF)
        .unwrap()
        .to_string();

    assert_eq!(
        editor
            .dispatch(Transaction::new().with_selection(Selection::node(second)))
            .unwrap(),
        Dispatched::Committed
    );

    let state = editor.state();
    let notes = doc::notes(&state.doc).unwrap();
    let index = notes
        .content
        .iter()
        .position(|note| note.attrs.get_str(ATTR_NOTE_ID) == Some(reference.as_str()))
        .unwrap();
    assert_eq!(index, 1);
    assert_eq!(state.selection, Selection::cursor(vec![1, index, 0], 0));
    assert_eq!(notes.content[index].text_content(), "two");
}

#[test]
fn test_body_cursor_is_not_moved_into_a_note() {
    let editor = editor_for("footnotes.json");
    editor
        .dispatch(Transaction::new().with_selection(Selection::cursor(vec![0, 0], 2)))
        .unwrap();
    assert_eq!(editor.state().selection, Selection::cursor(vec![0, 0], 2));
}

#[test]
fn test_restored_note_never_holds_a_footnote() {
    let editor = editor_for("hello_world.json");
    let snapshot = r#"[{"type":"paragraph","content":[{"type":"text","text":"outer"},{"type":"footnote","attrs":{"ref":"inner","number":1,"content":"x"}}]}]"#;
    assert_eq!(
        insert_at(&editor, vec![0, 0], 5, pasted_anchor("a", snapshot)),
        Dispatched::Committed
    );

    let doc = editor.doc();
    let note = note_for(&doc, "a").expect("note should be synthesized");
    assert!(!note.contains_type(FOOTNOTE));
    assert_eq!(note.content[0].text_content(), "outer");
    assert_eq!(anchors(&editor).len(), 1);
}
