use crate::common::editor_for;
use panedit_core::constructs::formatting::{EMPH, STRONG};
use panedit_core::edit::Selection;
use panedit_core::{Dispatched, Mark, Node, Step, Transaction};

fn paragraph_content(editor: &panedit_core::Editor) -> Vec<Node> {
    editor.doc().node_at(&[0, 0]).unwrap().content.clone()
}

#[test]
fn test_add_mark_across_a_word() {
    let editor = editor_for("hello_world.json");
    let dispatched = editor
        .dispatch(Transaction::new().step(Step::AddMark {
            block: vec![0, 0],
            from: 0,
            to: 5,
            mark: Mark::new(EMPH),
        }))
        .unwrap();
    assert_eq!(dispatched, Dispatched::Committed);
    assert_eq!(
        paragraph_content(&editor),
        vec![
            Node::text("Hello").with_marks(vec![Mark::new(EMPH)]),
            Node::text(" "),
            Node::text("world").with_marks(vec![Mark::new(STRONG)]),
        ]
    );
}

#[test]
fn test_remove_mark_from_the_end() {
    let editor = editor_for("hello_world.json");
    editor
        .dispatch(Transaction::new().step(Step::RemoveMark {
            block: vec![0, 0],
            from: 6,
            to: 11,
            mark_type: STRONG.to_string(),
        }))
        .unwrap();
    assert_eq!(paragraph_content(&editor), vec![Node::text("Hello world")]);
}

#[test]
fn test_insert_text_at_the_end_inherits_marks() {
    let editor = editor_for("hello_world.json");
    editor
        .dispatch(Transaction::new().step(Step::InsertText {
            block: vec![0, 0],
            offset: 11,
            text: "!".to_string(),
            marks: None,
        }))
        .unwrap();
    let content = paragraph_content(&editor);
    assert_eq!(content.last().unwrap().text_str(), "world!");
    assert!(content.last().unwrap().has_mark(STRONG));
}

#[test]
fn test_replace_inline_inside_the_text() {
    let editor = editor_for("hello_world.json");
    editor
        .dispatch(Transaction::new().step(Step::ReplaceInline {
            block: vec![0, 0],
            from: 2,
            to: 4,
            nodes: vec![Node::text("LL")],
        }))
        .unwrap();
    assert_eq!(editor.doc().node_at(&[0, 0]).unwrap().text_content(), "HeLLo world");
}

#[test]
fn test_range_past_the_end_is_rejected() {
    let editor = editor_for("hello_world.json");
    let result = editor.dispatch(Transaction::new().step(Step::AddMark {
        block: vec![0, 0],
        from: 6,
        to: 12,
        mark: Mark::new(EMPH),
    }));
    assert!(result.is_err());
}

#[test]
fn test_text_selection_is_kept() {
    let editor = editor_for("hello_world.json");
    let selection = Selection::range(vec![0, 0], 0, 5);
    editor.set_selection(selection.clone());
    assert_eq!(editor.state().selection, selection);

    editor.set_selection(Selection::range(vec![0, 0], 3, 40));
    assert_eq!(editor.state().selection, Selection::cursor(vec![0, 0], 0));
}

#[test]
fn test_code_toggle_over_a_break_keeps_the_break() {
    let editor = editor_for("kitchen_sink.json");
    // The block quote's paragraph holds a line break.
    let (path, quote) = editor
        .doc()
        .find_all("blockquote")
        .into_iter()
        .map(|(path, node)| (path, node.clone()))
        .next()
        .unwrap();
    let mut block = path;
    block.push(0);
    let len = quote.content[0].content_len();
    editor
        .dispatch(Transaction::new().step(Step::AddMark {
            block: block.clone(),
            from: 0,
            to: len,
            mark: Mark::new("code"),
        }))
        .unwrap();
    let paragraph = editor.doc().node_at(&block).unwrap().clone();
    let hard_break = paragraph.content.iter().find(|n| n.is("hard_break")).unwrap();
    assert!(hard_break.marks.is_empty());
    assert!(editor.to_interchange().is_ok());
}
