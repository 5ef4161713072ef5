use crate::common::editor_for;
use panedit_core::constructs::formatting::{EMPH, STRONG};
use panedit_core::edit::Selection;
use panedit_core::inspect::to_treeviz;
use panedit_core::{CommandState, Dispatched, Editor, EditorError, Executed};

fn state_of(editor: &Editor, name: &str) -> CommandState {
    editor
        .command_states()
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no command {name}"))
}

#[test]
fn test_every_construct_contributes_commands() {
    let editor = editor_for("hello_world.json");
    let names = editor.registry().list_commands();
    for expected in ["paragraph", "heading_1", "heading_6", "strong", "link", "image", "footnote"] {
        assert!(names.iter().any(|n| n == expected), "missing command {expected}");
    }
}

#[test]
fn test_mark_state_follows_the_cursor() {
    let editor = editor_for("hello_world.json");
    editor.set_selection(Selection::cursor(vec![0, 0], 8));
    let strong = state_of(&editor, STRONG);
    assert!(strong.enabled);
    assert!(strong.active);
    assert!(!state_of(&editor, EMPH).active);

    editor.set_selection(Selection::cursor(vec![0, 0], 2));
    assert!(!state_of(&editor, STRONG).active);
}

#[test]
fn test_heading_state_in_kitchen_sink() {
    let editor = editor_for("kitchen_sink.json");
    editor.set_selection(Selection::cursor(vec![0, 0], 0));
    assert!(state_of(&editor, "heading_1").active);
    assert!(!state_of(&editor, "heading_2").active);
}

#[test]
fn test_strong_over_plain_text_joins_the_run() {
    let editor = editor_for("hello_world.json");
    editor.set_selection(Selection::range(vec![0, 0], 0, 6));
    assert_eq!(
        editor.execute(STRONG).unwrap(),
        Executed::Done(Dispatched::Committed)
    );
    insta::assert_snapshot!(to_treeviz(&editor.doc()), @r"
    ⧉ doc
    ├─ Ψ body
    │ ├─ ¶ paragraph
    │ │ └─ ◦ Hello world {strong}
    │ └─ ¶ paragraph
    └─ ☷ notes
    ");
}

#[test]
fn test_unknown_command_is_an_error() {
    let editor = editor_for("hello_world.json");
    assert_eq!(
        editor.execute("table"),
        Err(EditorError::CommandNotFound("table".to_string()))
    );
}
