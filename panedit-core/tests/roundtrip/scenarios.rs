use crate::common::{canonical_ids, load_fixture, paths_of, read_fixture, registry};
use panedit_core::constructs::code_block::CODE_BLOCK;
use panedit_core::constructs::footnote::{ATTR_NUMBER, FOOTNOTE, NOTE};
use panedit_core::constructs::heading::{ATTR_LEVEL, HEADING};
use panedit_core::constructs::lists::{ATTR_NUMBER_STYLE, ORDERED_LIST};
use panedit_core::doc::{self, Attrs, ATTR_ID};
use panedit_core::inspect::to_treeviz;
use panedit_core::pandoc::{from_json, to_json};
use panedit_core::{read_document, write_document, ApiVersion, Node, PandocAst, ReadError, WriteError};

fn write(doc: &Node, version: &ApiVersion) -> PandocAst {
    write_document(&registry(), doc, version).expect("document should write")
}

#[test]
fn test_hello_world_token_for_token() {
    let ast = load_fixture("hello_world.json");
    let doc = read_document(&registry(), &ast).unwrap();

    let paragraph = doc.node_at(&[0, 0]).unwrap();
    assert_eq!(paragraph.content.len(), 2);
    assert_eq!(paragraph.content[0].text_str(), "Hello ");
    assert!(paragraph.content[0].marks.is_empty());
    assert_eq!(paragraph.content[1].text_str(), "world");
    assert!(paragraph.content[1].has_mark("strong"));

    assert_eq!(write(&doc, &ast.api_version), ast);
}

#[test]
fn test_hello_world_json_is_stable() {
    let ast = load_fixture("hello_world.json");
    let doc = read_document(&registry(), &ast).unwrap();
    let json = to_json(&write(&doc, &ast.api_version)).unwrap();
    assert_eq!(
        json,
        r#"{"pandoc-api-version":[1,23,1],"meta":{},"blocks":[{"t":"Para","c":[{"t":"Str","c":"Hello"},{"t":"Space"},{"t":"Strong","c":[{"t":"Str","c":"world"}]}]}]}"#
    );
}

#[test]
fn test_kitchen_sink_reads_every_construct() {
    let doc = read_fixture("kitchen_sink.json");

    let heading = doc.node_at(&[0, 0]).unwrap();
    assert!(heading.is(HEADING));
    assert_eq!(heading.attrs.get_i64(ATTR_LEVEL), Some(1));
    assert_eq!(heading.attrs.get_str(ATTR_ID), Some("intro"));

    let code_block = doc.node_at(&[0, 4]).unwrap();
    assert!(code_block.is(CODE_BLOCK));
    assert_eq!(code_block.text_content(), "fn main() {}");

    let list = doc.node_at(&[0, 6]).unwrap();
    assert!(list.is(ORDERED_LIST));
    assert_eq!(list.attrs.get_str(ATTR_NUMBER_STYLE), Some("Example"));

    let notes = doc::notes(&doc).unwrap();
    assert_eq!(notes.content.len(), 1);
    assert!(notes.content[0].is(NOTE));
    assert_eq!(notes.content[0].text_content(), "A note.");

    let anchors = paths_of(&doc, FOOTNOTE);
    assert_eq!(anchors.len(), 1);
    let anchor = doc.node_at(&anchors[0]).unwrap();
    assert_eq!(anchor.attrs.get_i64(ATTR_NUMBER), Some(1));

    assert!(doc.attrs.get("meta").and_then(|m| m.get("title")).is_some());
}

#[test]
fn test_kitchen_sink_document_round_trip() {
    let ast = load_fixture("kitchen_sink.json");
    let registry = registry();
    let doc = read_document(&registry, &ast).unwrap();

    let written = write(&doc, &ast.api_version);
    let reread = read_document(&registry, &written).unwrap();
    assert_eq!(canonical_ids(&reread), canonical_ids(&doc));

    // A second pass produces the same interchange tree.
    assert_eq!(write(&reread, &ast.api_version), written);
}

#[test]
fn test_kitchen_sink_keeps_meta_and_version() {
    let ast = load_fixture("kitchen_sink.json");
    let doc = read_document(&registry(), &ast).unwrap();
    let written = write(&doc, &ast.api_version);
    assert_eq!(written.api_version, ApiVersion::new(&[1, 23, 1]));
    assert_eq!(written.meta, ast.meta);
}

#[test]
fn test_footnote_bodies_move_to_notes_and_back() {
    let ast = load_fixture("footnotes.json");
    let doc = read_document(&registry(), &ast).unwrap();

    let notes = doc::notes(&doc).unwrap();
    let texts: Vec<String> = notes.content.iter().map(Node::text_content).collect();
    assert_eq!(texts, vec!["one", "two"]);
    assert_eq!(write(&doc, &ast.api_version), ast);
}

#[test]
fn test_unknown_token_fails_the_read() {
    let ast = from_json(
        r#"{"pandoc-api-version":[1,23,1],"meta":{},"blocks":[{"t":"Table","c":[]}]}"#,
    )
    .unwrap();
    assert_eq!(
        read_document(&registry(), &ast),
        Err(ReadError::UnhandledToken("Table".to_string()))
    );
}

#[test]
fn test_nested_note_fails_the_read() {
    let ast = from_json(
        r#"{"pandoc-api-version":[1,23,1],"meta":{},"blocks":[{"t":"Para","c":[{"t":"Note","c":[{"t":"Para","c":[{"t":"Note","c":[]}]}]}]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        read_document(&registry(), &ast),
        Err(ReadError::Malformed { .. })
    ));
}

#[test]
fn test_type_without_writer_fails_the_write() {
    let registry = registry();
    let mut doc = read_fixture("hello_world.json");
    let body = doc.node_at_mut(&doc::BODY_PATH).unwrap();
    body.content.push(Node::new("table").with_attrs(Attrs::new()));
    assert_eq!(
        write_document(&registry, &doc, &ApiVersion::new(&[1, 23, 1])),
        Err(WriteError::NoNodeWriter("table".to_string()))
    );
}

#[test]
fn test_empty_document_reads_as_one_paragraph() {
    let ast = from_json(r#"{"pandoc-api-version":[1,23,1],"meta":{},"blocks":[]}"#).unwrap();
    let doc = read_document(&registry(), &ast).unwrap();
    insta::assert_snapshot!(to_treeviz(&doc), @r"
    ⧉ doc
    ├─ Ψ body
    │ └─ ¶ paragraph
    └─ ☷ notes
    ");
}
