use crate::common::editor_for;
use async_trait::async_trait;
use panedit_core::commands::dialogs::{ImageProps, LinkProps, OrderedListProps};
use panedit_core::commands::{DialogHost, DialogProps, DialogTarget};
use panedit_core::constructs::attributes::ATTRIBUTES;
use panedit_core::constructs::link::{ATTR_HREF, LINK};
use panedit_core::constructs::lists::{ATTR_ORDER, ORDERED_LIST};
use panedit_core::doc::{Attrs, PandocAttr, ATTR_CLASSES};
use panedit_core::edit::Selection;
use panedit_core::{Dispatched, Executed, Node, Step, Transaction};
use std::cell::RefCell;

/// Answers every dialog with a fixed link, or cancels.
#[derive(Default)]
struct ScriptedHost {
    href: Option<String>,
    seen: RefCell<Vec<LinkProps>>,
}

#[async_trait(?Send)]
impl DialogHost for ScriptedHost {
    async fn edit_link(&self, props: LinkProps) -> Option<LinkProps> {
        self.seen.borrow_mut().push(props.clone());
        let href = self.href.clone()?;
        Some(LinkProps { href, ..props })
    }

    async fn edit_image(&self, _props: ImageProps) -> Option<ImageProps> {
        None
    }

    async fn edit_attr(&self, _props: PandocAttr) -> Option<PandocAttr> {
        None
    }

    async fn edit_ordered_list(&self, _props: OrderedListProps) -> Option<OrderedListProps> {
        None
    }
}

fn world(doc: &Node) -> Node {
    doc.node_at(&[0, 0]).unwrap().content[1].clone()
}

#[tokio::test]
async fn test_link_dialog_applies_result() {
    let editor = editor_for("hello_world.json");
    editor.set_selection(Selection::range(vec![0, 0], 6, 11));
    let host = ScriptedHost {
        href: Some("https://example.com".to_string()),
        ..Default::default()
    };

    let dispatched = editor.run_command(LINK, &host).await.unwrap();
    assert_eq!(dispatched, Dispatched::Committed);
    assert_eq!(host.seen.borrow()[0].text, "world");

    let node = world(&editor.doc());
    let link = node.marks.iter().find(|m| m.is(LINK)).expect("link mark");
    assert_eq!(link.attrs.get_str(ATTR_HREF), Some("https://example.com"));
    assert!(node.has_mark("strong"));
}

#[tokio::test]
async fn test_cancelled_dialog_changes_nothing() {
    let editor = editor_for("hello_world.json");
    editor.set_selection(Selection::range(vec![0, 0], 6, 11));
    let before = editor.doc();

    let dispatched = editor
        .run_command(LINK, &ScriptedHost::default())
        .await
        .unwrap();
    assert_eq!(dispatched, Dispatched::Unchanged);
    assert_eq!(editor.doc(), before);
    assert!(!editor.can_undo());
}

#[test]
fn test_result_for_vanished_target_is_dropped() {
    let editor = editor_for("hello_world.json");
    editor.set_selection(Selection::range(vec![0, 0], 6, 11));
    let Executed::Dialog(request) = editor.execute(LINK).unwrap() else {
        panic!("link should open a dialog");
    };
    assert!(matches!(request.target, DialogTarget::Range { .. }));

    // The paragraph is replaced while the dialog is open.
    let rule = editor
        .registry()
        .schema()
        .create("horizontal_rule", Attrs::new());
    editor
        .dispatch(Transaction::new().step(Step::Replace {
            parent: vec![0],
            from: 0,
            to: 1,
            nodes: vec![rule],
        }))
        .unwrap();
    let before = editor.doc();

    let result = DialogProps::Link(LinkProps {
        href: "https://example.com".to_string(),
        ..LinkProps::default()
    });
    assert_eq!(
        editor.complete_dialog(&request, Some(result)).unwrap(),
        Dispatched::Unchanged
    );
    assert_eq!(editor.doc(), before);
}

#[test]
fn test_attributes_dialog_edits_the_heading() {
    let editor = editor_for("kitchen_sink.json");
    editor.set_selection(Selection::cursor(vec![0, 0], 3));
    let Executed::Dialog(request) = editor.execute(ATTRIBUTES).unwrap() else {
        panic!("attributes should open a dialog");
    };
    let DialogProps::Attr(mut attr) = request.props.clone() else {
        panic!("expected attribute props");
    };
    assert_eq!(attr.id, "intro");

    attr.classes.push("unnumbered".to_string());
    assert_eq!(
        editor
            .complete_dialog(&request, Some(DialogProps::Attr(attr)))
            .unwrap(),
        Dispatched::Committed
    );
    let doc = editor.doc();
    let heading = doc.node_at(&[0, 0]).unwrap();
    assert_eq!(
        heading.attrs.get(ATTR_CLASSES),
        Some(&serde_json::json!(["unnumbered"]))
    );
    assert_eq!(heading.attrs.get_str("id"), Some("intro"));
}

#[test]
fn test_ordered_list_dialog_prefills_current_numbering() {
    let editor = editor_for("example_lists.json");
    editor.set_selection(Selection::cursor(vec![0, 2, 0, 0], 0));
    let Executed::Dialog(request) = editor.execute("ordered_list_attrs").unwrap() else {
        panic!("ordered list attributes should open a dialog");
    };
    let DialogProps::OrderedList(props) = &request.props else {
        panic!("expected ordered list props");
    };
    assert_eq!(props.order, 4);
    assert_eq!(props.number_style, "Example");

    let doc = editor.doc();
    let DialogTarget::Node { path, node_type } = &request.target else {
        panic!("expected a node target");
    };
    assert_eq!(node_type, ORDERED_LIST);
    assert_eq!(doc.node_at(path).unwrap().attrs.get_i64(ATTR_ORDER), Some(4));
}
