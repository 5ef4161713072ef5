//! Dialog round trips
//!
//! Commands that need user input (link, image, attributes, ordered list
//! numbering) do not edit directly. They produce a [`DialogRequest`] holding
//! the props to prefill and the target the result applies to. The session
//! hands the props to a [`DialogHost`] and, once it answers, builds the edit
//! with [`apply_result`] against the state current at that moment. A cancelled
//! dialog (`None`) or a target that no longer exists produces no edit.

use crate::constructs::image::{ATTR_ALT, ATTR_SRC, IMAGE};
use crate::constructs::link::{ATTR_HREF, ATTR_TITLE, LINK};
use crate::constructs::lists::{ATTR_NUMBER_DELIM, ATTR_NUMBER_STYLE, ATTR_ORDER};
use crate::doc::{inline, Attrs, Node, PandocAttr, Path, Schema};
use crate::edit::{EditorState, Origin, Step, Transaction};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkProps {
    pub href: String,
    pub title: String,
    /// Text to insert when the link is created at an empty cursor.
    pub text: String,
    pub attr: PandocAttr,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageProps {
    pub src: String,
    pub title: String,
    pub alt: String,
    pub attr: PandocAttr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedListProps {
    pub order: i64,
    pub number_style: String,
    pub number_delim: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogProps {
    Link(LinkProps),
    Image(ImageProps),
    Attr(PandocAttr),
    OrderedList(OrderedListProps),
}

/// What a dialog resolves to; the same shape as its props.
pub type DialogResult = DialogProps;

/// Where a dialog result is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogTarget {
    Range { block: Path, from: usize, to: usize },
    Node { path: Path, node_type: String },
}

impl DialogTarget {
    /// Whether the target still exists in `doc`.
    pub fn resolves(&self, schema: &Schema, doc: &Node) -> bool {
        match self {
            DialogTarget::Range { block, from, to } => doc
                .node_at(block)
                .is_some_and(|n| schema.is_textblock(n) && from <= to && *to <= n.content_len()),
            DialogTarget::Node { path, node_type } => {
                doc.node_at(path).is_some_and(|n| n.is(node_type))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRequest {
    pub command: String,
    pub props: DialogProps,
    pub target: DialogTarget,
}

/// The interactive side of dialog commands, supplied by the embedding UI.
#[async_trait(?Send)]
pub trait DialogHost {
    async fn edit_link(&self, props: LinkProps) -> Option<LinkProps>;
    async fn edit_image(&self, props: ImageProps) -> Option<ImageProps>;
    async fn edit_attr(&self, props: PandocAttr) -> Option<PandocAttr>;
    async fn edit_ordered_list(&self, props: OrderedListProps) -> Option<OrderedListProps>;
}

/// Route props to the matching host method.
pub async fn ask(host: &dyn DialogHost, props: DialogProps) -> Option<DialogResult> {
    match props {
        DialogProps::Link(p) => host.edit_link(p).await.map(DialogProps::Link),
        DialogProps::Image(p) => host.edit_image(p).await.map(DialogProps::Image),
        DialogProps::Attr(p) => host.edit_attr(p).await.map(DialogProps::Attr),
        DialogProps::OrderedList(p) => host
            .edit_ordered_list(p)
            .await
            .map(DialogProps::OrderedList),
    }
}

pub fn link_attrs(props: &LinkProps) -> Attrs {
    props
        .attr
        .to_attrs()
        .with(ATTR_HREF, props.href.clone())
        .with(ATTR_TITLE, props.title.clone())
}

pub fn image_attrs(props: &ImageProps) -> Attrs {
    props
        .attr
        .to_attrs()
        .with(ATTR_SRC, props.src.clone())
        .with(ATTR_TITLE, props.title.clone())
        .with(ATTR_ALT, props.alt.clone())
}

/// Build the edit for a dialog result against the current state.
///
/// `None` means nothing to do: the dialog was cancelled, the target vanished,
/// or the result does not fit the target.
pub fn apply_result(
    schema: &Schema,
    state: &EditorState,
    request: &DialogRequest,
    result: Option<DialogResult>,
) -> Option<Transaction> {
    let result = result?;
    if !request.target.resolves(schema, &state.doc) {
        tracing::warn!(command = %request.command, "dialog target vanished, dropping result");
        return None;
    }
    let step = match (&request.target, result) {
        (DialogTarget::Range { block, from, to }, DialogProps::Link(props)) => {
            link_step(schema, state, block, *from, *to, &props)?
        }
        (DialogTarget::Range { block, from, to }, DialogProps::Image(props)) => Step::ReplaceInline {
            block: block.clone(),
            from: *from,
            to: *to,
            nodes: vec![schema.create(IMAGE, image_attrs(&props))],
        },
        (DialogTarget::Node { path, .. }, DialogProps::Image(props)) => {
            let node = state.doc.node_at(path)?;
            Step::SetAttrs {
                path: path.clone(),
                attrs: node.attrs.clone().merged(&image_attrs(&props)),
            }
        }
        (DialogTarget::Node { path, .. }, DialogProps::Attr(attr)) => {
            let node = state.doc.node_at(path)?;
            Step::SetAttrs {
                path: path.clone(),
                attrs: node.attrs.clone().merged(&attr.to_attrs()),
            }
        }
        (DialogTarget::Node { path, .. }, DialogProps::OrderedList(props)) => {
            let node = state.doc.node_at(path)?;
            let update = Attrs::new()
                .with(ATTR_ORDER, props.order)
                .with(ATTR_NUMBER_STYLE, props.number_style)
                .with(ATTR_NUMBER_DELIM, props.number_delim);
            Step::SetAttrs {
                path: path.clone(),
                attrs: node.attrs.clone().merged(&update),
            }
        }
        _ => return None,
    };
    Some(Transaction::new().step(step).with_origin(Origin::Dialog))
}

fn link_step(
    schema: &Schema,
    state: &EditorState,
    block: &[usize],
    from: usize,
    to: usize,
    props: &LinkProps,
) -> Option<Step> {
    let node = state.doc.node_at(block)?;
    if props.href.is_empty() {
        return (from < to).then(|| Step::RemoveMark {
            block: block.to_vec(),
            from,
            to,
            mark_type: LINK.to_string(),
        });
    }
    let mark = schema.create_mark(LINK, link_attrs(props));
    if from == to {
        if props.text.is_empty() {
            return None;
        }
        let marks = inline::marks_for_insertion(schema, &node.content, from);
        return Some(Step::InsertText {
            block: block.to_vec(),
            offset: from,
            text: props.text.clone(),
            marks: Some(schema.add_mark_to_set(&marks, &mark)),
        });
    }
    Some(Step::AddMark {
        block: block.to_vec(),
        from,
        to,
        mark,
    })
}
