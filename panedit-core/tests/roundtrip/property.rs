//! Generated documents survive document → interchange → document.

use crate::common::{canonical_ids, registry};
use panedit_core::constructs::blockquote::BLOCKQUOTE;
use panedit_core::constructs::code::CODE;
use panedit_core::constructs::code_block::CODE_BLOCK;
use panedit_core::constructs::footnote::{footnote_node, note_node};
use panedit_core::constructs::formatting::{EMPH, SMALLCAPS, STRIKEOUT, STRONG, UNDERLINE};
use panedit_core::constructs::hard_break::HARD_BREAK;
use panedit_core::constructs::heading::{ATTR_LEVEL, HEADING};
use panedit_core::constructs::horizontal_rule::HORIZONTAL_RULE;
use panedit_core::constructs::image::{ATTR_ALT, ATTR_SRC, IMAGE};
use panedit_core::constructs::link::{ATTR_HREF, LINK};
use panedit_core::constructs::lists::{
    ATTR_NUMBER_DELIM, ATTR_NUMBER_STYLE, ATTR_ORDER, ATTR_TIGHT, BULLET_LIST, LIST_ITEM,
    ORDERED_LIST,
};
use panedit_core::constructs::paragraph::PARAGRAPH;
use panedit_core::doc::{inline, Attrs, Mark, Schema, BODY, DOC, NOTES};
use panedit_core::{read_document, write_document, ApiVersion, Node};
use proptest::prelude::*;

const MARKS: [&str; 6] = [EMPH, STRONG, STRIKEOUT, SMALLCAPS, UNDERLINE, CODE];
const HREFS: [&str; 2] = ["https://pandoc.org", "https://example.com/a b"];
const STYLES: [&str; 4] = ["DefaultStyle", "Decimal", "LowerAlpha", "Example"];
const DELIMS: [&str; 3] = ["DefaultDelim", "Period", "OneParen"];

/// Formatting flags (one per entry of `MARKS`) and an optional link target.
#[derive(Debug, Clone)]
struct Marks {
    formatting: Vec<bool>,
    link: Option<usize>,
}

#[derive(Debug, Clone)]
enum Inline {
    Text {
        words: Vec<String>,
        trailing_space: bool,
        marks: Marks,
    },
    Image {
        alt: Vec<String>,
        src: String,
        marks: Marks,
    },
    Break(Marks),
    /// An anchor whose note holds one paragraph per entry.
    Footnote(Vec<Vec<String>>, Marks),
}

#[derive(Debug, Clone)]
enum Block {
    Paragraph(Vec<Inline>),
    Heading(i64, Vec<Inline>),
    CodeBlock(Vec<String>),
    Rule,
    Quote(Vec<Block>),
    /// Items of paragraphs; `None` for a bullet list, else (order, style, delim).
    List {
        ordered: Option<(i64, usize, usize)>,
        tight: bool,
        items: Vec<Vec<Vec<Inline>>>,
    },
}

fn words(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 1..max)
}

fn marks_strategy() -> impl Strategy<Value = Marks> {
    (
        prop::collection::vec(any::<bool>(), MARKS.len()),
        prop::option::weighted(0.3, 0..HREFS.len()),
    )
        .prop_map(|(formatting, link)| Marks { formatting, link })
}

fn inline_strategy() -> impl Strategy<Value = Inline> {
    prop_oneof![
        6 => (words(4), any::<bool>(), marks_strategy()).prop_map(|(words, trailing_space, marks)| {
            Inline::Text { words, trailing_space, marks }
        }),
        1 => (words(3), "[a-z]{1,8}\\.png", marks_strategy())
            .prop_map(|(alt, src, marks)| Inline::Image { alt, src, marks }),
        1 => marks_strategy().prop_map(Inline::Break),
        1 => (prop::collection::vec(words(4), 1..3), marks_strategy())
            .prop_map(|(note, marks)| Inline::Footnote(note, marks)),
    ]
}

fn inlines() -> impl Strategy<Value = Vec<Inline>> {
    prop::collection::vec(inline_strategy(), 1..6)
}

fn leaf_block_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        4 => inlines().prop_map(Block::Paragraph),
        2 => (1i64..7, inlines()).prop_map(|(level, content)| Block::Heading(level, content)),
        1 => prop::collection::vec("[a-z =;]{1,12}", 1..4).prop_map(Block::CodeBlock),
        1 => Just(Block::Rule),
    ]
}

fn list_strategy() -> impl Strategy<Value = Block> {
    (
        prop::option::of((1i64..20, 0..STYLES.len(), 0..DELIMS.len())),
        any::<bool>(),
        prop::collection::vec(prop::collection::vec(inlines(), 1..3), 1..4),
    )
        .prop_map(|(ordered, tight, items)| Block::List { ordered, tight, items })
}

fn block_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        6 => leaf_block_strategy(),
        1 => prop::collection::vec(leaf_block_strategy(), 1..3).prop_map(Block::Quote),
        2 => list_strategy(),
    ]
}

/// Builds the document the reader is expected to produce, numbering notes in
/// document order as it goes.
struct Builder<'a> {
    schema: &'a Schema,
    notes: Vec<Node>,
}

impl Builder<'_> {
    fn marks_for(&self, marks: &Marks, node: &Node) -> Vec<Mark> {
        let formatting = MARKS
            .iter()
            .zip(&marks.formatting)
            .filter(|(_, on)| **on)
            .map(|(name, _)| self.schema.create_mark(name, Attrs::new()));
        let link = marks
            .link
            .map(|i| self.schema.create_mark(LINK, Attrs::new().with(ATTR_HREF, HREFS[i])));
        formatting
            .chain(link)
            .filter(|mark| self.schema.mark_allowed_on(&mark.mark_type, node))
            .fold(Vec::new(), |set, mark| self.schema.add_mark_to_set(&set, &mark))
    }

    fn paragraph_of(&self, words: &[String]) -> Node {
        self.schema
            .create(PARAGRAPH, Attrs::new())
            .with_content(vec![Node::text(words.join(" "))])
    }

    fn inline(&mut self, inline: &Inline) -> Node {
        let (node, marks) = match inline {
            Inline::Text {
                words,
                trailing_space,
                marks,
            } => {
                let mut text = words.join(" ");
                if *trailing_space {
                    text.push(' ');
                }
                (Node::text(text), marks)
            }
            Inline::Image { alt, src, marks } => {
                let attrs = Attrs::new()
                    .with(ATTR_SRC, src.as_str())
                    .with(ATTR_ALT, alt.join(" "));
                (self.schema.create(IMAGE, attrs), marks)
            }
            Inline::Break(marks) => (self.schema.create(HARD_BREAK, Attrs::new()), marks),
            Inline::Footnote(paragraphs, marks) => {
                let number = self.notes.len() as i64 + 1;
                let id = format!("note-{number}");
                let content: Vec<Node> = paragraphs.iter().map(|p| self.paragraph_of(p)).collect();
                let anchor = footnote_node(self.schema, &id, number, &content);
                self.notes.push(note_node(self.schema, &id, number, content));
                (anchor, marks)
            }
        };
        let marks = self.marks_for(marks, &node);
        node.with_marks(marks)
    }

    fn textblock(&mut self, node_type: &str, attrs: Attrs, content: &[Inline]) -> Node {
        let content = content.iter().map(|i| self.inline(i)).collect();
        self.schema
            .create(node_type, attrs)
            .with_content(inline::normalize(content))
    }

    fn block(&mut self, block: &Block) -> Node {
        match block {
            Block::Paragraph(content) => self.textblock(PARAGRAPH, Attrs::new(), content),
            Block::Heading(level, content) => {
                self.textblock(HEADING, Attrs::new().with(ATTR_LEVEL, *level), content)
            }
            Block::CodeBlock(lines) => self
                .schema
                .create(CODE_BLOCK, Attrs::new())
                .with_content(vec![Node::text(lines.join("\n"))]),
            Block::Rule => self.schema.create(HORIZONTAL_RULE, Attrs::new()),
            Block::Quote(blocks) => {
                let content = blocks.iter().map(|b| self.block(b)).collect();
                self.schema.create(BLOCKQUOTE, Attrs::new()).with_content(content)
            }
            Block::List {
                ordered,
                tight,
                items,
            } => {
                let (node_type, attrs) = match ordered {
                    Some((order, style, delim)) => (
                        ORDERED_LIST,
                        Attrs::new()
                            .with(ATTR_ORDER, *order)
                            .with(ATTR_NUMBER_STYLE, STYLES[*style])
                            .with(ATTR_NUMBER_DELIM, DELIMS[*delim]),
                    ),
                    None => (BULLET_LIST, Attrs::new()),
                };
                let items = items
                    .iter()
                    .map(|paragraphs| {
                        let content = paragraphs
                            .iter()
                            .map(|p| self.textblock(PARAGRAPH, Attrs::new(), p))
                            .collect();
                        self.schema.create(LIST_ITEM, Attrs::new()).with_content(content)
                    })
                    .collect();
                self.schema
                    .create(node_type, attrs.with(ATTR_TIGHT, *tight))
                    .with_content(items)
            }
        }
    }
}

fn build_doc(schema: &Schema, blocks: &[Block]) -> Node {
    let mut builder = Builder {
        schema,
        notes: Vec::new(),
    };
    let content = blocks.iter().map(|b| builder.block(b)).collect();
    let body = schema.create(BODY, Attrs::new()).with_content(content);
    let notes = schema.create(NOTES, Attrs::new()).with_content(builder.notes);
    schema
        .create(DOC, Attrs::new().with("meta", serde_json::json!({})))
        .with_content(vec![body, notes])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_document_survives_round_trip(blocks in prop::collection::vec(block_strategy(), 1..5)) {
        let registry = registry();
        let doc = build_doc(registry.schema(), &blocks);
        prop_assert!(registry.schema().check(&doc).is_ok());
        let ast = write_document(&registry, &doc, &ApiVersion::new(&[1, 23, 1])).unwrap();
        let reread = read_document(&registry, &ast).unwrap();
        prop_assert_eq!(canonical_ids(&reread), canonical_ids(&doc));
    }
}
