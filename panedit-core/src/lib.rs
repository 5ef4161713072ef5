//! Round-trip safe editing of Pandoc documents
//!
//!     This crate maps the Pandoc JSON AST (the interchange tree) onto an editable document
//!     tree and back, and keeps the document's structural invariants as it is edited.
//!
//!     TLDR:
//!         - Never parse or render text formats here; Pandoc does that behind a ConversionService.
//!         - Every piece of markup is a construct (./constructs), contributing node and mark types,
//!           readers, writers, and commands. Adding markup means adding a construct, not touching
//!           the reader or writer.
//!         - Round trip comes first: an unknown token fails the read, a type without a writer
//!           fails the write. Nothing is silently dropped.
//!         - All edits go through the Editor, which runs the maintenance pipeline on each commit.
//!
//! Architecture
//!
//!     interchange text → [conversion service] → PandocAst → reader → document tree
//!         ↔ edits (transactions) → maintenance pipeline → document tree
//!         → writer → PandocAst → [conversion service] → interchange text
//!
//!     The file structure :
//!     .
//!     ├── pandoc               # Interchange tree (Token, PandocAst, ApiVersion) and JSON codec
//!     ├── doc                  # Document tree, attributes, inline helpers, schema
//!     ├── construct.rs         # Construct trait
//!     ├── constructs           # Built-in constructs, one per module
//!     ├── registry.rs          # Immutable construct registry
//!     ├── reader.rs            # Interchange → document
//!     ├── writer.rs            # Document → interchange
//!     ├── edit                 # Selection, Step, Transaction, change regions
//!     ├── commands             # Command type and shared per-kind behaviour, dialogs
//!     ├── transforms           # Maintenance pipeline: filters and repairs
//!     ├── session.rs           # Editor session: dispatch, history, subscribers
//!     ├── convert.rs           # Conversion service boundary, pandoc process
//!     ├── inspect.rs           # Treeviz rendering
//!     └── error.rs
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── roundtrip            # Reader/writer round trips, including a property test
//!     ├── maintenance          # Footnote, example list, trailing paragraph scenarios
//!     ├── session              # Commands, dialogs, undo through the Editor
//!     └── fixtures             # Pandoc JSON documents
//!
//!     Rust does not discover tests in subdirectories by default, so tests/lib.rs includes them.
//!
//! Core Algorithms
//!
//!     The reader (./reader.rs) and writer (./writer.rs) carry the round trip: wrapper tokens become
//!     marks on text runs and back, and footnote bodies move between inline Note tokens and the
//!     separate notes container. The writer nests marks by priority so the output only depends on
//!     the mark sets, not on the order marks were applied.
//!
//!     The maintenance pipeline (./transforms) is a pure function of the prior state and a
//!     transaction. It filters out edits that break hard constraints and appends repair steps to
//!     the same transaction, so undo treats an edit and its repairs as one.

pub mod commands;
pub mod construct;
pub mod constructs;
pub mod convert;
pub mod doc;
pub mod edit;
pub mod error;
pub mod inspect;
pub mod pandoc;
pub mod reader;
pub mod registry;
pub mod session;
pub mod transforms;
pub mod writer;

pub use commands::{Command, CommandContext, CommandKind, CommandOutcome, CommandState};
pub use construct::Construct;
#[cfg(feature = "pandoc-process")]
pub use convert::PandocProcess;
pub use convert::{ConversionService, Converter, FormatOptions, Wrap, WriterOptions};
pub use doc::{Attrs, Mark, Node, Schema};
pub use edit::{EditorState, Selection, Step, Transaction};
pub use error::{ConvertError, EditorError, ReadError, SchemaError, StepError, WriteError};
pub use pandoc::{ApiVersion, PandocAst, Token, TokenValue};
pub use reader::read_document;
pub use registry::{ConstructRegistry, RegistryBuilder};
pub use session::{Dispatched, Editor, EditorEvent, Executed};
pub use transforms::{Outcome, Pipeline};
pub use writer::write_document;
