//! Error types for registry, conversion, and editing operations

use thiserror::Error;

/// Conflicts detected while assembling constructs into a registry.
///
/// These are fatal at startup: an ambiguous schema cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("node type '{0}' is declared by more than one construct")]
    DuplicateNode(String),
    #[error("mark type '{0}' is declared by more than one construct")]
    DuplicateMark(String),
    #[error("command '{0}' is declared by more than one construct")]
    DuplicateCommand(String),
    #[error("node type '{node}' refers to unknown content type '{child}'")]
    UnknownContentType { node: String, child: String },
    #[error("required node type '{0}' is not registered")]
    MissingNode(String),
}

/// Document content that does not satisfy the schema.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid content in '{node}' at {path:?}: {reason}")]
pub struct SchemaViolation {
    pub node: String,
    pub path: Vec<usize>,
    pub reason: String,
}

/// Failures of the interchange → document pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    /// No reader is registered for the token tag
    #[error("no reader registered for token '{0}'")]
    UnhandledToken(String),
    /// The token payload does not have the expected shape
    #[error("malformed '{token}' token: {reason}")]
    Malformed { token: String, reason: String },
    #[error("token '{0}' closed a node that was never opened")]
    Unbalanced(String),
    #[error("invalid interchange JSON: {0}")]
    Json(String),
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

impl ReadError {
    pub fn malformed(token: &str, reason: impl Into<String>) -> Self {
        ReadError::Malformed {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures of the document → interchange pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    #[error("no writer registered for node type '{0}'")]
    NoNodeWriter(String),
    #[error("no writer registered for mark type '{0}'")]
    NoMarkWriter(String),
    #[error("'{node}' cannot carry the text-only mark '{mark}'")]
    MarkOnAtom { node: String, mark: String },
    #[error("document is missing its '{0}' container")]
    MissingContainer(&'static str),
    #[error("unbalanced token builder: {0}")]
    Unbalanced(&'static str),
    #[error("could not encode interchange JSON: {0}")]
    Json(String),
}

/// A step that cannot be applied to the document it was given.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("no node at path {0:?}")]
    InvalidPath(Vec<usize>),
    #[error("range {from}..{to} is out of bounds for node at {path:?}")]
    InvalidRange {
        path: Vec<usize>,
        from: usize,
        to: usize,
    },
    #[error("node at {0:?} is not a textblock")]
    NotTextblock(Vec<usize>),
    #[error("'{parent}' cannot contain '{child}'")]
    ContentNotAllowed { parent: String, child: String },
    #[error("unknown type '{0}'")]
    UnknownType(String),
}

/// Failures at the conversion service boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// Message reported by the external conversion service
    #[error("conversion service failed: {0}")]
    Service(String),
    /// A write was requested before any read taught the API version
    #[error("cannot write a document before one has been read")]
    NoPriorRead,
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Failures surfaced by the editor session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("command '{0}' not found")]
    CommandNotFound(String),
    #[error(transparent)]
    Step(#[from] StepError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Write(#[from] WriteError),
}
