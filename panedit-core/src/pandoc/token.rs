//! Token model for the Pandoc JSON AST
//!
//! A token is `{"t": tag, "c": payload}`. The payload is absent for leaf tokens
//! such as `Space`, a scalar for `Str`, and an array for everything else. The
//! array elements are the token's children: nested tokens, strings, numbers, or
//! further arrays (attribute triples, link targets, list items).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One tagged interchange token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub t: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<Box<TokenValue>>,
}

/// A child value inside a token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Token(Token),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<TokenValue>),
}

impl Token {
    /// A token without payload (`Space`, `HorizontalRule`, ...)
    pub fn new(t: impl Into<String>) -> Self {
        Token {
            t: t.into(),
            c: None,
        }
    }

    /// A token whose payload is an array of children
    pub fn with_children(t: impl Into<String>, children: Vec<TokenValue>) -> Self {
        Token {
            t: t.into(),
            c: Some(Box::new(TokenValue::Array(children))),
        }
    }

    /// A token whose payload is a single scalar (`Str`)
    pub fn with_value(t: impl Into<String>, value: TokenValue) -> Self {
        Token {
            t: t.into(),
            c: Some(Box::new(value)),
        }
    }

    pub fn str(text: impl Into<String>) -> Self {
        Token::with_value(super::tag::STR, TokenValue::Str(text.into()))
    }

    /// The ordered children of this token.
    pub fn children(&self) -> &[TokenValue] {
        match self.c.as_deref() {
            None => &[],
            Some(TokenValue::Array(items)) => items,
            Some(scalar) => std::slice::from_ref(scalar),
        }
    }

    pub fn child(&self, index: usize) -> Option<&TokenValue> {
        self.children().get(index)
    }

    /// The child at `index` as an array, e.g. the inline list of a `Header`.
    pub fn array_at(&self, index: usize) -> Option<&[TokenValue]> {
        self.child(index).and_then(TokenValue::as_array)
    }

    pub fn str_at(&self, index: usize) -> Option<&str> {
        self.child(index).and_then(TokenValue::as_str)
    }

    pub fn int_at(&self, index: usize) -> Option<i64> {
        self.child(index).and_then(TokenValue::as_i64)
    }
}

impl TokenValue {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            TokenValue::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TokenValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TokenValue]> {
        match self {
            TokenValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Token> for TokenValue {
    fn from(token: Token) -> Self {
        TokenValue::Token(token)
    }
}

impl From<&str> for TokenValue {
    fn from(s: &str) -> Self {
        TokenValue::Str(s.to_string())
    }
}

impl From<String> for TokenValue {
    fn from(s: String) -> Self {
        TokenValue::Str(s)
    }
}

impl From<i64> for TokenValue {
    fn from(n: i64) -> Self {
        TokenValue::Int(n)
    }
}

/// The `pandoc-api-version` tag of an interchange tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiVersion(pub Vec<u32>);

impl ApiVersion {
    pub fn new(parts: &[u32]) -> Self {
        ApiVersion(parts.to_vec())
    }

    /// Compares component-wise, treating missing trailing components as zero.
    pub fn at_least(&self, parts: &[u32]) -> bool {
        let len = self.0.len().max(parts.len());
        for i in 0..len {
            let ours = self.0.get(i).copied().unwrap_or(0);
            let theirs = parts.get(i).copied().unwrap_or(0);
            if ours != theirs {
                return ours > theirs;
            }
        }
        true
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Root of an interchange tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PandocAst {
    #[serde(rename = "pandoc-api-version")]
    pub api_version: ApiVersion,
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
    pub blocks: Vec<Token>,
}

impl PandocAst {
    pub fn new(api_version: ApiVersion, blocks: Vec<Token>) -> Self {
        PandocAst {
            api_version,
            meta: serde_json::Map::new(),
            blocks,
        }
    }
}
