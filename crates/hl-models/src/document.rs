//! Highlights document returned by the metadata API.
//!
//! No schema is assumed. The document is kept as a tree of maps, sequences
//! and scalars so selection can walk whatever shape the provider returns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// An arbitrarily nested highlights document.
///
/// Map entries are kept in key order, so traversal order over a map is
/// sorted by key rather than the order the provider sent them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum HighlightsDocument {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<HighlightsDocument>),
    Map(BTreeMap<String, HighlightsDocument>),
}

impl HighlightsDocument {
    /// Parse a document from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Serialize as pretty-printed JSON for archiving.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(&Value::from(self.clone()))
    }

    /// Borrow the string value if this node is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HighlightsDocument::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            HighlightsDocument::Null => true,
            HighlightsDocument::Sequence(items) => items.is_empty(),
            HighlightsDocument::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }
}

impl From<Value> for HighlightsDocument {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HighlightsDocument::Null,
            Value::Bool(b) => HighlightsDocument::Bool(b),
            Value::Number(n) => HighlightsDocument::Number(n),
            Value::String(s) => HighlightsDocument::String(s),
            Value::Array(items) => {
                HighlightsDocument::Sequence(items.into_iter().map(Self::from).collect())
            }
            Value::Object(entries) => HighlightsDocument::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<HighlightsDocument> for Value {
    fn from(doc: HighlightsDocument) -> Self {
        match doc {
            HighlightsDocument::Null => Value::Null,
            HighlightsDocument::Bool(b) => Value::Bool(b),
            HighlightsDocument::Number(n) => Value::Number(n),
            HighlightsDocument::String(s) => Value::String(s),
            HighlightsDocument::Sequence(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            HighlightsDocument::Map(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
