use crate::config::Number;
use serde::{Deserialize, Serialize};

/// Free-form attributes attached to a document (source file, chunk offset, ...).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A chunk of text plus its source attributes. The index stores it verbatim
/// and never interprets it beyond copying `metadata` at insertion time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Document {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// One stored unit of a `VectorIndex`. Its position in the index is its identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub embedding: Vec<Number>,
    pub document: Document,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub similarity: Number,
    pub position: usize,
    pub document: Document,
    pub metadata: Metadata,
}
