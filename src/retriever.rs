use crate::config::{Number, DEFAULT_TOP_K};
use crate::document::SearchHit;
use crate::error::Result;
use crate::index::VectorIndex;

/// Similarity search with `k` bound up front, so the caller at query time
/// only supplies the query embedding.
#[derive(Debug, Clone, Copy)]
pub struct Retriever<'a> {
    index: &'a VectorIndex,
    k: usize,
}

impl<'a> Retriever<'a> {
    pub fn new(index: &'a VectorIndex, k: usize) -> Self {
        Self { index, k }
    }

    pub fn retrieve(&self, query: &[Number]) -> Result<Vec<SearchHit>> {
        self.index.similarity_search(query, self.k)
    }
}

impl VectorIndex {
    pub fn as_retriever(&self, k: Option<usize>) -> Retriever<'_> {
        Retriever::new(self, k.unwrap_or(DEFAULT_TOP_K))
    }
}
