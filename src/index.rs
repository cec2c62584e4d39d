use crate::config::Number;
use crate::document::{Document, IndexEntry, SearchHit};
use crate::error::{Error, Result};
use crate::vector_ops::compute_cosine_similarity_simd;
use rayon::prelude::*;

/// Exhaustive cosine-similarity index over an append-only list of entries.
///
/// Every embedding shares the width fixed by the first batch added; an index
/// with no entries has no width yet and answers every query with no hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an index from previously validated entries.
    pub(crate) fn from_parts(entries: Vec<IndexEntry>, dimension: Option<usize>) -> Self {
        Self { entries, dimension }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Appends `documents[i]` with `embeddings[i]`, in order.
    ///
    /// The whole batch is validated before anything is appended, so a
    /// rejected batch leaves the index untouched.
    pub fn add(&mut self, documents: Vec<Document>, embeddings: Vec<Vec<Number>>) -> Result<()> {
        if documents.len() != embeddings.len() {
            return Err(Error::DimensionMismatch {
                what: "embedding count",
                expected: documents.len(),
                actual: embeddings.len(),
            });
        }

        let Some(first) = embeddings.first() else {
            return Ok(());
        };
        let dimension = self.dimension.unwrap_or(first.len());
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(Error::DimensionMismatch {
                what: "embedding width",
                expected: dimension,
                actual: bad.len(),
            });
        }

        self.dimension = Some(dimension);
        self.entries.reserve(documents.len());
        self.entries.extend(
            documents
                .into_iter()
                .zip(embeddings)
                .map(|(document, embedding)| IndexEntry {
                    embedding,
                    metadata: document.metadata.clone(),
                    document,
                }),
        );
        Ok(())
    }

    /// Returns up to `k` entries ranked by descending cosine similarity to
    /// `query`. Equal scores keep insertion order.
    pub fn similarity_search(&self, query: &[Number], k: usize) -> Result<Vec<SearchHit>> {
        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != dimension {
            return Err(Error::DimensionMismatch {
                what: "query embedding width",
                expected: dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, Number)> = self
            .entries
            .par_iter()
            .enumerate()
            .map(|(position, entry)| {
                (position, compute_cosine_similarity_simd(query, &entry.embedding))
            })
            .collect();

        sort_and_limit_results(&mut scored, k);

        Ok(scored
            .into_iter()
            .map(|(position, similarity)| {
                let entry = &self.entries[position];
                SearchHit {
                    similarity,
                    position,
                    document: entry.document.clone(),
                    metadata: entry.metadata.clone(),
                }
            })
            .collect())
    }
}

fn sort_and_limit_results(results: &mut Vec<(usize, Number)>, limit: usize) {
    // `sort_by` is stable, which keeps ties in insertion order.
    results.sort_by(|a, b| b.1.total_cmp(&a.1));
    results.truncate(limit);
}
