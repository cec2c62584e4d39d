//! # ragdex
//!
//! Retrieval core of a question-answering service over uploaded text files.
//!
//! ```text
//! document ──> TextSplitter ──> Embedder ──> VectorIndex::add ──> <root>/<name>.idx
//!
//! question ──> Embedder ──> VectorIndex::load + Retriever (top-k cosine)
//!                                 └──> AnswerGenerator ──> answer
//! ```
//!
//! The index is an exhaustive cosine-similarity search over an append-only
//! list of entries, persisted as one binary artifact per index name. The
//! embedding and generation services are capabilities ([`Embedder`],
//! [`AnswerGenerator`]) injected into [`RagPipeline`].

pub mod chunker;
pub mod config;
pub mod document;
pub mod embedder;
pub mod error;
pub mod generator;
pub mod index;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod store;
pub mod vector_ops;

pub use chunker::TextSplitter;
pub use config::Settings;
pub use document::{Document, IndexEntry, Metadata, SearchHit};
pub use embedder::{Embedder, HashingEmbedder};
pub use error::{Error, Result};
pub use generator::{AnswerGenerator, ExtractiveGenerator};
pub use index::VectorIndex;
pub use pipeline::{Answer, IngestReport, RagPipeline};
pub use prompt::PromptTemplate;
pub use retriever::Retriever;
pub use store::list_indexes;
