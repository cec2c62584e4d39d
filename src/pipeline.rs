use crate::chunker::TextSplitter;
use crate::config::{Number, Settings};
use crate::document::SearchHit;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::generator::AnswerGenerator;
use crate::index::VectorIndex;
use crate::prompt::PromptTemplate;
use crate::store::validate_index_name;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub request_id: String,
    pub chunks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub response: String,
    pub prompt: String,
    pub sources: Vec<SearchHit>,
}

/// Upload and query flows over one storage root: documents are chunked,
/// embedded and persisted as an index per request id; questions are answered
/// from the chunks retrieved out of that index.
pub struct RagPipeline<E, G> {
    storage_root: PathBuf,
    top_k: usize,
    splitter: TextSplitter,
    prompt: PromptTemplate,
    embedder: E,
    generator: G,
}

impl<E: Embedder, G: AnswerGenerator> RagPipeline<E, G> {
    pub fn new(settings: &Settings, embedder: E, generator: G) -> Self {
        Self {
            storage_root: settings.storage_root.clone(),
            top_k: settings.top_k,
            splitter: TextSplitter::from_settings(settings),
            prompt: PromptTemplate::default(),
            embedder,
            generator,
        }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Ingests a `.txt` file. A fresh UUID names the index unless
    /// `index_name` is given.
    pub fn ingest_file(&self, path: impl AsRef<Path>, index_name: Option<&str>) -> Result<IngestReport> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            return Err(Error::UnsupportedFile(path.to_path_buf()));
        }

        let request_id = match index_name {
            Some(name) => name.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        validate_index_name(&request_id)?;

        let text = std::fs::read_to_string(path)?;
        let source = path.display().to_string();
        self.ingest_text(&request_id, &text, &source)
    }

    pub fn ingest_text(&self, index_name: &str, text: &str, source: &str) -> Result<IngestReport> {
        validate_index_name(index_name)?;

        let documents = self.splitter.split_document(text, source);
        if documents.is_empty() {
            return Err(Error::EmptyDocument);
        }
        log::debug!("Split '{}' into {} chunks", source, documents.len());

        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        for embedding in &embeddings {
            self.check_width(embedding)?;
        }

        let chunks = documents.len();
        let mut index = VectorIndex::new();
        index.add(documents, embeddings)?;
        index.save(index_name, &self.storage_root)?;

        Ok(IngestReport {
            request_id: index_name.to_string(),
            chunks,
        })
    }

    fn check_width(&self, embedding: &[Number]) -> Result<()> {
        let expected = self.embedder.dimension();
        if embedding.len() != expected {
            return Err(Error::DimensionMismatch {
                what: "embedder output width",
                expected,
                actual: embedding.len(),
            });
        }
        Ok(())
    }

    pub fn search(&self, index_name: &str, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let index = VectorIndex::load(index_name, &self.storage_root)?;
        let query_embedding = self.embedder.embed(query)?;
        self.check_width(&query_embedding)?;
        let hits = index.similarity_search(&query_embedding, k)?;
        log::debug!("Search in '{}' returned {} hits", index_name, hits.len());
        Ok(hits)
    }

    pub fn answer(&self, index_name: &str, question: &str) -> Result<Answer> {
        let index = VectorIndex::load(index_name, &self.storage_root)?;
        let query_embedding = self.embedder.embed(question)?;
        self.check_width(&query_embedding)?;

        let sources = index.as_retriever(Some(self.top_k)).retrieve(&query_embedding)?;
        log::debug!("Retrieved {} chunks from '{}'", sources.len(), index_name);

        let context: Vec<&str> = sources.iter().map(|hit| hit.document.text.as_str()).collect();
        let prompt = self.prompt.render(question, &context);
        let response = self.generator.generate(question, &context)?;

        Ok(Answer {
            response,
            prompt,
            sources,
        })
    }
}
