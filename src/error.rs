use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Index '{index_name}' not found at {}", .path.display())]
    NotFound { index_name: String, path: PathBuf },

    #[error("Corrupt index data: {0}")]
    CorruptData(String),

    #[error("Invalid index name: '{0}'")]
    InvalidIndexName(String),

    #[error("Only TXT files are allowed: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("Document produced no chunks")]
    EmptyDocument,

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
