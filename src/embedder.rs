use crate::config::Number;
use crate::error::{Error, Result};
use crate::vector_ops::normalize_vector;
use sha2::{Digest, Sha256};

/// Maps text to a fixed-width vector. Hosted models, local models and test
/// stubs all plug in here.
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<Number>>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<Number>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Lower-cased alphanumeric terms of `text`.
pub(crate) fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

/// Deterministic feature-hashing embedder that needs no model download.
///
/// Each term lands in one bucket chosen by its SHA-256 digest, with a sign
/// taken from the digest as well so unrelated terms tend to cancel out.
/// Text without any terms embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Embedding(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimension })
    }
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<Number>> {
        let mut vector = vec![0.0; self.dimension];
        for term in terms(text) {
            let digest = Sha256::digest(term.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize_vector(&mut vector);
        Ok(vector)
    }
}
