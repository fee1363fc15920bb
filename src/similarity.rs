//! Cosine similarity between original and decoded embeddings.

use std::fmt;

use serde::Serialize;

use crate::embedder::Embedding;
use crate::error::{QuadplexError, Result};

/// One phrase's recovery score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityRow {
    pub phrase: String,
    /// Cosine similarity in [-1, 1].
    pub similarity: f64,
}

impl fmt::Display for SimilarityRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Similarity for '{}': {:.4}", self.phrase, self.similarity)
    }
}

/// Score every (original, decoded) pair, keeping phrase order.
pub fn similarity_report(
    phrases: &[String],
    originals: &[Embedding],
    decoded: &[Embedding],
) -> Result<Vec<SimilarityRow>> {
    if originals.len() != phrases.len() {
        return Err(QuadplexError::mismatch("original embeddings", phrases.len(), originals.len()));
    }
    if decoded.len() != phrases.len() {
        return Err(QuadplexError::mismatch("decoded embeddings", phrases.len(), decoded.len()));
    }
    Ok(phrases
        .iter()
        .zip(originals.iter().zip(decoded))
        .map(|(phrase, (o, d))| SimilarityRow { phrase: phrase.clone(), similarity: o.cosine(d) })
        .collect())
}
