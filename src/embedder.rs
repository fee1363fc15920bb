//! Text → unit-length embedding.
//!
//! The pipeline only depends on the [`Embedder`] trait.  Any sentence encoder
//! (local model, remote service) plugs in behind it; the crate ships
//! [`HashingEmbedder`], a deterministic offline encoder built from signed
//! feature hashing of word unigrams and character trigrams.  Phrases that
//! share words or spelling land near each other, which is all the
//! multiplexing experiment needs from its inputs.

use tracing::debug;

use crate::error::{QuadplexError, Result};
use crate::linalg;

/// Norm tolerance for "unit length".
pub const UNIT_TOLERANCE: f64 = 1e-9;

/// A unit-length embedding vector.  Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f64>);

impl Embedding {
    /// Normalize `values` to unit length.
    ///
    /// A zero vector has no direction; it is kept as zeros (degraded, not
    /// failed) so a decoder fed an all-zero quadrant still produces output.
    pub fn normalized(mut values: Vec<f64>) -> Self {
        linalg::normalize(&mut values);
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn norm(&self) -> f64 {
        linalg::l2(&self.0)
    }

    /// Cosine similarity in [-1, 1].
    pub fn cosine(&self, other: &Embedding) -> f64 {
        linalg::cosine_similarity(&self.0, &other.0)
    }
}

/// Maps a text string to a fixed-dimension unit vector.
pub trait Embedder {
    fn dim(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed every phrase, in order.
    fn embed_all(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Deterministic feature-hashing embedder.
///
/// Each feature (lower-cased word, or character trigram of the padded
/// lower-cased text) is hashed with FNV-1a and a SplitMix finalizer; the low bits
/// pick a bucket, one high bit picks the sign.  Words weigh more than
/// trigrams.  The bucket vector is L2-normalised.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

const WORD_WEIGHT: f64 = 2.0;
const TRIGRAM_WEIGHT: f64 = 1.0;

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn accumulate(&self, buckets: &mut [f64], feature: &[u8], weight: f64) {
        let h = splitmix(fnv1a64(feature));
        let idx = (h % self.dim as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        buckets[idx] += sign * weight;
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Embedding> {
        if self.dim == 0 {
            return Err(QuadplexError::ZeroDimension);
        }
        let lower = text.to_lowercase();
        let mut buckets = vec![0.0f64; self.dim];

        for word in lower.split_whitespace() {
            self.accumulate(&mut buckets, word.as_bytes(), WORD_WEIGHT);
        }

        let padded: Vec<char> = std::iter::once(' ')
            .chain(lower.chars())
            .chain(std::iter::once(' '))
            .collect();
        let mut gram = String::with_capacity(12);
        for w in padded.windows(3) {
            gram.clear();
            gram.extend(w);
            self.accumulate(&mut buckets, gram.as_bytes(), TRIGRAM_WEIGHT);
        }

        let embedding = Embedding::normalized(buckets);
        debug!(text, dim = self.dim, norm = embedding.norm(), "embedded phrase");
        Ok(embedding)
    }
}

#[inline]
fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/// SplitMix64 finaliser; spreads FNV output over all 64 bits.
#[inline]
fn splitmix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PHRASES;

    #[test]
    fn default_phrases_embed_to_unit_vectors() {
        let e = HashingEmbedder::new(384);
        for phrase in DEFAULT_PHRASES {
            let emb = e.embed(phrase).unwrap();
            assert_eq!(emb.dim(), 384);
            assert!((emb.norm() - 1.0).abs() < UNIT_TOLERANCE, "{phrase}: {}", emb.norm());
        }
    }

    #[test]
    fn embedding_is_deterministic_and_case_insensitive() {
        let e = HashingEmbedder::new(64);
        assert_eq!(e.embed("Good Morning").unwrap(), e.embed("Good Morning").unwrap());
        assert_eq!(e.embed("Good Morning").unwrap(), e.embed("good morning").unwrap());
    }

    #[test]
    fn shared_words_raise_similarity() {
        let e = HashingEmbedder::new(384);
        let how = e.embed("How Are You").unwrap();
        let how_today = e.embed("How Are You Today").unwrap();
        let hello = e.embed("Hello World").unwrap();
        let related = how.cosine(&how_today);
        let unrelated = how.cosine(&hello);
        println!("cos(how, how today)={related:.4}  cos(how, hello)={unrelated:.4}");
        assert!(related > unrelated);
    }

    #[test]
    fn zero_vector_normalizes_to_itself() {
        let z = Embedding::normalized(vec![0.0; 5]);
        assert_eq!(z.norm(), 0.0);
    }

    #[test]
    fn zero_dimension_is_an_error() {
        assert!(HashingEmbedder::new(0).embed("x").is_err());
    }
}
