//! Error type shared by every pipeline stage.

use thiserror::Error;

/// Errors raised while building or running the quadrant pipeline.
///
/// Every stage fails fast: there are no retries and no partial results.
#[derive(Debug, Error)]
pub enum QuadplexError {
    /// Quadrants are only equal when the grid side is even.
    #[error("grid size must be even and at least 2, got {0}")]
    OddGridSize(usize),

    #[error("embedding dimension must be non-zero")]
    ZeroDimension,

    /// The multiplexer assigns exactly one quadrant per phrase.
    #[error("expected {expected} phrases, got {actual}")]
    WrongPhraseCount { expected: usize, actual: usize },

    /// Two operands disagree on a shape.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("figure output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("heatmap encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuadplexError>;

impl QuadplexError {
    pub(crate) fn mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { context, expected, actual }
    }
}
