//! Run configuration.
//!
//! All parameters are load-time constants; nothing is read from flags or the
//! environment.  The value is passed explicitly into each stage so tests can
//! shrink the grid or vary the seed without touching global state.

use serde::{Deserialize, Serialize};

use crate::error::{QuadplexError, Result};

/// Number of phrases, one per quadrant.
pub const PHRASE_COUNT: usize = 4;

pub const DEFAULT_PHRASES: [&str; PHRASE_COUNT] =
    ["Hello World", "Good Morning", "How Are You", "See You Later"];

/// Sentence embedding width (MiniLM-class encoders).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub const DEFAULT_GRID_SIZE: usize = 512;

pub const DEFAULT_SEED: u64 = 42;

/// Uniform modulation applied to the composite field.
pub const DEFAULT_SCALE: f64 = 0.7;

/// Relative eigenvalue cutoff for the Gram pseudo-inverse.
/// 1e-12 on λ is 1e-6 on singular values.
pub const DEFAULT_RCOND: f64 = 1e-12;

pub const DEFAULT_FIGURE_DIR: &str = "figures";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplexConfig {
    /// Phrases in quadrant order: TL, TR, BL, BR.
    pub phrases: Vec<String>,
    /// Grid side length G; must be even.
    pub grid_size: usize,
    /// Embedding dimension D.
    pub embedding_dim: usize,
    /// Seed for the projection generator.
    pub seed: u64,
    /// Multiplier applied to the composite field.
    pub scale: f64,
    pub rcond: f64,
    /// Where figures and the run report are written.
    pub figure_dir: String,
}

impl Default for MultiplexConfig {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
            grid_size: DEFAULT_GRID_SIZE,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            seed: DEFAULT_SEED,
            scale: DEFAULT_SCALE,
            rcond: DEFAULT_RCOND,
            figure_dir: DEFAULT_FIGURE_DIR.to_string(),
        }
    }
}

impl MultiplexConfig {
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_figure_dir(mut self, dir: impl Into<String>) -> Self {
        self.figure_dir = dir.into();
        self
    }

    pub fn with_phrases<S: AsRef<str>>(mut self, phrases: &[S]) -> Self {
        self.phrases = phrases.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    /// Half the grid side: the quadrant edge length Q.
    pub fn quarter(&self) -> usize {
        self.grid_size / 2
    }

    /// Number of cells in one full grid, G·G.
    pub fn cells(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Check the invariants every stage relies on.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 || self.grid_size % 2 != 0 {
            return Err(QuadplexError::OddGridSize(self.grid_size));
        }
        if self.embedding_dim == 0 {
            return Err(QuadplexError::ZeroDimension);
        }
        if self.phrases.len() != PHRASE_COUNT {
            return Err(QuadplexError::WrongPhraseCount {
                expected: PHRASE_COUNT,
                actual: self.phrases.len(),
            });
        }
        Ok(())
    }
}
