//! Quadrant multiplexing of sentence embeddings.
//!
//! Four phrases are embedded, each lifted into a G×G grid by its own random
//! projection, and one quadrant of every grid is copied into a shared
//! composite.  Each phrase is then recovered from its quadrant alone through
//! the Moore–Penrose pseudo-inverse of its projection, and the recovery is
//! scored by cosine similarity.
//!
//! # Modules
//!
//! - [`config`]     — run parameters (grid size, dimension, seed, scale)
//! - [`embedder`]   — `Embedder` trait and the offline `HashingEmbedder`
//! - [`projection`] — seeded, column-normalised random projections
//! - [`field`]      — G×G grids and the field encoder
//! - [`quadrant`]   — quadrant geometry, multiplexer, isolation
//! - [`pinv`]       — Moore–Penrose pseudo-inverse via Gram + Jacobi
//! - [`decoder`]    — quadrant demultiplexer / decoder
//! - [`similarity`] — cosine scores and console lines
//! - [`render`]     — heatmap and comparison figures
//! - [`pipeline`]   — the end-to-end pass
//!
//! # Running tests
//!
//! ```bash
//! cargo test -- --nocapture
//! ```

pub mod config;
pub mod decoder;
pub mod embedder;
pub mod error;
pub mod field;
pub mod linalg;
pub mod pinv;
pub mod pipeline;
pub mod projection;
pub mod quadrant;
pub mod render;
pub mod similarity;

pub use config::MultiplexConfig;
pub use embedder::{Embedder, Embedding, HashingEmbedder};
pub use error::{QuadplexError, Result};
pub use pipeline::{run, write_outputs, RunOutcome};
