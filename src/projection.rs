//! Random projections lifting a D-dimensional embedding to a G×G grid.
//!
//! ## Construction
//!
//! Each projection P ∈ ℝ^{G²×D} has i.i.d. N(0, 1) entries; every column is
//! then scaled to unit Euclidean norm.  With G² ≫ D the columns are nearly
//! orthogonal, so P has full column rank with overwhelming probability and
//! P⁺P = I_D.
//!
//! ## Reproducibility
//!
//! All four matrices are drawn back to back from a single `ChaCha8Rng`
//! seeded with the run seed.  ChaCha output is fixed across `rand`
//! releases, so a given seed reproduces every matrix bit for bit.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing::{debug, info};

use crate::error::{QuadplexError, Result};
use crate::linalg::Matrix;

/// One phrase's column-normalised projection, shape (G², D).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionMatrix {
    grid_size: usize,
    matrix: Matrix,
}

impl ProjectionMatrix {
    /// Sample one projection from `rng`, row by row.
    pub fn sample<R: Rng + ?Sized>(grid_size: usize, dim: usize, rng: &mut R) -> Self {
        let cells = grid_size * grid_size;
        let mut matrix = Matrix::from_fn(cells, dim, |_, _| rng.sample(StandardNormal));
        matrix.normalize_columns();
        Self { grid_size, matrix }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Embedding dimension D (column count).
    pub fn dim(&self) -> usize {
        self.matrix.cols()
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// `P @ x` as a flat G² vector.
    pub fn apply(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.dim() {
            return Err(QuadplexError::mismatch("projection input", self.dim(), x.len()));
        }
        self.matrix.matvec(x)
    }
}

/// Draw `count` independent projections from one generator seeded with `seed`.
pub fn generate_projections(
    grid_size: usize,
    dim: usize,
    seed: u64,
    count: usize,
) -> Result<Vec<ProjectionMatrix>> {
    if grid_size < 2 || grid_size % 2 != 0 {
        return Err(QuadplexError::OddGridSize(grid_size));
    }
    if dim == 0 {
        return Err(QuadplexError::ZeroDimension);
    }

    info!(grid_size, dim, seed, count, "generating projection matrices");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let projections = (0..count)
        .map(|i| {
            let p = ProjectionMatrix::sample(grid_size, dim, &mut rng);
            debug!(index = i, rows = p.matrix.rows(), cols = p.dim(), "projection sampled");
            p
        })
        .collect();
    Ok(projections)
}
