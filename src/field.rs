//! Square real grids and the field encoder.
//!
//! A semantic field is the projection of one embedding reshaped row-major
//! into a G×G grid: cell (r, c) holds element `r * G + c` of `P @ e`.

use tracing::debug;

use crate::embedder::Embedding;
use crate::error::{QuadplexError, Result};
use crate::projection::ProjectionMatrix;

/// G×G row-major grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: usize,
    cells: Vec<f64>,
}

impl Grid {
    pub fn zeros(size: usize) -> Self {
        Self { size, cells: vec![0.0; size * size] }
    }

    /// Reshape a flat vector of length `size²`.
    pub fn from_flat(size: usize, cells: Vec<f64>) -> Result<Self> {
        if cells.len() != size * size {
            return Err(QuadplexError::mismatch("grid reshape", size * size, cells.len()));
        }
        Ok(Self { size, cells })
    }

    /// Side length G.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Row-major flattening (the inverse of [`Grid::from_flat`]).
    pub fn as_flat(&self) -> &[f64] {
        &self.cells
    }

    /// Multiply every cell by `factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        self.cells.iter_mut().for_each(|x| *x *= factor);
        self
    }

    /// (min, max) over all cells.
    pub fn value_range(&self) -> (f64, f64) {
        self.cells
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)))
    }
}

/// Encode one embedding into its semantic field: `reshape(P @ e, (G, G))`.
pub fn encode(projection: &ProjectionMatrix, embedding: &Embedding) -> Result<Grid> {
    let flat = projection.apply(embedding.as_slice())?;
    let field = Grid::from_flat(projection.grid_size(), flat)?;
    debug!(grid_size = field.size(), "encoded semantic field");
    Ok(field)
}

/// Encode every (projection, embedding) pair in phrase order.
pub fn encode_all(projections: &[ProjectionMatrix], embeddings: &[Embedding]) -> Result<Vec<Grid>> {
    if projections.len() != embeddings.len() {
        return Err(QuadplexError::mismatch(
            "projection/embedding pairing",
            projections.len(),
            embeddings.len(),
        ));
    }
    projections.iter().zip(embeddings).map(|(p, e)| encode(p, e)).collect()
}
