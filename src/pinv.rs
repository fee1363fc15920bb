//! Moore–Penrose pseudo-inverse of a tall (or any) real matrix.
//!
//! ## Method
//!
//! For A ∈ ℝ^{m×n} the identity
//!
//!   A⁺ = (AᵀA)⁺ Aᵀ
//!
//! holds for every A, square or not, full rank or not.  AᵀA is only n×n
//! (n = D = 384 here, against m = G² = 262 144 rows), so its pseudo-inverse
//! is cheap: decompose AᵀA = V Λ Vᵀ with Jacobi, invert the eigenvalues
//! above `rcond · λ_max`, zero the rest.
//!
//! A⁺ itself (n × m) is never formed at full size.  Applying it to y costs
//! one pass over A for Aᵀy, then an n×n product.
//!
//! ## Precision
//!
//! Working through AᵀA squares the condition number.  Random column-
//! normalised projections with m ≫ n are close to orthonormal (κ ≈ 1), so
//! the loss is irrelevant for this pipeline; rank-deficient input is still
//! handled by the eigenvalue cutoff and yields degraded, not failed, output.

use tracing::debug;

use crate::error::{QuadplexError, Result};
use crate::linalg::{symmetric_eigen, Matrix};

/// Pseudo-inverse of `source`, applied lazily.
#[derive(Debug, Clone)]
pub struct PseudoInverse<'a> {
    source: &'a Matrix,
    /// (AᵀA)⁺, n × n.
    gram_pinv: Matrix,
    rank: usize,
}

impl<'a> PseudoInverse<'a> {
    /// Build the pseudo-inverse with relative eigenvalue cutoff `rcond`.
    pub fn new(source: &'a Matrix, rcond: f64) -> Result<Self> {
        let n = source.cols();
        let gram = source.gram();
        let eig = symmetric_eigen(&gram)?;

        let lambda_max = eig.values.iter().cloned().fold(0.0f64, f64::max);
        let cutoff = rcond * lambda_max;
        let inv: Vec<f64> = eig
            .values
            .iter()
            .map(|&l| if l > cutoff && l > 0.0 { 1.0 / l } else { 0.0 })
            .collect();
        let rank = inv.iter().filter(|&&x| x != 0.0).count();

        // (AᵀA)⁺ = V · diag(inv) · Vᵀ
        let v = &eig.vectors;
        let vd = Matrix::from_fn(n, n, |i, k| v.get(i, k) * inv[k]);
        let gram_pinv = vd.matmul(&v.transpose())?;

        debug!(
            rows = source.rows(),
            cols = n,
            rank,
            sweeps = eig.sweeps,
            lambda_max,
            "pseudo-inverse prepared"
        );
        Ok(Self { source, gram_pinv, rank })
    }

    /// Numerical rank of the source matrix.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// `A⁺ @ y`.
    pub fn apply(&self, y: &[f64]) -> Result<Vec<f64>> {
        if y.len() != self.source.rows() {
            return Err(QuadplexError::mismatch("pseudo-inverse input", self.source.rows(), y.len()));
        }
        let aty = self.source.transpose_matvec(y)?;
        self.gram_pinv.matvec(&aty)
    }

    /// Full A⁺ (n × m).  Only sensible for small matrices.
    pub fn materialize(&self) -> Result<Matrix> {
        self.gram_pinv.matmul(&self.source.transpose())
    }
}
