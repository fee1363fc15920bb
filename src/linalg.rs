//! Dense linear algebra on row-major `f64` storage.
//!
//! Everything the pipeline needs fits in a handful of kernels: dot products,
//! matrix–vector products in both orientations, the Gram matrix `AᵀA`, and a
//! symmetric eigendecomposition (cyclic Jacobi) used to build the
//! Moore–Penrose pseudo-inverse.
//!
//! Storage convention: a `rows × cols` matrix is a flat `Vec<f64>` with
//! element `(i, j)` at `i * cols + j`.

use crate::error::{QuadplexError, Result};

// ─── Vector kernels ───────────────────────────────────────────────────────────

/// Dot product of two equal-length slices.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
pub fn l2(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// Scale `v` to unit length in place; returns the old norm.
///
/// A zero vector has no direction and is left untouched.
pub fn normalize(v: &mut [f64]) -> f64 {
    let n = l2(v);
    if n > 1e-300 {
        v.iter_mut().for_each(|x| *x /= n);
    }
    n
}

/// Cosine of the angle between `a` and `b`, clamped to [-1, 1].
///
/// Returns 0 when either vector is zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let denom = l2(a) * l2(b);
    if denom <= 1e-300 {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(-1.0, 1.0)
}

// ─── Matrix ───────────────────────────────────────────────────────────────────

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Fill in row-major order: `f(0, 0), f(0, 1), …`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    /// Wrap flat row-major data; the length must equal `rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(QuadplexError::mismatch("matrix storage", rows * cols, data.len()));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, j)).collect()
    }

    /// Euclidean norm of every column, in a single pass over the rows.
    pub fn column_norms(&self) -> Vec<f64> {
        let mut sq = vec![0.0f64; self.cols];
        for i in 0..self.rows {
            for (s, x) in sq.iter_mut().zip(self.row(i)) {
                *s += x * x;
            }
        }
        sq.into_iter().map(f64::sqrt).collect()
    }

    /// Scale every column to unit Euclidean norm.  Zero columns stay zero.
    pub fn normalize_columns(&mut self) {
        let inv: Vec<f64> = self
            .column_norms()
            .into_iter()
            .map(|n| if n > 1e-300 { 1.0 / n } else { 0.0 })
            .collect();
        for row in self.data.chunks_exact_mut(self.cols) {
            for (x, s) in row.iter_mut().zip(&inv) {
                *x *= s;
            }
        }
    }

    /// `A @ x`  →  length `rows`.
    pub fn matvec(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.cols {
            return Err(QuadplexError::mismatch("matvec operand", self.cols, x.len()));
        }
        Ok((0..self.rows).map(|i| dot(self.row(i), x)).collect())
    }

    /// `Aᵀ @ y`  →  length `cols`.  Zero entries of `y` skip their row.
    pub fn transpose_matvec(&self, y: &[f64]) -> Result<Vec<f64>> {
        if y.len() != self.rows {
            return Err(QuadplexError::mismatch("transpose matvec operand", self.rows, y.len()));
        }
        let mut out = vec![0.0f64; self.cols];
        for (i, &yi) in y.iter().enumerate() {
            if yi == 0.0 {
                continue;
            }
            for (o, a) in out.iter_mut().zip(self.row(i)) {
                *o += yi * a;
            }
        }
        Ok(out)
    }

    /// `A @ B`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(QuadplexError::mismatch("matmul inner dimension", self.cols, other.rows));
        }
        let (n, k, m) = (self.rows, self.cols, other.cols);
        let mut c = Matrix::zeros(n, m);
        for i in 0..n {
            for l in 0..k {
                let a = self.data[i * k + l];
                if a == 0.0 {
                    continue;
                }
                let b_row = other.row(l);
                let c_row = &mut c.data[i * m..(i + 1) * m];
                for (cj, bj) in c_row.iter_mut().zip(b_row) {
                    *cj += a * bj;
                }
            }
        }
        Ok(c)
    }

    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        t
    }

    /// Gram matrix `AᵀA` (cols × cols), accumulated one row outer product at
    /// a time so the tall operand is streamed exactly once.
    pub fn gram(&self) -> Matrix {
        let d = self.cols;
        let mut g = vec![0.0f64; d * d];
        for i in 0..self.rows {
            let r = self.row(i);
            for (p, &rp) in r.iter().enumerate() {
                if rp == 0.0 {
                    continue;
                }
                let g_row = &mut g[p * d + p..(p + 1) * d];
                for (gq, rq) in g_row.iter_mut().zip(&r[p..]) {
                    *gq += rp * rq;
                }
            }
        }
        // mirror upper → lower
        for p in 0..d {
            for q in 0..p {
                g[p * d + q] = g[q * d + p];
            }
        }
        Matrix { rows: d, cols: d, data: g }
    }

    /// Largest absolute elementwise difference to `other` (same shape).
    pub fn max_abs_diff(&self, other: &Matrix) -> f64 {
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f64, f64::max)
    }

    pub fn frobenius(&self) -> f64 {
        l2(&self.data)
    }
}

// ─── Symmetric eigendecomposition (cyclic Jacobi) ────────────────────────────
//
// Each rotation J(p, q, φ) zeroes the off-diagonal pair (p, q):
//   A ← Jᵀ A J,  V ← V J
// Sweeps over all pairs repeat until the off-diagonal mass is negligible
// relative to the whole matrix.  For symmetric input the result is
//   A = V · diag(λ) · Vᵀ
// with orthonormal eigenvectors in the columns of V.

const JACOBI_MAX_SWEEPS: usize = 64;

/// Eigenvalues and eigenvectors of a symmetric matrix.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    pub values: Vec<f64>,
    /// Column `k` is the eigenvector for `values[k]`.
    pub vectors: Matrix,
    pub sweeps: usize,
}

/// Decompose a symmetric matrix.  Only the symmetric part is meaningful;
/// asymmetric input is not detected.
pub fn symmetric_eigen(m: &Matrix) -> Result<SymmetricEigen> {
    if m.rows != m.cols {
        return Err(QuadplexError::mismatch("symmetric eigen (square)", m.rows, m.cols));
    }
    let n = m.rows;
    let mut a = m.data.clone();
    let mut v = Matrix::identity(n);
    let total = m.frobenius().max(1e-300);

    let mut sweeps = 0;
    while sweeps < JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p * n + q] * a[p * n + q])
            .sum::<f64>()
            .sqrt();
        if off <= f64::EPSILON * total {
            break;
        }
        sweeps += 1;

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p * n + q];
                if apq.abs() <= 1e-300 {
                    continue;
                }
                let app = a[p * n + p];
                let aqq = a[q * n + q];
                let theta = (aqq - app) / (2.0 * apq);
                // smaller root of t² + 2θt − 1 = 0 keeps the rotation under 45°
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[k * n + p];
                    let akq = a[k * n + q];
                    a[k * n + p] = c * akp - s * akq;
                    a[k * n + q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p * n + k];
                    let aqk = a[q * n + k];
                    a[p * n + k] = c * apk - s * aqk;
                    a[q * n + k] = s * apk + c * aqk;
                }
                a[p * n + q] = 0.0;
                a[q * n + p] = 0.0;

                for k in 0..n {
                    let vkp = v.data[k * n + p];
                    let vkq = v.data[k * n + q];
                    v.data[k * n + p] = c * vkp - s * vkq;
                    v.data[k * n + q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let values = (0..n).map(|i| a[i * n + i]).collect();
    Ok(SymmetricEigen { values, vectors: v, sweeps })
}
