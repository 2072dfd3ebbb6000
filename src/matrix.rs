//! Dense row-major matrices and the vector operations the network needs.
use crate::error::{NetworkError, Result};
use rand::Rng;

/// Matrix type, indexed `[row][col]`.
pub type Matrix = Vec<Vec<f64>>;

/// Row-vector by matrix product: `out[j] = Σ_k v[k] * m[k][j]`.
///
/// `v.len()` must equal the row count of `m`; the result has one entry per
/// column. Ragged matrices are rejected.
pub fn multiply(v: &[f64], m: &Matrix) -> Result<Vec<f64>> {
    if v.len() != m.len() {
        return Err(NetworkError::dims("multiply: vector length vs matrix rows", m.len(), v.len()));
    }
    let cols = m.first().map_or(0, Vec::len);
    let mut out = vec![0.0; cols];
    for (&x, row) in v.iter().zip(m) {
        if row.len() != cols {
            return Err(NetworkError::dims("multiply: ragged matrix row", cols, row.len()));
        }
        for (o, &w) in out.iter_mut().zip(row) {
            *o += x * w;
        }
    }
    Ok(out)
}

/// `out[j] = Σ_i m[j][i] * v[i]`, i.e. `m · vᵀ`. Used to push deltas back
/// through a weight matrix.
pub fn multiply_transposed(m: &Matrix, v: &[f64]) -> Result<Vec<f64>> {
    m.iter()
        .map(|row| {
            if row.len() != v.len() {
                return Err(NetworkError::dims("multiply_transposed: row length", v.len(), row.len()));
            }
            Ok(row.iter().zip(v).map(|(&w, &d)| w * d).sum())
        })
        .collect()
}

/// Maps `f` over every element.
pub fn elementwise_apply<F>(v: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    v.iter().map(|&x| f(x)).collect()
}

/// Adds `b` into `v` elementwise.
pub fn add_assign(v: &mut [f64], b: &[f64]) -> Result<()> {
    if v.len() != b.len() {
        return Err(NetworkError::dims("add: vector lengths", v.len(), b.len()));
    }
    for (x, &y) in v.iter_mut().zip(b) {
        *x += y;
    }
    Ok(())
}

/// `rows × cols` matrix drawn uniformly from `[-1, 1)`.
pub fn random_matrix<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
    (0..rows)
        .map(|_| (0..cols).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

/// Returns `(rows, cols)` if every row has the same length.
pub fn shape(m: &Matrix) -> Option<(usize, usize)> {
    let cols = m.first().map_or(0, Vec::len);
    m.iter().all(|row| row.len() == cols).then_some((m.len(), cols))
}

pub fn all_finite(m: &Matrix) -> bool {
    m.iter().flatten().all(|x| x.is_finite())
}
