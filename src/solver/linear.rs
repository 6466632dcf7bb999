//! Dense linear system solver.

use crate::error::{BreadboardError, Result};

/// A square matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DenseMatrix {
    /// Create a zero matrix of the given dimension.
    pub fn zeros(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Build a matrix from rows. All rows must have `rows.len()` entries.
    #[cfg(test)]
    pub fn from_rows(rows: &[&[f64]]) -> Self {
        let size = rows.len();
        let mut m = Self::zeros(size);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), size, "matrix must be square");
            m.data[i * size..(i + 1) * size].copy_from_slice(row);
        }
        m
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size + col]
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.size + col] += value;
    }
}

/// Solve `A·x = b` by Gaussian elimination with partial pivoting.
///
/// At every step the row with the largest absolute value in the pivot column
/// is swapped up. If that value is not above `pivot_epsilon` the matrix is
/// treated as singular, so a zero pivot is rejected even when
/// `pivot_epsilon` is zero. `matrix` and `rhs` are left untouched.
pub fn solve_dense(matrix: &DenseMatrix, rhs: &[f64], pivot_epsilon: f64) -> Result<Vec<f64>> {
    let n = matrix.size;
    debug_assert_eq!(rhs.len(), n, "right-hand side length must match the matrix");

    let mut a = matrix.data.clone();
    let mut b = rhs.to_vec();

    for k in 0..n {
        // Find pivot
        let mut max_val = a[k * n + k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = a[i * n + k].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if max_val.is_nan() || max_val <= pivot_epsilon {
            return Err(BreadboardError::SingularMatrix {
                column: k,
                pivot: max_val,
            });
        }

        // Swap rows if needed
        if max_row != k {
            for j in 0..n {
                a.swap(k * n + j, max_row * n + j);
            }
            b.swap(k, max_row);
        }

        // Eliminate below the pivot
        let pivot = a[k * n + k];
        for i in (k + 1)..n {
            let factor = a[i * n + k] / pivot;
            if factor == 0.0 {
                continue;
            }
            a[i * n + k] = 0.0;
            for j in (k + 1)..n {
                a[i * n + j] -= factor * a[k * n + j];
            }
            b[i] -= factor * b[k];
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i * n + j] * x[j];
        }
        x[i] = sum / a[i * n + i];
    }

    Ok(x)
}
