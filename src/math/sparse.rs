//! Sparse assembly and a skyline Cholesky solver
//!
//! Frame stiffness matrices are banded and mostly empty; for large models the
//! free-free block is assembled straight into COO storage and factorized in
//! skyline (profile) form instead of going through a dense LU.

use nalgebra::{DMatrix, DVector, SMatrix};
use nalgebra_sparse::convert::serial::convert_csr_dense;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{FrameError, FrameResult};

/// Sparse matrix builder using COO format
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // Roughly two 12x12 element blocks per DOF row
        let estimated_nnz = size * 60;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter an element matrix; DOFs mapped to `None` are skipped
    pub fn add_element_matrix<const N: usize>(
        &mut self,
        dofs: &[Option<usize>; N],
        k_elem: &SMatrix<f64, N, N>,
    ) {
        for (i, di) in dofs.iter().enumerate() {
            let Some(di) = *di else { continue };
            for (j, dj) in dofs.iter().enumerate() {
                if let Some(dj) = *dj {
                    self.add(di, dj, k_elem[(i, j)]);
                }
            }
        }
    }

    /// Convert to CSR format, summing duplicate entries
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Number of stored (unsummed) entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Largest entry magnitude of `a`
pub fn max_abs(a: &CsrMatrix<f64>) -> f64 {
    a.values().iter().fold(0.0, |m, v| m.max(v.abs()))
}

/// Dense copy of `a`
pub fn to_dense(a: &CsrMatrix<f64>) -> DMatrix<f64> {
    convert_csr_dense(a)
}

/// Sparse matrix-vector product `a * v`
pub fn multiply_vector(a: &CsrMatrix<f64>, v: &DVector<f64>) -> FrameResult<DVector<f64>> {
    if a.ncols() != v.len() {
        return Err(FrameError::DimensionMismatch {
            operation: "multiply_vector",
            left: (a.nrows(), a.ncols()),
            right: (v.len(), 1),
        });
    }

    Ok(DVector::from_iterator(
        a.nrows(),
        a.row_iter().map(|row| {
            row.col_indices()
                .iter()
                .zip(row.values())
                .map(|(&c, &x)| x * v[c])
                .sum::<f64>()
        }),
    ))
}

/// Rows and columns `indices` of a square matrix, in the given order
pub fn principal_submatrix(a: &CsrMatrix<f64>, indices: &[usize]) -> CsrMatrix<f64> {
    let mut position = vec![None; a.nrows()];
    for (k, &i) in indices.iter().enumerate() {
        position[i] = Some(k);
    }

    let mut builder = SparseMatrixBuilder::new(indices.len());
    for (row, col, &val) in a.triplet_iter() {
        if let (Some(r), Some(c)) = (position[row], position[col]) {
            builder.add(r, c, val);
        }
    }
    builder.to_csr()
}

/// Cholesky factor `L` of a symmetric positive definite matrix in skyline storage
///
/// Row `i` stores columns `i - heights[i] ..= i`.
#[derive(Debug, Clone)]
pub struct SkylineCholesky {
    size: usize,
    skyline: Vec<Vec<f64>>,
    heights: Vec<usize>,
}

impl SkylineCholesky {
    /// Factorize the lower triangle of `csr`
    ///
    /// Each pivot `L_ii²` is the elimination pivot of an unpivoted LU, so it is
    /// held to the same `threshold`; smaller (or negative) pivots are reported as
    /// [`FrameError::SingularMatrix`].
    pub fn factorize(csr: &CsrMatrix<f64>, threshold: f64) -> FrameResult<Self> {
        if csr.nrows() != csr.ncols() {
            return Err(FrameError::DimensionMismatch {
                operation: "solve",
                left: (csr.nrows(), csr.ncols()),
                right: (csr.ncols(), csr.ncols()),
            });
        }
        let size = csr.nrows();

        // Skyline profile of the lower triangle
        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                heights[row] = heights[row].max(row - col);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();
        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                skyline[row][col + heights[row] - row] += val;
            }
        }

        let mut factor = Self {
            size,
            skyline,
            heights,
        };

        for i in 0..size {
            let start_i = i - factor.heights[i];

            for j in start_i..i {
                let start_j = j - factor.heights[j];
                let start = start_i.max(start_j);

                let mut sum = 0.0;
                for k in start..j {
                    sum += factor.get(i, k) * factor.get(j, k);
                }

                let diag_j = factor.get(j, j);
                let idx = j - start_i;
                factor.skyline[i][idx] = (factor.skyline[i][idx] - sum) / diag_j;
            }

            let mut sum = 0.0;
            for j in start_i..i {
                let val = factor.get(i, j);
                sum += val * val;
            }

            let hi = factor.heights[i];
            let diag = factor.skyline[i][hi] - sum;
            if diag < threshold {
                return Err(FrameError::SingularMatrix);
            }
            factor.skyline[i][hi] = diag.sqrt();
        }

        Ok(factor)
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        let start = row - self.heights[row];
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve `L·Lᵀ·x = b`
    pub fn solve(&self, b: &DVector<f64>) -> FrameResult<DVector<f64>> {
        if b.len() != self.size {
            return Err(FrameError::DimensionMismatch {
                operation: "solve",
                left: (self.size, self.size),
                right: (b.len(), 1),
            });
        }

        let mut x = b.clone();

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let start = i - self.heights[i];
            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }
            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);
            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        Ok(x)
    }
}
