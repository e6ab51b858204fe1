//! Dense linear algebra used by assembly and the direct solver
//!
//! Shape checks return [`FrameError::DimensionMismatch`] instead of panicking, so a
//! mis-assembled system surfaces as an analysis failure.

use nalgebra::{DMatrix, DVector};

use crate::error::{FrameError, FrameResult};

/// Default pivot magnitude below which a system is reported as singular
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Singular-pivot threshold for a matrix whose largest entry is `max_abs`
///
/// Absolute `tolerance` by default; `relative` scales it by `max(1, max_abs)`
/// for models in large units.
pub fn pivot_threshold(tolerance: f64, max_abs: f64, relative: bool) -> f64 {
    if relative {
        tolerance * max_abs.max(1.0)
    } else {
        tolerance
    }
}

fn shape(m: &DMatrix<f64>) -> (usize, usize) {
    (m.nrows(), m.ncols())
}

fn check_same_shape(operation: &'static str, a: &DMatrix<f64>, b: &DMatrix<f64>) -> FrameResult<()> {
    if shape(a) != shape(b) {
        return Err(FrameError::DimensionMismatch {
            operation,
            left: shape(a),
            right: shape(b),
        });
    }
    Ok(())
}

/// Elementwise `a + b`
pub fn plus(a: &DMatrix<f64>, b: &DMatrix<f64>) -> FrameResult<DMatrix<f64>> {
    check_same_shape("plus", a, b)?;
    Ok(a + b)
}

/// Elementwise `a - b`
pub fn minus(a: &DMatrix<f64>, b: &DMatrix<f64>) -> FrameResult<DMatrix<f64>> {
    check_same_shape("minus", a, b)?;
    Ok(a - b)
}

/// Multiply every entry by `factor`
pub fn scale(a: &DMatrix<f64>, factor: f64) -> DMatrix<f64> {
    a * factor
}

/// Matrix product `a * b`
pub fn multiply(a: &DMatrix<f64>, b: &DMatrix<f64>) -> FrameResult<DMatrix<f64>> {
    if a.ncols() != b.nrows() {
        return Err(FrameError::DimensionMismatch {
            operation: "multiply",
            left: shape(a),
            right: shape(b),
        });
    }
    Ok(a * b)
}

/// Matrix-vector product `a * v`
pub fn multiply_vector(a: &DMatrix<f64>, v: &DVector<f64>) -> FrameResult<DVector<f64>> {
    if a.ncols() != v.len() {
        return Err(FrameError::DimensionMismatch {
            operation: "multiply_vector",
            left: shape(a),
            right: (v.len(), 1),
        });
    }
    Ok(a * v)
}

/// Gather an arbitrary set of rows and columns into a new matrix
///
/// # Panics
/// Panics if any index is out of bounds.
pub fn sub_matrix(a: &DMatrix<f64>, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols.len(), |i, j| a[(rows[i], cols[j])])
}

/// Gather the entries of `v` at `indices`
pub fn gather(v: &DVector<f64>, indices: &[usize]) -> DVector<f64> {
    DVector::from_iterator(indices.len(), indices.iter().map(|&i| v[i]))
}

/// Scatter `values` into a zero vector of length `len` at `indices`
pub fn scatter(values: &DVector<f64>, indices: &[usize], len: usize) -> FrameResult<DVector<f64>> {
    if values.len() != indices.len() {
        return Err(FrameError::DimensionMismatch {
            operation: "scatter",
            left: (values.len(), 1),
            right: (indices.len(), 1),
        });
    }
    let mut out = DVector::zeros(len);
    for (&index, &value) in indices.iter().zip(values.iter()) {
        out[index] = value;
    }
    Ok(out)
}

/// LU factorization with partial (row) pivoting, `P·A = L·U`
///
/// `L` (unit diagonal) and `U` share one matrix. A pivot whose magnitude is
/// below `threshold` is treated as singular.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: DMatrix<f64>,
    perm: Vec<usize>,
}

impl LuDecomposition {
    /// Factorize a square matrix
    pub fn new(a: &DMatrix<f64>, threshold: f64) -> FrameResult<Self> {
        if !a.is_square() {
            return Err(FrameError::DimensionMismatch {
                operation: "solve",
                left: shape(a),
                right: (a.ncols(), a.ncols()),
            });
        }

        let n = a.nrows();
        let mut lu = a.clone();
        let mut perm: Vec<usize> = (0..n).collect();

        if n == 0 {
            return Ok(Self { lu, perm });
        }

        for k in 0..n {
            // Largest remaining entry in column k
            let mut pivot_row = k;
            let mut pivot_abs = lu[(k, k)].abs();
            for i in (k + 1)..n {
                let value = lu[(i, k)].abs();
                if value > pivot_abs {
                    pivot_abs = value;
                    pivot_row = i;
                }
            }

            if pivot_abs < threshold {
                return Err(FrameError::SingularMatrix);
            }

            if pivot_row != k {
                lu.swap_rows(k, pivot_row);
                perm.swap(k, pivot_row);
            }

            let pivot = lu[(k, k)];
            for i in (k + 1)..n {
                let factor = lu[(i, k)] / pivot;
                lu[(i, k)] = factor;
                if factor != 0.0 {
                    for j in (k + 1)..n {
                        lu[(i, j)] -= factor * lu[(k, j)];
                    }
                }
            }
        }

        Ok(Self { lu, perm })
    }

    /// Order of the factorized matrix
    pub fn dim(&self) -> usize {
        self.perm.len()
    }

    /// Solve `A·x = b` with forward and back substitution
    pub fn solve(&self, b: &DVector<f64>) -> FrameResult<DVector<f64>> {
        let n = self.dim();
        if b.len() != n {
            return Err(FrameError::DimensionMismatch {
                operation: "solve",
                left: (n, n),
                right: (b.len(), 1),
            });
        }

        let mut x = DVector::from_iterator(n, self.perm.iter().map(|&p| b[p]));

        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum;
        }

        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum / self.lu[(i, i)];
        }

        Ok(x)
    }
}

/// Solve a square system `A·x = b` with the default pivot tolerance
pub fn solve(a: &DMatrix<f64>, b: &DVector<f64>) -> FrameResult<DVector<f64>> {
    LuDecomposition::new(a, PIVOT_TOLERANCE)?.solve(b)
}
