//! Global stiffness assembly, assembled once and solved per load vector

use log::{debug, warn};
use nalgebra_sparse::CsrMatrix;

use crate::elements::FrameElement;
use crate::error::{FrameError, FrameResult};
use crate::math::linalg::{self, pivot_threshold};
use crate::math::sparse::{self, principal_submatrix};
use crate::math::{gather, scatter, sub_matrix, LuDecomposition, Mat, SkylineCholesky, SparseMatrixBuilder, Vec};
use crate::model::ModelIndex;

use super::{AnalysisOptions, SolverKind};

/// Global stiffness in the storage its solver works on
#[derive(Debug, Clone)]
enum GlobalStiffness {
    Dense(Mat),
    Sparse(CsrMatrix<f64>),
}

impl GlobalStiffness {
    fn multiply_vector(&self, v: &Vec) -> FrameResult<Vec> {
        match self {
            Self::Dense(k) => linalg::multiply_vector(k, v),
            Self::Sparse(k) => sparse::multiply_vector(k, v),
        }
    }

    fn to_dense(&self) -> Mat {
        match self {
            Self::Dense(k) => k.clone(),
            Self::Sparse(k) => sparse::to_dense(k),
        }
    }
}

/// Factorized free-free stiffness block
#[derive(Debug, Clone)]
enum Factorization {
    Dense(LuDecomposition),
    Sparse(SkylineCholesky),
}

impl Factorization {
    fn solve(&self, b: &Vec) -> FrameResult<Vec> {
        match self {
            Self::Dense(lu) => lu.solve(b),
            Self::Sparse(cholesky) => cholesky.solve(b),
        }
    }
}

/// Displacements and reactions over every DOF for one load vector
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Global displacements, zero at fixed DOFs
    pub displacements: Vec,
    /// `K·D - P` at every DOF
    pub reactions: Vec,
}

/// The global stiffness matrix with its DOF partition and factorization
///
/// None of it depends on loads, so one instance serves every combination.
/// A factorization failure is kept and handed to every solve.
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    dofs: usize,
    stiffness: GlobalStiffness,
    free: std::vec::Vec<usize>,
    fixed: std::vec::Vec<usize>,
    factorization: Result<Factorization, FrameError>,
}

impl AssembledSystem {
    /// Assemble and factorize the stiffness of `elements`
    ///
    /// The sparse solver never forms a dense `n × n` matrix unless its
    /// Cholesky pivot test trips, in which case the free-free block is handed
    /// to the dense LU so both solvers reject exactly the same systems.
    pub fn assemble(index: &ModelIndex<'_>, elements: &[FrameElement<'_>], options: &AnalysisOptions) -> Self {
        let dofs = index.model().total_dofs();
        let (free, fixed) = partition_dofs(index);

        let (stiffness, factorization) = match options.solver {
            SolverKind::Dense => {
                let k = assemble_dense(elements, dofs);
                let k_ff = sub_matrix(&k, &free, &free);
                let max_abs = k_ff.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
                let threshold = pivot_threshold(options.pivot_tolerance, max_abs, options.relative_pivot);
                let lu = LuDecomposition::new(&k_ff, threshold).map(Factorization::Dense);
                (GlobalStiffness::Dense(k), lu)
            }
            SolverKind::Sparse => {
                let k = assemble_sparse(elements, dofs);
                let k_ff = principal_submatrix(&k, &free);
                debug!("sparse free-free block: {} of {} entries stored", k_ff.nnz(), free.len() * free.len());
                let threshold =
                    pivot_threshold(options.pivot_tolerance, sparse::max_abs(&k_ff), options.relative_pivot);
                let factorization = match SkylineCholesky::factorize(&k_ff, threshold) {
                    Ok(cholesky) => Ok(Factorization::Sparse(cholesky)),
                    Err(FrameError::SingularMatrix) => {
                        warn!("skyline Cholesky pivot below threshold; checking with dense LU");
                        LuDecomposition::new(&sparse::to_dense(&k_ff), threshold).map(Factorization::Dense)
                    }
                    Err(e) => Err(e),
                };
                (GlobalStiffness::Sparse(k), factorization)
            }
        };

        Self {
            dofs,
            stiffness,
            free,
            fixed,
            factorization,
        }
    }

    /// Dense copy of the full global stiffness matrix
    pub fn stiffness(&self) -> Mat {
        self.stiffness.to_dense()
    }

    /// Unrestrained DOFs in ascending order
    pub fn free_dofs(&self) -> &[usize] {
        &self.free
    }

    /// Restrained DOFs in ascending order
    pub fn fixed_dofs(&self) -> &[usize] {
        &self.fixed
    }

    pub fn total_dofs(&self) -> usize {
        self.dofs
    }

    /// Whether the free-free block could be factorized
    pub fn is_solvable(&self) -> bool {
        self.factorization.is_ok()
    }

    /// Solve `K·D = P` for a full-length load vector
    pub fn solve(&self, load: &Vec) -> FrameResult<Solution> {
        let n = self.total_dofs();
        if load.len() != n {
            return Err(FrameError::DimensionMismatch {
                operation: "load vector",
                left: (n, n),
                right: (load.len(), 1),
            });
        }

        let factorization = self.factorization.as_ref().map_err(Clone::clone)?;

        let d_free = factorization.solve(&gather(load, &self.free))?;
        let displacements = scatter(&d_free, &self.free, n)?;
        let reactions = self.stiffness.multiply_vector(&displacements)? - load;

        Ok(Solution {
            displacements,
            reactions,
        })
    }
}

/// Split DOFs into free and fixed by each node's support; no support means free
fn partition_dofs(index: &ModelIndex<'_>) -> (std::vec::Vec<usize>, std::vec::Vec<usize>) {
    let mut free = std::vec::Vec::new();
    let mut fixed = std::vec::Vec::new();

    for (i, node) in index.model().nodes.iter().enumerate() {
        let restraints = index
            .support(&node.id)
            .map(|s| s.restraints())
            .unwrap_or([false; 6]);
        for (c, restrained) in restraints.into_iter().enumerate() {
            if restrained {
                fixed.push(i * 6 + c);
            } else {
                free.push(i * 6 + c);
            }
        }
    }

    (free, fixed)
}

fn assemble_dense(elements: &[FrameElement<'_>], n: usize) -> Mat {
    let mut stiffness = Mat::zeros(n, n);
    for element in elements {
        let k = element.global_stiffness();
        let dofs = element.dof_indices();
        for (r, &gr) in dofs.iter().enumerate() {
            for (c, &gc) in dofs.iter().enumerate() {
                stiffness[(gr, gc)] += k[(r, c)];
            }
        }
    }
    stiffness
}

fn assemble_sparse(elements: &[FrameElement<'_>], n: usize) -> CsrMatrix<f64> {
    let mut builder = SparseMatrixBuilder::new(n);
    for element in elements {
        builder.add_element_matrix(&element.dof_indices().map(Some), &element.global_stiffness());
    }
    builder.to_csr()
}
