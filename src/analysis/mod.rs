//! Analysis types, options and the linear static analyzer

mod analyzer;
mod system;

pub use analyzer::Analyzer;
pub use system::{AssembledSystem, Solution};

use serde::{Deserialize, Serialize};

use crate::elements::DEFAULT_NUM_POINTS;
use crate::math::linalg::PIVOT_TOLERANCE;

/// Linear solver used on the free-free stiffness block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    /// Dense LU with partial pivoting
    #[default]
    Dense,
    /// Skyline Cholesky on a sparse assembly
    Sparse,
}

/// Options for structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Solver for the free-free block
    pub solver: SolverKind,
    /// Pivot magnitude below which the system is singular
    pub pivot_tolerance: f64,
    /// Scale `pivot_tolerance` by the largest stiffness entry
    pub relative_pivot: bool,
    /// Intervals per member force diagram
    pub num_points: usize,
    /// Check static equilibrium after analysis
    pub check_statics: bool,
    /// Allowed equilibrium residual relative to the largest applied load
    pub statics_tolerance: f64,
    /// Load combination tags to analyze (None = all)
    pub combo_tags: Option<Vec<String>>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            solver: SolverKind::Dense,
            pivot_tolerance: PIVOT_TOLERANCE,
            relative_pivot: false,
            num_points: DEFAULT_NUM_POINTS,
            check_statics: false,
            statics_tolerance: 1e-6,
            combo_tags: None,
        }
    }
}

impl AnalysisOptions {
    /// Create options for linear analysis
    pub fn linear() -> Self {
        Self::default()
    }

    /// Use the sparse skyline solver
    pub fn sparse() -> Self {
        Self {
            solver: SolverKind::Sparse,
            ..Self::default()
        }
    }

    /// Set the number of force diagram intervals
    pub fn with_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    /// Set the singular pivot tolerance
    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    /// Scale the pivot tolerance by `max(1, max|K_ij|)`
    pub fn with_relative_pivot(mut self) -> Self {
        self.relative_pivot = true;
        self
    }

    /// Report the equilibrium residual with every result
    pub fn with_statics_check(mut self) -> Self {
        self.check_statics = true;
        self
    }

    /// Filter by combo tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.combo_tags = Some(tags);
        self
    }
}
