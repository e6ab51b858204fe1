//! Frame Solver - linear static analysis of 3D frames
//!
//! Direct stiffness method for structures built from two-node Euler-Bernoulli
//! beam elements:
//! - Element stiffness and local/global transformations
//! - Equivalent nodal loads from member point, moment and line loads
//! - Load cases combined by factors, solved against one factorization
//! - Nodal displacements, reactions and sampled member force diagrams
//!
//! ## Example
//! ```rust
//! use frame_solver::prelude::*;
//!
//! let mut model = Model::new();
//!
//! model.add_material(Material::steel("Steel")).unwrap();
//! model.add_section(Section::rectangular("R200x400", 200.0, 400.0)).unwrap();
//!
//! model.add_node(Node::new("N1", 0.0, 0.0, 0.0)).unwrap();
//! model.add_node(Node::new("N2", 4000.0, 0.0, 0.0)).unwrap();
//! model.add_member(Member::new("M1", "N1", "N2", "Steel", "R200x400")).unwrap();
//! model.add_support(Support::fixed("N1")).unwrap();
//!
//! model.add_load_case(LoadCase::new("Dead")).unwrap();
//! model.add_node_load("Dead", NodeLoad::fy("N2", -10_000.0)).unwrap();
//! model.add_load_combination(LoadCombination::single("D", "Dead")).unwrap();
//!
//! let analyzer = Analyzer::new(&model, AnalysisOptions::default()).unwrap();
//! let result = analyzer.analyze("D");
//!
//! assert!(result.success);
//! assert!(result.displacement("N2").unwrap().dy < 0.0);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, Analyzer, AssembledSystem, SolverKind};
    pub use crate::elements::{
        FrameElement, Material, Member, MemberReleases, Node, Section, Support,
    };
    pub use crate::error::{FrameError, FrameResult, ValidationError};
    pub use crate::loads::{
        LoadCase, LoadCombination, LoadDirection, MemberLoad, MemberLoadKind, NodeLoad,
    };
    pub use crate::model::{Model, ModelIndex};
    pub use crate::results::{
        AnalysisResult, AnalysisSummary, ForceStation, MemberResult, NodeDisplacement, Reactions,
    };
}
