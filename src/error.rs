//! Error types for the frame solver

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single path-tagged problem found while validating a model
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{path}: {message}")]
pub struct ValidationError {
    /// Location of the offending value, e.g. `members[2].i_node`
    pub path: String,
    /// Human-readable description
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Main error type for frame analysis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Node '{0}' not found in model")]
    NodeNotFound(String),

    #[error("Member '{0}' not found in model")]
    MemberNotFound(String),

    #[error("Material '{0}' not found in model")]
    MaterialNotFound(String),

    #[error("Section '{0}' not found in model")]
    SectionNotFound(String),

    #[error("Load case '{0}' not found in model")]
    LoadCaseNotFound(String),

    #[error("Load combination '{0}' not found in model")]
    LoadCombinationNotFound(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Singular or near-singular stiffness matrix - model may be unstable or have insufficient supports")]
    SingularMatrix,

    #[error("Dimension mismatch in {operation}: {left:?} vs {right:?}")]
    DimensionMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model failed validation with {} error(s)", .0.len())]
    InvalidModel(Vec<ValidationError>),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FrameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for frame analysis operations
pub type FrameResult<T> = Result<T, FrameError>;
