//! Node loads - forces and moments applied directly to nodes

use serde::{Deserialize, Serialize};

use super::LoadDirection;

/// A force or moment applied to a node along a global direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLoad {
    /// Loaded node
    pub node: String,
    /// Global direction
    pub direction: LoadDirection,
    /// Load magnitude
    pub magnitude: f64,
}

impl NodeLoad {
    /// Create a new node load
    pub fn new(node: &str, direction: LoadDirection, magnitude: f64) -> Self {
        Self {
            node: node.to_string(),
            direction,
            magnitude,
        }
    }

    /// Create a load in X direction
    pub fn fx(node: &str, value: f64) -> Self {
        Self::new(node, LoadDirection::Fx, value)
    }

    /// Create a load in Y direction
    pub fn fy(node: &str, value: f64) -> Self {
        Self::new(node, LoadDirection::Fy, value)
    }

    /// Create a load in Z direction
    pub fn fz(node: &str, value: f64) -> Self {
        Self::new(node, LoadDirection::Fz, value)
    }

    /// Scale the load by a factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            magnitude: self.magnitude * factor,
            ..self.clone()
        }
    }
}
