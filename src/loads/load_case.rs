//! Load cases

use serde::{Deserialize, Serialize};

use super::{MemberLoad, NodeLoad};

/// A load case groups related loads under a common name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    /// Name of the load case
    pub name: String,
    /// Description of the load case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Loads applied directly to nodes
    #[serde(default)]
    pub node_loads: Vec<NodeLoad>,
    /// Loads applied along members
    #[serde(default)]
    pub member_loads: Vec<MemberLoad>,
}

impl LoadCase {
    /// Create a new, empty load case
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            node_loads: Vec::new(),
            member_loads: Vec::new(),
        }
    }

    /// Create a load case with description
    pub fn with_description(name: &str, description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::new(name)
        }
    }

    /// Add a node load
    pub fn with_node_load(mut self, load: NodeLoad) -> Self {
        self.node_loads.push(load);
        self
    }

    /// Add a member load
    pub fn with_member_load(mut self, load: MemberLoad) -> Self {
        self.member_loads.push(load);
        self
    }

    /// Check whether the case carries any loads
    pub fn is_empty(&self) -> bool {
        self.node_loads.is_empty() && self.member_loads.is_empty()
    }
}
