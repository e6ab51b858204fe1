//! Member definition - the input record for a 3D frame element (beam/column)

use serde::{Deserialize, Serialize};

/// End releases for a member
///
/// Carried through the model and serialized, but the stiffness assembly
/// treats every member end as fully fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberReleases {
    /// i-node releases [DX, DY, DZ, RX, RY, RZ]
    pub i_node: [bool; 6],
    /// j-node releases [DX, DY, DZ, RX, RY, RZ]
    pub j_node: [bool; 6],
}

impl MemberReleases {
    /// Create releases for pins at both ends (moment releases)
    pub fn pin_both() -> Self {
        Self {
            i_node: [false, false, false, false, true, true],
            j_node: [false, false, false, false, true, true],
        }
    }

    /// Get combined releases as 12-element array
    pub fn as_array(&self) -> [bool; 12] {
        let mut arr = [false; 12];
        arr[0..6].copy_from_slice(&self.i_node);
        arr[6..12].copy_from_slice(&self.j_node);
        arr
    }

    /// Check whether any DOF at either end is released
    pub fn any(&self) -> bool {
        self.as_array().iter().any(|&r| r)
    }
}

/// A 3D frame member (beam or column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique member identifier
    pub id: String,
    /// Id of the i-node (start)
    pub i_node: String,
    /// Id of the j-node (end)
    pub j_node: String,
    /// Id of the material
    pub material: String,
    /// Id of the section
    pub section: String,
    /// Roll about the longitudinal axis (degrees)
    #[serde(default)]
    pub rotation: f64,
    /// End releases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases: Option<MemberReleases>,
}

impl Member {
    /// Create a new member
    pub fn new(id: &str, i_node: &str, j_node: &str, material: &str, section: &str) -> Self {
        Self {
            id: id.to_string(),
            i_node: i_node.to_string(),
            j_node: j_node.to_string(),
            material: material.to_string(),
            section: section.to_string(),
            rotation: 0.0,
            releases: None,
        }
    }

    /// Set member roll about its longitudinal axis (degrees)
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set member end releases
    pub fn with_releases(mut self, releases: MemberReleases) -> Self {
        self.releases = Some(releases);
        self
    }
}
