//! Result types for frame analysis

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Displacement results at a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Components as [DX, DY, DZ, RX, RY, RZ]
    pub fn to_array(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Largest absolute translation component
    pub fn max_translation(&self) -> f64 {
        self.dx.abs().max(self.dy.abs()).max(self.dz.abs())
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }
}

/// Reaction forces at a node
///
/// Every node carries one; at an unsupported node the values are the
/// solver's out-of-balance residual and should be near zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction force in Z direction
    pub fz: f64,
    /// Reaction moment about X axis
    pub mx: f64,
    /// Reaction moment about Y axis
    pub my: f64,
    /// Reaction moment about Z axis
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }

    /// Components as [FX, FY, FZ, MX, MY, MZ]
    pub fn to_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }

    /// Largest absolute force component
    pub fn max_force(&self) -> f64 {
        self.fx.abs().max(self.fy.abs()).max(self.fz.abs())
    }

    /// Get total force magnitude
    pub fn force_magnitude(&self) -> f64 {
        (self.fx.powi(2) + self.fy.powi(2) + self.fz.powi(2)).sqrt()
    }
}

/// Displacement and reaction at one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub displacement: NodeDisplacement,
    pub reaction: Reactions,
}

/// Internal forces at one station along a member, in local axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceStation {
    /// Distance from the i-node
    pub position: f64,
    /// Axial force (positive = tension)
    pub axial: f64,
    /// Shear force in local y direction
    pub shear_y: f64,
    /// Shear force in local z direction
    pub shear_z: f64,
    /// Torsion
    pub torsion: f64,
    /// Bending moment about local y axis
    pub moment_y: f64,
    /// Bending moment about local z axis
    pub moment_z: f64,
}

impl ForceStation {
    /// Create from [N, Vy, Vz, T, My, Mz] at a position
    pub fn from_array(position: f64, arr: [f64; 6]) -> Self {
        Self {
            position,
            axial: arr[0],
            shear_y: arr[1],
            shear_z: arr[2],
            torsion: arr[3],
            moment_y: arr[4],
            moment_z: arr[5],
        }
    }

    /// Components as [N, Vy, Vz, T, My, Mz]
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.axial,
            self.shear_y,
            self.shear_z,
            self.torsion,
            self.moment_y,
            self.moment_z,
        ]
    }
}

/// Signed value with the largest magnitude and where it occurs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceExtremum {
    pub value: f64,
    /// Distance from the i-node
    pub position: f64,
}

/// Per-component extrema of a member force diagram
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberExtrema {
    pub axial: ForceExtremum,
    pub shear_y: ForceExtremum,
    pub shear_z: ForceExtremum,
    pub torsion: ForceExtremum,
    pub moment_y: ForceExtremum,
    pub moment_z: ForceExtremum,
}

impl MemberExtrema {
    /// Scan stations for the largest absolute value of each component.
    /// Ties keep the first station.
    pub fn from_stations(stations: &[ForceStation]) -> Self {
        let mut best = [ForceExtremum::default(); 6];
        let mut seen = false;

        for station in stations {
            for (slot, value) in best.iter_mut().zip(station.to_array()) {
                if !seen || value.abs() > slot.value.abs() {
                    *slot = ForceExtremum {
                        value,
                        position: station.position,
                    };
                }
            }
            seen = true;
        }

        Self {
            axial: best[0],
            shear_y: best[1],
            shear_z: best[2],
            torsion: best[3],
            moment_y: best[4],
            moment_z: best[5],
        }
    }
}

/// Force diagram of one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberResult {
    /// Member length
    pub length: f64,
    /// Local end forces [i-node 0..6, j-node 6..12] acting on the member
    pub end_forces: [f64; 12],
    /// Sampled internal forces from the i-node to the j-node
    pub stations: Vec<ForceStation>,
    pub extrema: MemberExtrema,
}

/// Location of a structure-wide extremum
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    /// Absolute value
    pub value: f64,
    /// Node or member id
    pub location: String,
    /// Distance along the member, for member quantities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

impl Extremum {
    fn update(&mut self, value: f64, location: &str, position: Option<f64>) {
        if value.abs() > self.value || self.location.is_empty() {
            self.value = value.abs();
            self.location = location.to_string();
            self.position = position;
        }
    }
}

/// Summary of analysis results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Largest translation component over all nodes
    pub max_displacement: Extremum,
    /// Largest reaction force component over all nodes
    pub max_reaction: Extremum,
    /// Largest bending moment about local z over all members
    pub max_moment: Extremum,
    /// Largest shear in local y over all members
    pub max_shear: Extremum,
    /// Total number of nodes
    pub num_nodes: usize,
    /// Total number of members
    pub num_members: usize,
    /// Total DOFs
    pub total_dofs: usize,
    /// Free DOFs (unknown)
    pub free_dofs: usize,
}

impl AnalysisSummary {
    /// Collect absolute extrema from node and member results
    pub fn from_results(
        nodes: &BTreeMap<String, NodeResult>,
        members: &BTreeMap<String, MemberResult>,
    ) -> Self {
        let mut summary = Self {
            num_nodes: nodes.len(),
            num_members: members.len(),
            ..Self::default()
        };

        for (id, node) in nodes {
            summary
                .max_displacement
                .update(node.displacement.max_translation(), id, None);
            summary.max_reaction.update(node.reaction.max_force(), id, None);
        }

        for (id, member) in members {
            let moment = member.extrema.moment_z;
            summary
                .max_moment
                .update(moment.value, id, Some(moment.position));
            let shear = member.extrema.shear_y;
            summary.max_shear.update(shear.value, id, Some(shear.position));
        }

        summary
    }
}

/// Outcome of analyzing one load combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Load combination name
    pub combination: String,
    pub success: bool,
    /// Failure message when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeResult>,
    #[serde(default)]
    pub members: BTreeMap<String, MemberResult>,
    #[serde(default)]
    pub summary: AnalysisSummary,
    /// Global equilibrium residual [FX, FY, FZ, MX, MY, MZ], when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equilibrium: Option<[f64; 6]>,
}

impl AnalysisResult {
    /// A failed result carrying only the error message
    pub fn failed(combination: &str, error: impl ToString) -> Self {
        Self {
            combination: combination.to_string(),
            success: false,
            error: Some(error.to_string()),
            nodes: BTreeMap::new(),
            members: BTreeMap::new(),
            summary: AnalysisSummary::default(),
            equilibrium: None,
        }
    }

    /// Displacement at a node
    pub fn displacement(&self, node: &str) -> Option<&NodeDisplacement> {
        self.nodes.get(node).map(|r| &r.displacement)
    }

    /// Reaction at a node
    pub fn reaction(&self, node: &str) -> Option<&Reactions> {
        self.nodes.get(node).map(|r| &r.reaction)
    }

    /// Force diagram of a member
    pub fn member(&self, member: &str) -> Option<&MemberResult> {
        self.members.get(member)
    }
}
