//! Load direction tags

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Direction of a load
///
/// Node loads act along global axes; member loads act along the member's local axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum LoadDirection {
    /// Force along x
    Fx,
    /// Force along y
    Fy,
    /// Force along z
    Fz,
    /// Moment about x
    Mx,
    /// Moment about y
    My,
    /// Moment about z
    Mz,
}

impl LoadDirection {
    pub const ALL: [LoadDirection; 6] = [
        LoadDirection::Fx,
        LoadDirection::Fy,
        LoadDirection::Fz,
        LoadDirection::Mx,
        LoadDirection::My,
        LoadDirection::Mz,
    ];

    /// DOF offset within a node's six components
    pub fn index(self) -> usize {
        match self {
            LoadDirection::Fx => 0,
            LoadDirection::Fy => 1,
            LoadDirection::Fz => 2,
            LoadDirection::Mx => 3,
            LoadDirection::My => 4,
            LoadDirection::Mz => 5,
        }
    }

    /// Axis the force acts along (or the moment acts about): 0 = x, 1 = y, 2 = z
    pub fn axis(self) -> usize {
        self.index() % 3
    }

    pub fn is_moment(self) -> bool {
        self.index() >= 3
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadDirection::Fx => "FX",
            LoadDirection::Fy => "FY",
            LoadDirection::Fz => "FZ",
            LoadDirection::Mx => "MX",
            LoadDirection::My => "MY",
            LoadDirection::Mz => "MZ",
        }
    }
}

impl fmt::Display for LoadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadDirection {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        LoadDirection::ALL
            .into_iter()
            .find(|d| d.as_str() == upper)
            .ok_or_else(|| FrameError::InvalidInput(format!("unknown load direction '{s}'")))
    }
}

impl TryFrom<String> for LoadDirection {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
