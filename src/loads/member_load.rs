//! Loads applied along a member

use serde::{Deserialize, Serialize};

use super::LoadDirection;

fn full_span_end() -> f64 {
    1.0
}

/// Type-specific parameters of a member load
///
/// Positions are normalized along the member: 0 at the i-node, 1 at the j-node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MemberLoadKind {
    /// Linearly varying line load between two positions
    Distributed {
        start_magnitude: f64,
        end_magnitude: f64,
        #[serde(default)]
        start_position: f64,
        #[serde(default = "full_span_end")]
        end_position: f64,
    },
    /// Concentrated force at a position
    Point { magnitude: f64, position: f64 },
    /// Concentrated moment at a position
    Moment { magnitude: f64, position: f64 },
}

/// A load applied to a member in its local axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLoad {
    /// Loaded member
    pub member: String,
    /// Local direction
    pub direction: LoadDirection,
    #[serde(flatten)]
    pub kind: MemberLoadKind,
}

impl MemberLoad {
    /// Create a uniform line load over the full member length
    pub fn uniform(member: &str, direction: LoadDirection, w: f64) -> Self {
        Self::distributed(member, direction, w, w, 0.0, 1.0)
    }

    /// Create a linearly varying line load between normalized positions
    pub fn distributed(
        member: &str,
        direction: LoadDirection,
        start_magnitude: f64,
        end_magnitude: f64,
        start_position: f64,
        end_position: f64,
    ) -> Self {
        Self {
            member: member.to_string(),
            direction,
            kind: MemberLoadKind::Distributed {
                start_magnitude,
                end_magnitude,
                start_position,
                end_position,
            },
        }
    }

    /// Create a concentrated force at a normalized position
    pub fn point(member: &str, direction: LoadDirection, magnitude: f64, position: f64) -> Self {
        Self {
            member: member.to_string(),
            direction,
            kind: MemberLoadKind::Point {
                magnitude,
                position,
            },
        }
    }

    /// Create a concentrated moment at a normalized position
    pub fn moment(member: &str, direction: LoadDirection, magnitude: f64, position: f64) -> Self {
        Self {
            member: member.to_string(),
            direction,
            kind: MemberLoadKind::Moment {
                magnitude,
                position,
            },
        }
    }

    /// Scale the load by a factor
    pub fn scaled(&self, factor: f64) -> Self {
        let kind = match self.kind {
            MemberLoadKind::Distributed {
                start_magnitude,
                end_magnitude,
                start_position,
                end_position,
            } => MemberLoadKind::Distributed {
                start_magnitude: start_magnitude * factor,
                end_magnitude: end_magnitude * factor,
                start_position,
                end_position,
            },
            MemberLoadKind::Point { magnitude, position } => MemberLoadKind::Point {
                magnitude: magnitude * factor,
                position,
            },
            MemberLoadKind::Moment { magnitude, position } => MemberLoadKind::Moment {
                magnitude: magnitude * factor,
                position,
            },
        };
        Self {
            member: self.member.clone(),
            direction: self.direction,
            kind,
        }
    }

    /// Normalized positions the load occupies, as (start, end)
    pub fn span(&self) -> (f64, f64) {
        match self.kind {
            MemberLoadKind::Distributed {
                start_position,
                end_position,
                ..
            } => (start_position, end_position),
            MemberLoadKind::Point { position, .. } | MemberLoadKind::Moment { position, .. } => {
                (position, position)
            }
        }
    }

    /// Total force (or moment) the load applies
    pub fn resultant(&self, length: f64) -> f64 {
        match self.kind {
            MemberLoadKind::Distributed {
                start_magnitude,
                end_magnitude,
                start_position,
                end_position,
            } => (start_magnitude + end_magnitude) / 2.0 * (end_position - start_position) * length,
            MemberLoadKind::Point { magnitude, .. } | MemberLoadKind::Moment { magnitude, .. } => {
                magnitude
            }
        }
    }
}
