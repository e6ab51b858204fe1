//! Support conditions

use serde::{Deserialize, Serialize};

/// Restraint flags at a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Supported node
    pub node: String,
    /// Restrained in X translation
    #[serde(default)]
    pub dx: bool,
    /// Restrained in Y translation
    #[serde(default)]
    pub dy: bool,
    /// Restrained in Z translation
    #[serde(default)]
    pub dz: bool,
    /// Restrained in X rotation
    #[serde(default)]
    pub rx: bool,
    /// Restrained in Y rotation
    #[serde(default)]
    pub ry: bool,
    /// Restrained in Z rotation
    #[serde(default)]
    pub rz: bool,
}

impl Support {
    /// Create a support with specific restraints
    pub fn with_restraints(
        node: &str,
        dx: bool,
        dy: bool,
        dz: bool,
        rx: bool,
        ry: bool,
        rz: bool,
    ) -> Self {
        Self {
            node: node.to_string(),
            dx,
            dy,
            dz,
            rx,
            ry,
            rz,
        }
    }

    /// Create a fully fixed support (all DOFs restrained)
    pub fn fixed(node: &str) -> Self {
        Self::with_restraints(node, true, true, true, true, true, true)
    }

    /// Create a pinned support (translations restrained, rotations free)
    pub fn pinned(node: &str) -> Self {
        Self::with_restraints(node, true, true, true, false, false, false)
    }

    /// Restraint flags as [DX, DY, DZ, RX, RY, RZ]
    pub fn restraints(&self) -> [bool; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Check if any DOF is restrained
    pub fn is_supported(&self) -> bool {
        self.restraints().iter().any(|&r| r)
    }

    /// Count number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.restraints().iter().filter(|&&r| r).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_support() {
        let support = Support::fixed("N1");
        assert_eq!(support.restraints(), [true; 6]);
        assert_eq!(support.num_restrained(), 6);
    }

    #[test]
    fn test_pinned_support() {
        let support = Support::pinned("N1");
        assert!(support.dx && support.dy && support.dz);
        assert!(!support.rx && !support.ry && !support.rz);
        assert_eq!(support.num_restrained(), 3);
    }

    #[test]
    fn test_missing_flags_are_free() {
        let support: Support = serde_json::from_str(r#"{"node":"N3","dy":true}"#).unwrap();
        assert_eq!(support.restraints(), [false, true, false, false, false, false]);
        assert!(support.is_supported());
    }
}
