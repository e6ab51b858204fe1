//! Material properties

use serde::{Deserialize, Serialize};

/// Linear-elastic material properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Unique material identifier
    pub id: String,
    /// Modulus of elasticity (Young's modulus)
    pub e: f64,
    /// Shear modulus
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Density
    #[serde(default)]
    pub rho: f64,
}

impl Material {
    /// Create a new material with given properties
    pub fn new(id: &str, e: f64, g: f64, nu: f64, rho: f64) -> Self {
        Self {
            id: id.to_string(),
            e,
            g,
            nu,
            rho,
        }
    }

    /// Create a new isotropic material from E and nu
    /// G is calculated as E / (2 * (1 + nu))
    pub fn isotropic(id: &str, e: f64, nu: f64, rho: f64) -> Self {
        let g = e / (2.0 * (1.0 + nu));
        Self::new(id, e, g, nu, rho)
    }

    /// Structural steel in N and mm (E = 210 GPa, G = 81 GPa)
    pub fn steel(id: &str) -> Self {
        Self::new(id, 210_000.0, 81_000.0, 0.3, 7.85e-9)
    }
}
