//! Mathematical utilities for frame calculations

pub mod linalg;
pub mod sparse;

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector, Vector3};

use crate::error::{FrameError, FrameResult};

pub use linalg::{gather, scatter, solve, sub_matrix, LuDecomposition};
pub use sparse::{SkylineCholesky, SparseMatrixBuilder};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for member stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for member forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Members shorter than this are rejected as degenerate
pub const MIN_MEMBER_LENGTH: f64 = 1e-10;

/// Compute the 3x3 direction cosine matrix for a 3D frame element
///
/// # Arguments
/// * `i_node` - Start node coordinates [X, Y, Z]
/// * `j_node` - End node coordinates [X, Y, Z]
/// * `roll_degrees` - Member rotation about its longitudinal axis (degrees)
///
/// # Returns
/// Rows are the local x, y and z axes expressed in global components, so the
/// matrix maps global vectors to local ones.
pub fn rotation_matrix(i_node: &[f64; 3], j_node: &[f64; 3], roll_degrees: f64) -> FrameResult<Mat3> {
    let d = Vec3::new(
        j_node[0] - i_node[0],
        j_node[1] - i_node[1],
        j_node[2] - i_node[2],
    );
    let length = d.norm();

    if length < MIN_MEMBER_LENGTH {
        return Err(FrameError::InvalidGeometry(format!(
            "member length {length:e} is below {MIN_MEMBER_LENGTH:e}"
        )));
    }

    // Local x-axis runs from i to j
    let x = d / length;

    // Local y-axis is global Y projected onto the plane normal to x.
    // Vertical members have no such projection and fall back to -X (up) or +X (down).
    let horizontal = (x[0] * x[0] + x[2] * x[2]).sqrt();
    let y = if horizontal < MIN_MEMBER_LENGTH {
        if x[1] > 0.0 {
            Vec3::new(-1.0, 0.0, 0.0)
        } else {
            Vec3::new(1.0, 0.0, 0.0)
        }
    } else {
        let global_y = Vec3::y();
        (global_y - x * x.dot(&global_y)).normalize()
    };
    let z = x.cross(&y);

    // Roll about the local x-axis
    let (y, z) = if roll_degrees.abs() > 0.0 {
        let (sin_r, cos_r) = roll_degrees.to_radians().sin_cos();
        (y * cos_r + z * sin_r, -y * sin_r + z * cos_r)
    } else {
        (y, z)
    };

    Ok(Mat3::new(
        x[0], x[1], x[2],
        y[0], y[1], y[2],
        z[0], z[1], z[2],
    ))
}

/// Compute the 12x12 transformation matrix (global to local) for a frame element
///
/// The rotation block is repeated for the translations and rotations of both nodes.
pub fn transformation_matrix(i_node: &[f64; 3], j_node: &[f64; 3], roll_degrees: f64) -> FrameResult<Mat12> {
    let r = rotation_matrix(i_node, j_node, roll_degrees)?;
    Ok(block_diagonal(&r))
}

/// Repeat a 3x3 rotation four times along the diagonal of a 12x12 matrix
pub fn block_diagonal(r: &Mat3) -> Mat12 {
    let mut t = Mat12::zeros();
    for block in 0..4 {
        let offset = block * 3;
        t.fixed_view_mut::<3, 3>(offset, offset).copy_from(r);
    }
    t
}
