//! Fixed end reactions for loads applied between member ends
//!
//! All vectors are in member local coordinates, ordered
//! [Fx_i, Fy_i, Fz_i, Mx_i, My_i, Mz_i, Fx_j, Fy_j, Fz_j, Mx_j, My_j, Mz_j],
//! and hold the forces the supports of a fixed-fixed member exert on it.

use crate::loads::{LoadDirection, MemberLoad, MemberLoadKind};
use crate::math::Vec12;

/// Intensities closer than this are treated as a uniform load
const UNIFORM_TOLERANCE: f64 = 1e-10;
/// Normalized positions closer than this to a member end count as the end
const SPAN_TOLERANCE: f64 = 1e-9;

/// Fixed end reactions of one member load on a member of the given length
pub fn fer_member_load(load: &MemberLoad, length: f64) -> Vec12 {
    match load.kind {
        MemberLoadKind::Distributed {
            start_magnitude,
            end_magnitude,
            start_position,
            end_position,
        } => fer_distributed(
            start_magnitude,
            end_magnitude,
            start_position,
            end_position,
            length,
            load.direction,
        ),
        MemberLoadKind::Point { magnitude, position } => {
            let a = position * length;
            if load.direction.is_moment() {
                fer_moment(magnitude, a, length, load.direction.axis())
            } else {
                fer_point(magnitude, a, length, load.direction.axis())
            }
        }
        MemberLoadKind::Moment { magnitude, position } => {
            fer_moment(magnitude, position * length, length, load.direction.axis())
        }
    }
}

/// Linearly varying line load between normalized positions `x1` and `x2`
///
/// A trapezoid is approximated by a uniform load at the smaller intensity plus a
/// uniform load at half the difference, which keeps the resultant but not the
/// exact fixed-end moments of the triangular part.
pub fn fer_distributed(
    w1: f64,
    w2: f64,
    x1: f64,
    x2: f64,
    length: f64,
    direction: LoadDirection,
) -> Vec12 {
    if (w1 - w2).abs() < UNIFORM_TOLERANCE {
        return fer_uniform(w1, x1, x2, length, direction);
    }

    let w_min = w1.min(w2);
    let w_half_diff = (w1.max(w2) - w_min) / 2.0;

    fer_uniform(w_min, x1, x2, length, direction)
        + fer_uniform(w_half_diff, x1, x2, length, direction)
}

/// Uniform line load of intensity `w` between normalized positions `x1` and `x2`
///
/// A full-span force load uses the closed-form fixed-end shears and moments. A
/// partial span is reduced to its resultant and split between the ends by
/// statics alone, without fixed-end moments.
pub fn fer_uniform(w: f64, x1: f64, x2: f64, length: f64, direction: LoadDirection) -> Vec12 {
    let l = length;
    let mut fer = Vec12::zeros();

    let full_span = x1 <= SPAN_TOLERANCE && x2 >= 1.0 - SPAN_TOLERANCE;
    let loaded = (x2 - x1) * l;
    let resultant = w * loaded;

    if direction.is_moment() {
        match direction.axis() {
            0 => {
                let centroid = (x1 + x2) / 2.0 * l;
                fer[3] = -resultant * (l - centroid) / l;
                fer[9] = -resultant * centroid / l;
            }
            // A distributed couple is balanced by an end shear pair only
            1 => {
                fer[2] = -resultant / l;
                fer[8] = resultant / l;
            }
            _ => {
                fer[1] = resultant / l;
                fer[7] = -resultant / l;
            }
        }
        return fer;
    }

    let axis = direction.axis();

    if full_span {
        let l2 = l * l;
        match axis {
            0 => {
                fer[0] = -w * l / 2.0;
                fer[6] = -w * l / 2.0;
            }
            1 => {
                fer[1] = -w * l / 2.0;
                fer[5] = -w * l2 / 12.0;
                fer[7] = -w * l / 2.0;
                fer[11] = w * l2 / 12.0;
            }
            _ => {
                fer[2] = -w * l / 2.0;
                fer[4] = w * l2 / 12.0;
                fer[8] = -w * l / 2.0;
                fer[10] = -w * l2 / 12.0;
            }
        }
    } else {
        let centroid = (x1 + x2) / 2.0 * l;
        fer[axis] = -resultant * (l - centroid) / l;
        fer[axis + 6] = -resultant * centroid / l;
    }

    fer
}

/// Concentrated force `p` at distance `a` from the i-node along local `axis`
pub fn fer_point(p: f64, a: f64, length: f64, axis: usize) -> Vec12 {
    let l = length;
    let b = l - a;
    let l2 = l * l;
    let l3 = l2 * l;

    let mut fer = Vec12::zeros();

    match axis {
        0 => {
            fer[0] = -p * b / l;
            fer[6] = -p * a / l;
        }
        1 => {
            fer[1] = -p * b * b * (3.0 * a + b) / l3;
            fer[5] = -p * a * b * b / l2;
            fer[7] = -p * a * a * (a + 3.0 * b) / l3;
            fer[11] = p * a * a * b / l2;
        }
        _ => {
            fer[2] = -p * b * b * (3.0 * a + b) / l3;
            fer[4] = p * a * b * b / l2;
            fer[8] = -p * a * a * (a + 3.0 * b) / l3;
            fer[10] = -p * a * a * b / l2;
        }
    }

    fer
}

/// Concentrated moment `m` at distance `a` from the i-node about local `axis`
pub fn fer_moment(m: f64, a: f64, length: f64, axis: usize) -> Vec12 {
    let l = length;
    let b = l - a;
    let l2 = l * l;
    let l3 = l2 * l;

    let mut fer = Vec12::zeros();

    match axis {
        0 => {
            fer[3] = -m * b / l;
            fer[9] = -m * a / l;
        }
        1 => {
            fer[2] = -6.0 * m * a * b / l3;
            fer[4] = m * b * (2.0 * a - b) / l2;
            fer[8] = 6.0 * m * a * b / l3;
            fer[10] = m * a * (2.0 * b - a) / l2;
        }
        _ => {
            fer[1] = 6.0 * m * a * b / l3;
            fer[5] = m * b * (2.0 * a - b) / l2;
            fer[7] = -6.0 * m * a * b / l3;
            fer[11] = m * a * (2.0 * b - a) / l2;
        }
    }

    fer
}
