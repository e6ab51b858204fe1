//! Two-node 3D frame element built from a member and its resolved references

use crate::error::{FrameError, FrameResult};
use crate::loads::MemberLoad;
use crate::math::{transformation_matrix, Mat12, Vec, Vec12};
use crate::results::{ForceStation, MemberExtrema, MemberResult};

use super::fixed_end::fer_member_load;
use super::{Material, Member, Node, Section};

/// Number of intervals a force diagram is split into unless told otherwise
pub const DEFAULT_NUM_POINTS: usize = 11;

/// A member bound to its nodes, material and section for analysis
///
/// Only borrows model data; the length and transformation matrix are
/// computed once on construction.
#[derive(Debug, Clone)]
pub struct FrameElement<'a> {
    member: &'a Member,
    i_node: &'a Node,
    j_node: &'a Node,
    material: &'a Material,
    section: &'a Section,
    /// Positions of the end nodes in the model's node list
    node_indices: [usize; 2],
    length: f64,
    transformation: Mat12,
}

impl<'a> FrameElement<'a> {
    /// Bind a member to its resolved references
    ///
    /// `i_index` and `j_index` are the positions of the end nodes in the model,
    /// which fix the element's global DOF numbers.
    pub fn new(
        member: &'a Member,
        (i_node, i_index): (&'a Node, usize),
        (j_node, j_index): (&'a Node, usize),
        material: &'a Material,
        section: &'a Section,
    ) -> FrameResult<Self> {
        if i_index == j_index {
            return Err(FrameError::InvalidGeometry(format!(
                "member '{}' connects node '{}' to itself",
                member.id, i_node.id
            )));
        }

        let transformation =
            transformation_matrix(&i_node.coords(), &j_node.coords(), member.rotation).map_err(
                |e| match e {
                    FrameError::InvalidGeometry(msg) => {
                        FrameError::InvalidGeometry(format!("member '{}': {msg}", member.id))
                    }
                    other => other,
                },
            )?;

        Ok(Self {
            member,
            i_node,
            j_node,
            material,
            section,
            node_indices: [i_index, j_index],
            length: i_node.distance_to(j_node),
            transformation,
        })
    }

    /// Member id
    pub fn id(&self) -> &'a str {
        &self.member.id
    }

    pub fn member(&self) -> &'a Member {
        self.member
    }

    /// End nodes as (i, j)
    pub fn nodes(&self) -> (&'a Node, &'a Node) {
        (self.i_node, self.j_node)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Global DOF numbers of the 12 element DOFs, i-node first
    pub fn dof_indices(&self) -> [usize; 12] {
        let mut dofs = [0; 12];
        for (end, &node) in self.node_indices.iter().enumerate() {
            for c in 0..6 {
                dofs[end * 6 + c] = node * 6 + c;
            }
        }
        dofs
    }

    /// Euler-Bernoulli stiffness matrix in local coordinates
    pub fn local_stiffness(&self) -> Mat12 {
        let e = self.material.e;
        let g = self.material.g;
        let Section { a, iy, iz, j, .. } = *self.section;

        let l = self.length;
        let l2 = l * l;
        let l3 = l2 * l;

        let ea_l = e * a / l;
        let gj_l = g * j / l;

        let eiy_l3 = e * iy / l3;
        let eiy_l2 = e * iy / l2;
        let eiy_l = e * iy / l;

        let eiz_l3 = e * iz / l3;
        let eiz_l2 = e * iz / l2;
        let eiz_l = e * iz / l;

        #[rustfmt::skip]
        let data = [
            // Row 0: axial at i
            ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,          -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,
            // Row 1: shear Fy at i
            0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           6.0*eiz_l2,   0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           6.0*eiz_l2,
            // Row 2: shear Fz at i
            0.0,       0.0,          12.0*eiy_l3,   0.0,    -6.0*eiy_l2,   0.0,          0.0,       0.0,          -12.0*eiy_l3,  0.0,    -6.0*eiy_l2,   0.0,
            // Row 3: torsion at i
            0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,          0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,
            // Row 4: moment My at i
            0.0,       0.0,          -6.0*eiy_l2,   0.0,    4.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    2.0*eiy_l,     0.0,
            // Row 5: moment Mz at i
            0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           4.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           2.0*eiz_l,
            // Row 6: axial at j
            -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,          ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,
            // Row 7: shear Fy at j
            0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           -6.0*eiz_l2,  0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           -6.0*eiz_l2,
            // Row 8: shear Fz at j
            0.0,       0.0,          -12.0*eiy_l3,  0.0,    6.0*eiy_l2,    0.0,          0.0,       0.0,          12.0*eiy_l3,   0.0,    6.0*eiy_l2,    0.0,
            // Row 9: torsion at j
            0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,          0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,
            // Row 10: moment My at j
            0.0,       0.0,          -6.0*eiy_l2,   0.0,    2.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    4.0*eiy_l,     0.0,
            // Row 11: moment Mz at j
            0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           2.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           4.0*eiz_l,
        ];

        Mat12::from_row_slice(&data)
    }

    /// Global-to-local transformation matrix
    pub fn transformation_matrix(&self) -> &Mat12 {
        &self.transformation
    }

    /// Stiffness matrix in global coordinates, Tᵀ·K·T
    pub fn global_stiffness(&self) -> Mat12 {
        let t = &self.transformation;
        t.transpose() * self.local_stiffness() * t
    }

    /// Local fixed end reactions of the loads that act on this member
    ///
    /// Loads on other members are ignored, so a whole case can be passed in.
    pub fn local_fixed_end_reactions(&self, loads: &[MemberLoad]) -> Vec12 {
        loads
            .iter()
            .filter(|load| load.member == self.member.id)
            .fold(Vec12::zeros(), |fer, load| {
                fer + fer_member_load(load, self.length)
            })
    }

    /// Fixed end reactions in global coordinates
    pub fn fixed_end_reactions(&self, loads: &[MemberLoad]) -> Vec12 {
        self.transformation.transpose() * self.local_fixed_end_reactions(loads)
    }

    /// Element end displacements picked out of a global displacement vector
    pub fn global_displacements(&self, displacements: &Vec) -> FrameResult<Vec12> {
        let dofs = self.dof_indices();
        if let Some(&max) = dofs.iter().max() {
            if max >= displacements.len() {
                return Err(FrameError::DimensionMismatch {
                    operation: "element displacements",
                    left: (max + 1, 1),
                    right: (displacements.len(), 1),
                });
            }
        }
        Ok(Vec12::from_fn(|k, _| displacements[dofs[k]]))
    }

    /// Local end forces acting on the member, K·d + fer
    pub fn local_end_forces(&self, displacements: &Vec, loads: &[MemberLoad]) -> FrameResult<Vec12> {
        let d_local = self.transformation * self.global_displacements(displacements)?;
        Ok(self.local_stiffness() * d_local + self.local_fixed_end_reactions(loads))
    }

    /// Sample internal forces at `num_points + 1` equally spaced stations
    ///
    /// The internal force at the i-end is the negated i-end force and at the
    /// j-end it is the j-end force. Stations in between are interpolated
    /// linearly, so the variation under span loads is not captured.
    pub fn member_forces(
        &self,
        displacements: &Vec,
        loads: &[MemberLoad],
        num_points: usize,
    ) -> FrameResult<MemberResult> {
        let f = self.local_end_forces(displacements, loads)?;
        let num_points = num_points.max(1);

        let start: [f64; 6] = std::array::from_fn(|k| -f[k]);
        let end: [f64; 6] = std::array::from_fn(|k| f[k + 6]);

        let stations: std::vec::Vec<ForceStation> = (0..=num_points)
            .map(|i| {
                let t = i as f64 / num_points as f64;
                let values = std::array::from_fn(|k| start[k] + (end[k] - start[k]) * t);
                ForceStation::from_array(t * self.length, values)
            })
            .collect();

        Ok(MemberResult {
            length: self.length,
            end_forces: std::array::from_fn(|k| f[k]),
            extrema: MemberExtrema::from_stations(&stations),
            stations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::LoadDirection;
    use approx::assert_relative_eq;

    struct Fixture {
        nodes: [Node; 2],
        member: Member,
        material: Material,
        section: Section,
    }

    fn fixture(j: (f64, f64, f64)) -> Fixture {
        Fixture {
            nodes: [Node::new("N1", 0.0, 0.0, 0.0), Node::new("N2", j.0, j.1, j.2)],
            member: Member::new("M1", "N1", "N2", "S", "R"),
            material: Material::new("S", 210000.0, 81000.0, 0.3, 0.0),
            section: Section::new("R", 1000.0, 2.0e6, 1.0e6, 1.0e5),
        }
    }

    fn element(f: &Fixture) -> FrameElement<'_> {
        FrameElement::new(
            &f.member,
            (&f.nodes[0], 0),
            (&f.nodes[1], 1),
            &f.material,
            &f.section,
        )
        .unwrap()
    }

    #[test]
    fn test_global_stiffness_symmetric() {
        let f = fixture((300.0, 400.0, 1200.0));
        let k = element(&f).global_stiffness();

        for r in 0..12 {
            for c in 0..12 {
                assert_relative_eq!(k[(r, c)], k[(c, r)], max_relative = 1e-12, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_axis_aligned_member_keeps_local_stiffness() {
        let f = fixture((1000.0, 0.0, 0.0));
        let el = element(&f);

        assert_relative_eq!(el.global_stiffness(), el.local_stiffness(), epsilon = 1e-9);
        assert_relative_eq!(el.local_stiffness()[(0, 0)], 210.0 * 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_dof_indices_follow_node_positions() {
        let f = fixture((1.0, 0.0, 0.0));
        let el = FrameElement::new(
            &f.member,
            (&f.nodes[0], 3),
            (&f.nodes[1], 1),
            &f.material,
            &f.section,
        )
        .unwrap();

        assert_eq!(el.dof_indices(), [18, 19, 20, 21, 22, 23, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_zero_length_rejected() {
        let f = fixture((0.0, 0.0, 0.0));
        let result = FrameElement::new(
            &f.member,
            (&f.nodes[0], 0),
            (&f.nodes[1], 1),
            &f.material,
            &f.section,
        );

        assert!(matches!(result, Err(FrameError::InvalidGeometry(msg)) if msg.contains("M1")));
    }

    #[test]
    fn test_fixed_end_reactions_filter_by_member() {
        let f = fixture((0.0, 10.0, 0.0));
        let el = element(&f);
        let loads = [
            MemberLoad::uniform("M1", LoadDirection::Fy, -1.0),
            MemberLoad::uniform("M2", LoadDirection::Fy, -100.0),
        ];

        let local = el.local_fixed_end_reactions(&loads);
        assert_relative_eq!(local[1] + local[7], 10.0, epsilon = 1e-12);

        // Vertical member: local y is -X, so the reaction shows up along -X
        let global = el.fixed_end_reactions(&loads);
        assert_relative_eq!(global[0] + global[6], -10.0, epsilon = 1e-12);
        assert_relative_eq!(global[1] + global[7], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_fixed_forces_equal_reactions() {
        // With both ends held, recovered end forces are exactly the fixed end reactions
        let f = fixture((8.0, 0.0, 0.0));
        let el = element(&f);
        let loads = [MemberLoad::point("M1", LoadDirection::Fy, -10.0, 0.25)];
        let d = Vec::zeros(12);

        let result = el.member_forces(&d, &loads, 4).unwrap();
        let (p, a, b, l) = (-10.0_f64, 2.0_f64, 6.0_f64, 8.0_f64);

        assert_relative_eq!(result.end_forces[1], -p * b * b * (3.0 * a + b) / l.powi(3), epsilon = 1e-12);
        assert_relative_eq!(result.end_forces[5], -p * a * b * b / (l * l), epsilon = 1e-12);
        assert_relative_eq!(result.end_forces[7], -p * a * a * (a + 3.0 * b) / l.powi(3), epsilon = 1e-12);
        assert_relative_eq!(result.end_forces[11], p * a * a * b / (l * l), epsilon = 1e-12);
        assert_eq!(result.stations.len(), 5);
    }

    #[test]
    fn test_stations_interpolate_end_forces() {
        let f = fixture((2.0, 0.0, 0.0));
        let el = element(&f);
        // Stretch the member by 1e-3
        let mut d = Vec::zeros(12);
        d[6] = 1e-3;

        let result = el.member_forces(&d, &[], 2).unwrap();
        let tension = 210000.0 * 1000.0 / 2.0 * 1e-3;

        assert_eq!(result.stations.len(), 3);
        assert_relative_eq!(result.stations[1].position, 1.0);
        for station in &result.stations {
            assert_relative_eq!(station.axial, tension, max_relative = 1e-12);
        }
        assert_relative_eq!(result.extrema.axial.value, tension, max_relative = 1e-12);
    }

    #[test]
    fn test_short_displacement_vector_rejected() {
        let f = fixture((2.0, 0.0, 0.0));
        let el = element(&f);

        assert!(matches!(
            el.member_forces(&Vec::zeros(6), &[], 2),
            Err(FrameError::DimensionMismatch { .. })
        ));
    }
}
