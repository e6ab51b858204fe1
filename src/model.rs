//! Structural model - the aggregate analyzed by the solver

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::elements::{Material, Member, Node, Section, Support};
use crate::error::{FrameError, FrameResult, ValidationError};
use crate::loads::{LoadCase, LoadCombination, MemberLoad, MemberLoadKind, NodeLoad};
use crate::math::MIN_MEMBER_LENGTH;

/// A 3D frame model
///
/// Collections keep insertion order, which fixes node DOF numbering and the
/// order results are produced in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub supports: Vec<Support>,
    #[serde(default)]
    pub load_cases: Vec<LoadCase>,
    #[serde(default)]
    pub load_combinations: Vec<LoadCombination>,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a model from JSON
    pub fn from_json(json: &str) -> FrameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the model to pretty-printed JSON
    pub fn to_json(&self) -> FrameResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ========================
    // Lookup
    // ========================

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Position of a node in the node list, which fixes its DOF numbers
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Support defined at a node, if any
    pub fn support(&self, node: &str) -> Option<&Support> {
        self.supports.iter().find(|s| s.node == node)
    }

    pub fn load_case(&self, name: &str) -> Option<&LoadCase> {
        self.load_cases.iter().find(|c| c.name == name)
    }

    pub fn load_combination(&self, name: &str) -> Option<&LoadCombination> {
        self.load_combinations.iter().find(|c| c.name == name)
    }

    /// Hash lookups by id, for repeated resolution over large models
    pub fn index(&self) -> ModelIndex<'_> {
        ModelIndex::new(self)
    }

    /// Total DOFs, six per node
    pub fn total_dofs(&self) -> usize {
        self.nodes.len() * 6
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node to the model
    pub fn add_node(&mut self, node: Node) -> FrameResult<()> {
        if self.node(&node.id).is_some() {
            return Err(FrameError::DuplicateName(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Add a material to the model
    pub fn add_material(&mut self, material: Material) -> FrameResult<()> {
        if self.material(&material.id).is_some() {
            return Err(FrameError::DuplicateName(material.id));
        }
        self.materials.push(material);
        Ok(())
    }

    /// Add a section to the model
    pub fn add_section(&mut self, section: Section) -> FrameResult<()> {
        if self.section(&section.id).is_some() {
            return Err(FrameError::DuplicateName(section.id));
        }
        self.sections.push(section);
        Ok(())
    }

    /// Add a member to the model
    pub fn add_member(&mut self, member: Member) -> FrameResult<()> {
        // Validate references exist
        if self.node(&member.i_node).is_none() {
            return Err(FrameError::NodeNotFound(member.i_node));
        }
        if self.node(&member.j_node).is_none() {
            return Err(FrameError::NodeNotFound(member.j_node));
        }
        if self.material(&member.material).is_none() {
            return Err(FrameError::MaterialNotFound(member.material));
        }
        if self.section(&member.section).is_none() {
            return Err(FrameError::SectionNotFound(member.section));
        }
        if self.member(&member.id).is_some() {
            return Err(FrameError::DuplicateName(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    /// Add a support; a node takes at most one
    pub fn add_support(&mut self, support: Support) -> FrameResult<()> {
        if self.node(&support.node).is_none() {
            return Err(FrameError::NodeNotFound(support.node));
        }
        if self.support(&support.node).is_some() {
            return Err(FrameError::DuplicateName(support.node));
        }
        self.supports.push(support);
        Ok(())
    }

    /// Add a load case
    pub fn add_load_case(&mut self, case: LoadCase) -> FrameResult<()> {
        if self.load_case(&case.name).is_some() {
            return Err(FrameError::DuplicateName(case.name));
        }
        self.load_cases.push(case);
        Ok(())
    }

    /// Add a node load to an existing load case
    pub fn add_node_load(&mut self, case: &str, load: NodeLoad) -> FrameResult<()> {
        if self.node(&load.node).is_none() {
            return Err(FrameError::NodeNotFound(load.node));
        }
        self.load_case_mut(case)?.node_loads.push(load);
        Ok(())
    }

    /// Add a member load to an existing load case
    pub fn add_member_load(&mut self, case: &str, load: MemberLoad) -> FrameResult<()> {
        if self.member(&load.member).is_none() {
            return Err(FrameError::MemberNotFound(load.member));
        }
        self.load_case_mut(case)?.member_loads.push(load);
        Ok(())
    }

    /// Add a load combination; every case it references must exist
    pub fn add_load_combination(&mut self, combo: LoadCombination) -> FrameResult<()> {
        if let Some(case) = combo.factors.keys().find(|c| self.load_case(c).is_none()) {
            return Err(FrameError::LoadCaseNotFound(case.clone()));
        }
        if self.load_combination(&combo.name).is_some() {
            return Err(FrameError::DuplicateName(combo.name));
        }
        self.load_combinations.push(combo);
        Ok(())
    }

    fn load_case_mut(&mut self, name: &str) -> FrameResult<&mut LoadCase> {
        self.load_cases
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| FrameError::LoadCaseNotFound(name.to_string()))
    }

    // ========================
    // Validation
    // ========================

    /// Check the model for anything that would make an analysis meaningless
    ///
    /// All problems are collected, each tagged with the path of the offending
    /// value (`members[2].i_node`).
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let index = self.index();
        let mut errors = Vec::new();

        check_unique("nodes", self.nodes.iter().map(|n| n.id.as_str()), &mut errors);
        check_unique("materials", self.materials.iter().map(|m| m.id.as_str()), &mut errors);
        check_unique("sections", self.sections.iter().map(|s| s.id.as_str()), &mut errors);
        check_unique("members", self.members.iter().map(|m| m.id.as_str()), &mut errors);
        check_unique("load_cases", self.load_cases.iter().map(|c| c.name.as_str()), &mut errors);
        check_unique(
            "load_combinations",
            self.load_combinations.iter().map(|c| c.name.as_str()),
            &mut errors,
        );

        for (i, node) in self.nodes.iter().enumerate() {
            if !node.coords().iter().all(|c| c.is_finite()) {
                errors.push(ValidationError::new(
                    format!("nodes[{i}]"),
                    format!("node '{}' has non-finite coordinates", node.id),
                ));
            }
        }

        for (i, material) in self.materials.iter().enumerate() {
            for (field, value) in [("e", material.e), ("g", material.g)] {
                check_positive(&format!("materials[{i}].{field}"), value, &mut errors);
            }
        }

        for (i, section) in self.sections.iter().enumerate() {
            for (field, value) in [
                ("a", section.a),
                ("iy", section.iy),
                ("iz", section.iz),
                ("j", section.j),
            ] {
                check_positive(&format!("sections[{i}].{field}"), value, &mut errors);
            }
        }

        for (i, member) in self.members.iter().enumerate() {
            validate_member(&index, i, member, &mut errors);
        }

        self.validate_supports(&index, &mut errors);

        for (c, case) in self.load_cases.iter().enumerate() {
            for (k, load) in case.node_loads.iter().enumerate() {
                let path = format!("load_cases[{c}].node_loads[{k}]");
                if index.node(&load.node).is_none() {
                    errors.push(ValidationError::new(
                        format!("{path}.node"),
                        format!("unknown node '{}'", load.node),
                    ));
                }
                if !load.magnitude.is_finite() {
                    errors.push(ValidationError::new(
                        format!("{path}.magnitude"),
                        "magnitude must be finite",
                    ));
                }
            }
            for (k, load) in case.member_loads.iter().enumerate() {
                let path = format!("load_cases[{c}].member_loads[{k}]");
                validate_member_load(&index, &path, load, &mut errors);
            }
        }

        for (c, combo) in self.load_combinations.iter().enumerate() {
            for (case, factor) in &combo.factors {
                let path = format!("load_combinations[{c}].factors.{case}");
                if index.load_case(case).is_none() {
                    errors.push(ValidationError::new(path, format!("unknown load case '{case}'")));
                } else if !factor.is_finite() {
                    errors.push(ValidationError::new(path, "factor must be finite"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_supports(&self, index: &ModelIndex<'_>, errors: &mut Vec<ValidationError>) {
        let mut seen = HashSet::new();
        for (i, support) in self.supports.iter().enumerate() {
            let path = format!("supports[{i}].node");
            if index.node(&support.node).is_none() {
                errors.push(ValidationError::new(
                    path,
                    format!("unknown node '{}'", support.node),
                ));
            } else if !seen.insert(support.node.as_str()) {
                errors.push(ValidationError::new(
                    path,
                    format!("node '{}' has more than one support", support.node),
                ));
            }
        }

        if !self.supports.iter().any(Support::is_supported) {
            errors.push(ValidationError::new("supports", "model has no supports"));
            return;
        }

        for (axis, label) in ["X", "Y", "Z"].iter().enumerate() {
            if !self.supports.iter().any(|s| s.restraints()[axis]) {
                errors.push(ValidationError::new(
                    "supports",
                    format!("no support restrains translation in {label}"),
                ));
            }
        }
    }
}

fn validate_member(
    index: &ModelIndex<'_>,
    i: usize,
    member: &Member,
    errors: &mut Vec<ValidationError>,
) {
    let path = format!("members[{i}]");

    let i_node = index.node(&member.i_node);
    let j_node = index.node(&member.j_node);
    if i_node.is_none() {
        errors.push(ValidationError::new(
            format!("{path}.i_node"),
            format!("unknown node '{}'", member.i_node),
        ));
    }
    if j_node.is_none() {
        errors.push(ValidationError::new(
            format!("{path}.j_node"),
            format!("unknown node '{}'", member.j_node),
        ));
    }
    if index.material(&member.material).is_none() {
        errors.push(ValidationError::new(
            format!("{path}.material"),
            format!("unknown material '{}'", member.material),
        ));
    }
    if index.section(&member.section).is_none() {
        errors.push(ValidationError::new(
            format!("{path}.section"),
            format!("unknown section '{}'", member.section),
        ));
    }

    if member.i_node == member.j_node {
        errors.push(ValidationError::new(
            format!("{path}.j_node"),
            format!("member '{}' must connect two distinct nodes", member.id),
        ));
    } else if let (Some(a), Some(b)) = (i_node, j_node) {
        if a.distance_to(b) < MIN_MEMBER_LENGTH {
            errors.push(ValidationError::new(
                path,
                format!("member '{}' has zero length", member.id),
            ));
        }
    }
}

fn validate_member_load(
    index: &ModelIndex<'_>,
    path: &str,
    load: &MemberLoad,
    errors: &mut Vec<ValidationError>,
) {
    if index.member(&load.member).is_none() {
        errors.push(ValidationError::new(
            format!("{path}.member"),
            format!("unknown member '{}'", load.member),
        ));
    }

    let in_range = |p: f64| (0.0..=1.0).contains(&p);

    match load.kind {
        MemberLoadKind::Distributed {
            start_magnitude,
            end_magnitude,
            start_position,
            end_position,
        } => {
            if !start_magnitude.is_finite() || !end_magnitude.is_finite() {
                errors.push(ValidationError::new(path, "magnitudes must be finite"));
            }
            for (field, p) in [("start_position", start_position), ("end_position", end_position)] {
                if !in_range(p) {
                    errors.push(ValidationError::new(
                        format!("{path}.{field}"),
                        format!("position {p} is outside [0, 1]"),
                    ));
                }
            }
            if start_position > end_position {
                errors.push(ValidationError::new(
                    format!("{path}.end_position"),
                    "end_position must not precede start_position",
                ));
            }
        }
        MemberLoadKind::Point { magnitude, position }
        | MemberLoadKind::Moment { magnitude, position } => {
            if !magnitude.is_finite() {
                errors.push(ValidationError::new(
                    format!("{path}.magnitude"),
                    "magnitude must be finite",
                ));
            }
            if !in_range(position) {
                errors.push(ValidationError::new(
                    format!("{path}.position"),
                    format!("position {position} is outside [0, 1]"),
                ));
            }
        }
    }
}

/// Id to position maps over a model's collections
///
/// A duplicated id resolves to its first definition, like the linear lookups
/// on [`Model`].
#[derive(Debug, Clone)]
pub struct ModelIndex<'a> {
    model: &'a Model,
    nodes: HashMap<&'a str, usize>,
    materials: HashMap<&'a str, usize>,
    sections: HashMap<&'a str, usize>,
    members: HashMap<&'a str, usize>,
    supports: HashMap<&'a str, usize>,
    load_cases: HashMap<&'a str, usize>,
}

impl<'a> ModelIndex<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            nodes: positions(model.nodes.iter().map(|n| n.id.as_str())),
            materials: positions(model.materials.iter().map(|m| m.id.as_str())),
            sections: positions(model.sections.iter().map(|s| s.id.as_str())),
            members: positions(model.members.iter().map(|m| m.id.as_str())),
            supports: positions(model.supports.iter().map(|s| s.node.as_str())),
            load_cases: positions(model.load_cases.iter().map(|c| c.name.as_str())),
        }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    /// Position of a node, which fixes its DOF numbers
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.node_index(id).map(|i| &self.model.nodes[i])
    }

    pub fn material(&self, id: &str) -> Option<&'a Material> {
        self.materials.get(id).map(|&i| &self.model.materials[i])
    }

    pub fn section(&self, id: &str) -> Option<&'a Section> {
        self.sections.get(id).map(|&i| &self.model.sections[i])
    }

    /// Position of a member in the member list
    pub fn member_index(&self, id: &str) -> Option<usize> {
        self.members.get(id).copied()
    }

    pub fn member(&self, id: &str) -> Option<&'a Member> {
        self.member_index(id).map(|i| &self.model.members[i])
    }

    /// Support defined at a node, if any
    pub fn support(&self, node: &str) -> Option<&'a Support> {
        self.supports.get(node).map(|&i| &self.model.supports[i])
    }

    pub fn load_case(&self, name: &str) -> Option<&'a LoadCase> {
        self.load_cases.get(name).map(|&i| &self.model.load_cases[i])
    }
}

fn positions<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut map = HashMap::new();
    for (i, id) in ids.enumerate() {
        map.entry(id).or_insert(i);
    }
    map
}

fn check_unique<'a>(
    collection: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (i, id) in ids.enumerate() {
        if let Some(first) = first_seen.get(id) {
            errors.push(ValidationError::new(
                format!("{collection}[{i}]"),
                format!("duplicate id '{id}' (first defined at {collection}[{first}])"),
            ));
        } else {
            first_seen.insert(id, i);
        }
    }
}

fn check_positive(path: &str, value: f64, errors: &mut Vec<ValidationError>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ValidationError::new(path, format!("must be positive, got {value}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::LoadDirection;

    fn cantilever() -> Model {
        let mut model = Model::new();
        model.add_node(Node::new("N1", 0.0, 0.0, 0.0)).unwrap();
        model.add_node(Node::new("N2", 1000.0, 0.0, 0.0)).unwrap();
        model.add_material(Material::steel("Steel")).unwrap();
        model
            .add_section(Section::new("S1", 1000.0, 1.0e6, 1.0e6, 1.0e5))
            .unwrap();
        model
            .add_member(Member::new("M1", "N1", "N2", "Steel", "S1"))
            .unwrap();
        model.add_support(Support::fixed("N1")).unwrap();
        model.add_load_case(LoadCase::new("Dead")).unwrap();
        model.add_node_load("Dead", NodeLoad::fy("N2", -1000.0)).unwrap();
        model
            .add_load_combination(LoadCombination::single("D", "Dead"))
            .unwrap();
        model
    }

    fn paths(model: &Model) -> Vec<String> {
        model
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.path)
            .collect()
    }

    #[test]
    fn test_builder_rejects_bad_references() {
        let mut model = cantilever();

        assert_eq!(
            model.add_node(Node::new("N1", 5.0, 0.0, 0.0)),
            Err(FrameError::DuplicateName("N1".to_string()))
        );
        assert_eq!(
            model.add_member(Member::new("M2", "N1", "N9", "Steel", "S1")),
            Err(FrameError::NodeNotFound("N9".to_string()))
        );
        assert_eq!(
            model.add_member(Member::new("M2", "N1", "N2", "Alu", "S1")),
            Err(FrameError::MaterialNotFound("Alu".to_string()))
        );
        assert_eq!(
            model.add_node_load("Live", NodeLoad::fy("N2", 1.0)),
            Err(FrameError::LoadCaseNotFound("Live".to_string()))
        );
        assert_eq!(
            model.add_member_load("Dead", MemberLoad::uniform("M7", LoadDirection::Fy, 1.0)),
            Err(FrameError::MemberNotFound("M7".to_string()))
        );
        assert_eq!(
            model.add_support(Support::pinned("N1")),
            Err(FrameError::DuplicateName("N1".to_string()))
        );
        assert_eq!(
            model.add_load_combination(LoadCombination::single("W", "Wind")),
            Err(FrameError::LoadCaseNotFound("Wind".to_string()))
        );
    }

    #[test]
    fn test_valid_model_passes() {
        let model = cantilever();
        assert_eq!(model.validate(), Ok(()));
        assert_eq!(model.total_dofs(), 12);
        assert_eq!(model.node_index("N2"), Some(1));
    }

    #[test]
    fn test_validation_reports_paths() {
        let mut model = cantilever();
        model.members.push(Member::new("M1", "N2", "N2", "Steel", "Missing"));
        model.load_cases[0]
            .member_loads
            .push(MemberLoad::point("M1", LoadDirection::Fy, 1.0, 1.5));

        let paths = paths(&model);
        assert!(paths.contains(&"members[1]".to_string()));
        assert!(paths.contains(&"members[1].section".to_string()));
        assert!(paths.contains(&"members[1].j_node".to_string()));
        assert!(paths.contains(&"load_cases[0].member_loads[0].position".to_string()));
    }

    #[test]
    fn test_validation_requires_supports_in_each_direction() {
        let mut model = cantilever();
        model.supports = vec![Support::with_restraints("N1", true, true, false, true, true, true)];

        let errors = model.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "supports");
        assert!(errors[0].message.contains("Z"));

        model.supports.clear();
        let errors = model.validate().unwrap_err();
        assert_eq!(errors[0].message, "model has no supports");
    }

    #[test]
    fn test_zero_length_member_flagged() {
        let mut model = cantilever();
        model.add_node(Node::new("N3", 1000.0, 0.0, 0.0)).unwrap();
        model
            .add_member(Member::new("M2", "N2", "N3", "Steel", "S1"))
            .unwrap();

        assert_eq!(paths(&model), vec!["members[1]".to_string()]);
    }

    #[test]
    fn test_index_matches_linear_lookups() {
        let mut model = cantilever();
        // Duplicate id resolves to the first definition
        model.nodes.push(Node::new("N1", 9.0, 9.0, 9.0));

        let index = model.index();
        assert_eq!(index.node_index("N2"), Some(1));
        assert_eq!(index.node("N1"), model.node("N1"));
        assert_eq!(index.node("N1").unwrap().x, 0.0);
        assert_eq!(index.material("Steel"), model.material("Steel"));
        assert_eq!(index.section("S1"), model.section("S1"));
        assert_eq!(index.member_index("M1"), Some(0));
        assert_eq!(index.support("N1"), model.support("N1"));
        assert!(index.support("N2").is_none());
        assert_eq!(index.load_case("Dead"), model.load_case("Dead"));
        assert!(index.node("N9").is_none());
    }

    #[test]
    fn test_non_finite_coordinate_flagged() {
        let mut model = cantilever();
        model.nodes[1].x = f64::NAN;
        assert_eq!(paths(&model), vec!["nodes[1]".to_string()]);
    }

    #[test]
    fn test_json_round_trip() {
        let model = cantilever();
        let json = model.to_json().unwrap();
        let back = Model::from_json(&json).unwrap();

        assert_eq!(back.nodes, model.nodes);
        assert_eq!(back.members, model.members);
        assert_eq!(back.supports, model.supports);
        assert_eq!(back.load_cases, model.load_cases);
        assert_eq!(back.load_combinations, model.load_combinations);
    }
}
