//! Linear static analysis of a frame model

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::elements::{FrameElement, Member};
use crate::error::{FrameError, FrameResult};
use crate::loads::{LoadCombination, MemberLoad};
use crate::math::{Mat, Vec};
use crate::model::{Model, ModelIndex};
use crate::results::{
    AnalysisResult, AnalysisSummary, MemberResult, NodeDisplacement, NodeResult, Reactions,
};

use super::{AnalysisOptions, AssembledSystem, Solution};

/// Direct stiffness analyzer bound to one model
///
/// Elements, the DOF partition and the factorized stiffness are built once in
/// [`Analyzer::new`]; every [`Analyzer::analyze`] call only borrows them, so
/// combinations can be solved in any order or in parallel.
pub struct Analyzer<'a> {
    model: &'a Model,
    options: AnalysisOptions,
    index: ModelIndex<'a>,
    elements: std::vec::Vec<FrameElement<'a>>,
    system: AssembledSystem,
}

impl<'a> Analyzer<'a> {
    /// Validate the model, build elements and assemble the global stiffness
    ///
    /// Fails with [`FrameError::InvalidModel`] when [`Model::validate`] finds
    /// anything. A singular stiffness does not fail here; it is reported by
    /// each analysis.
    pub fn new(model: &'a Model, options: AnalysisOptions) -> FrameResult<Self> {
        model.validate().map_err(FrameError::InvalidModel)?;

        let index = model.index();
        let elements = model
            .members
            .iter()
            .map(|member| build_element(&index, member))
            .collect::<FrameResult<std::vec::Vec<_>>>()?;

        let system = AssembledSystem::assemble(&index, &elements, &options);

        info!(
            "assembled {} nodes, {} members: {} DOFs ({} free, {:?} solver)",
            model.nodes.len(),
            elements.len(),
            system.total_dofs(),
            system.free_dofs().len(),
            options.solver
        );
        if !system.is_solvable() {
            warn!("stiffness matrix is singular; every combination will fail");
        }

        Ok(Self {
            model,
            options,
            index,
            elements,
            system,
        })
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn elements(&self) -> &[FrameElement<'a>] {
        &self.elements
    }

    pub fn system(&self) -> &AssembledSystem {
        &self.system
    }

    /// Dense copy of the full global stiffness matrix
    pub fn global_stiffness(&self) -> Mat {
        self.system.stiffness()
    }

    /// Analyze one load combination by name
    ///
    /// Never fails; problems come back as a result with `success == false`.
    pub fn analyze(&self, combination: &str) -> AnalysisResult {
        match self.model.load_combination(combination) {
            Some(combo) => self.analyze_combination(combo),
            None => {
                let err = FrameError::LoadCombinationNotFound(combination.to_string());
                warn!("{err}");
                AnalysisResult::failed(combination, err)
            }
        }
    }

    /// Analyze every combination that passes the tag filter, in parallel
    ///
    /// Results come back in model order.
    pub fn analyze_all(&self) -> std::vec::Vec<AnalysisResult> {
        let selected: std::vec::Vec<&LoadCombination> = self
            .model
            .load_combinations
            .iter()
            .filter(|c| match &self.options.combo_tags {
                Some(tags) => c.has_any_tag(tags),
                None => true,
            })
            .collect();

        debug!("analyzing {} load combinations", selected.len());

        selected
            .into_par_iter()
            .map(|combo| self.analyze_combination(combo))
            .collect()
    }

    /// Analyze a combination, turning any error into a failed result
    pub fn analyze_combination(&self, combo: &LoadCombination) -> AnalysisResult {
        match self.try_analyze(combo) {
            Ok(result) => result,
            Err(err) => {
                warn!("combination '{}' failed: {err}", combo.name);
                AnalysisResult::failed(&combo.name, err)
            }
        }
    }

    /// Combined global load vector: nodal loads minus the global fixed end
    /// reactions of member loads, weighted by the combination factors
    pub fn load_vector(&self, combo: &LoadCombination) -> FrameResult<Vec> {
        let mut load = Vec::zeros(self.system.total_dofs());

        for (case_name, &factor) in &combo.factors {
            let case = self
                .index
                .load_case(case_name)
                .ok_or_else(|| FrameError::LoadCaseNotFound(case_name.clone()))?;

            for node_load in &case.node_loads {
                let index = self
                    .index
                    .node_index(&node_load.node)
                    .ok_or_else(|| FrameError::NodeNotFound(node_load.node.clone()))?;
                load[index * 6 + node_load.direction.index()] += factor * node_load.magnitude;
            }

            for member_load in &case.member_loads {
                let element = self.element(&member_load.member)?;
                let fer = element.fixed_end_reactions(std::slice::from_ref(member_load));
                for (k, &dof) in element.dof_indices().iter().enumerate() {
                    load[dof] -= factor * fer[k];
                }
            }
        }

        Ok(load)
    }

    /// Member loads of every case in the combination, scaled by their factors
    pub fn combined_member_loads(&self, combo: &LoadCombination) -> FrameResult<std::vec::Vec<MemberLoad>> {
        let mut loads = std::vec::Vec::new();
        for (case_name, &factor) in &combo.factors {
            let case = self
                .index
                .load_case(case_name)
                .ok_or_else(|| FrameError::LoadCaseNotFound(case_name.clone()))?;
            loads.extend(case.member_loads.iter().map(|l| l.scaled(factor)));
        }
        Ok(loads)
    }

    fn element(&self, id: &str) -> FrameResult<&FrameElement<'a>> {
        self.index
            .member_index(id)
            .map(|i| &self.elements[i])
            .ok_or_else(|| FrameError::MemberNotFound(id.to_string()))
    }

    fn try_analyze(&self, combo: &LoadCombination) -> FrameResult<AnalysisResult> {
        debug!(
            "solving '{}' over {} free DOFs",
            combo.name,
            self.system.free_dofs().len()
        );

        let load = self.load_vector(combo)?;
        let solution = self.system.solve(&load)?;

        let nodes = self.node_results(&solution);
        let members = self.member_results(combo, &solution.displacements)?;

        let mut summary = AnalysisSummary::from_results(&nodes, &members);
        summary.total_dofs = self.system.total_dofs();
        summary.free_dofs = self.system.free_dofs().len();

        let equilibrium = if self.options.check_statics {
            Some(self.check_statics(&combo.name, &load, &solution))
        } else {
            None
        };

        Ok(AnalysisResult {
            combination: combo.name.clone(),
            success: true,
            error: None,
            nodes,
            members,
            summary,
            equilibrium,
        })
    }

    fn node_results(&self, solution: &Solution) -> BTreeMap<String, NodeResult> {
        self.model
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let d: [f64; 6] = std::array::from_fn(|c| solution.displacements[i * 6 + c]);
                let r: [f64; 6] = std::array::from_fn(|c| solution.reactions[i * 6 + c]);
                (
                    node.id.clone(),
                    NodeResult {
                        displacement: NodeDisplacement::from_array(d),
                        reaction: Reactions::from_array(r),
                    },
                )
            })
            .collect()
    }

    fn member_results(
        &self,
        combo: &LoadCombination,
        displacements: &Vec,
    ) -> FrameResult<BTreeMap<String, MemberResult>> {
        let loads = self.combined_member_loads(combo)?;
        self.elements
            .iter()
            .map(|element| {
                let result = element.member_forces(displacements, &loads, self.options.num_points)?;
                Ok((element.id().to_string(), result))
            })
            .collect()
    }

    /// Sum of applied equivalent loads and reactions, forces and moments
    /// about the global origin
    fn check_statics(&self, combo: &str, load: &Vec, solution: &Solution) -> [f64; 6] {
        let mut residual = [0.0; 6];

        for (i, node) in self.model.nodes.iter().enumerate() {
            let f: [f64; 6] = std::array::from_fn(|c| load[i * 6 + c] + solution.reactions[i * 6 + c]);
            let [x, y, z] = node.coords();

            for c in 0..3 {
                residual[c] += f[c];
            }
            residual[3] += f[3] + y * f[2] - z * f[1];
            residual[4] += f[4] + z * f[0] - x * f[2];
            residual[5] += f[5] + x * f[1] - y * f[0];
        }

        let scale = load.amax().max(1.0);
        let worst = residual.iter().fold(0.0_f64, |m, r| m.max(r.abs()));
        if worst > self.options.statics_tolerance * scale {
            warn!("combination '{combo}' is out of equilibrium by {worst:e}");
        }

        residual
    }
}

/// Resolve a member's references into a frame element
fn build_element<'a>(index: &ModelIndex<'a>, member: &'a Member) -> FrameResult<FrameElement<'a>> {
    let resolve_node = |id: &str| {
        index
            .node_index(id)
            .map(|i| (&index.model().nodes[i], i))
            .ok_or_else(|| FrameError::NodeNotFound(id.to_string()))
    };

    let material = index
        .material(&member.material)
        .ok_or_else(|| FrameError::MaterialNotFound(member.material.clone()))?;
    let section = index
        .section(&member.section)
        .ok_or_else(|| FrameError::SectionNotFound(member.section.clone()))?;

    FrameElement::new(
        member,
        resolve_node(&member.i_node)?,
        resolve_node(&member.j_node)?,
        material,
        section,
    )
}
