//! End-to-end checks of the linear static analyzer

use approx::assert_relative_eq;
use frame_solver::math::{rotation_matrix, Vec3};
use frame_solver::prelude::*;

const E: f64 = 210_000.0;
const IZ: f64 = 1.0e6;

fn base_model() -> Model {
    let mut model = Model::new();
    model.add_material(Material::new("Steel", E, 81_000.0, 0.3, 7.85e-9)).unwrap();
    model
        .add_section(Section::new("S1", 1000.0, 1.0e6, IZ, 1.0e5))
        .unwrap();
    model
}

fn cantilever(tip_load: f64) -> Model {
    let mut model = base_model();
    model.add_node(Node::new("N1", 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new("N2", 1000.0, 0.0, 0.0)).unwrap();
    model.add_member(Member::new("M1", "N1", "N2", "Steel", "S1")).unwrap();
    model.add_support(Support::fixed("N1")).unwrap();
    model.add_load_case(LoadCase::new("A")).unwrap();
    model.add_node_load("A", NodeLoad::fy("N2", tip_load)).unwrap();
    model
        .add_load_combination(LoadCombination::single("C1", "A"))
        .unwrap();
    model
}

/// Three members in 3D with every kind of load that keeps its exact resultant
fn space_frame() -> Model {
    let mut model = base_model();
    model.add_node(Node::new("N1", 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new("N2", 0.0, 3000.0, 0.0)).unwrap();
    model.add_node(Node::new("N3", 4000.0, 3000.0, 1000.0)).unwrap();
    model.add_node(Node::new("N4", 4000.0, 0.0, 2000.0)).unwrap();

    model.add_member(Member::new("M1", "N1", "N2", "Steel", "S1")).unwrap();
    model
        .add_member(Member::new("M2", "N2", "N3", "Steel", "S1").with_rotation(30.0))
        .unwrap();
    model.add_member(Member::new("M3", "N3", "N4", "Steel", "S1")).unwrap();

    model.add_support(Support::fixed("N1")).unwrap();
    model.add_support(Support::fixed("N4")).unwrap();

    let case = LoadCase::new("A")
        .with_node_load(NodeLoad::fx("N2", 5000.0))
        .with_node_load(NodeLoad::new("N3", LoadDirection::Mz, 1.0e6))
        .with_member_load(MemberLoad::uniform("M2", LoadDirection::Fy, -2.0))
        .with_member_load(MemberLoad::point("M2", LoadDirection::Fz, 3000.0, 0.3))
        .with_member_load(MemberLoad::moment("M2", LoadDirection::My, 2.0e5, 0.6))
        .with_member_load(MemberLoad::distributed("M1", LoadDirection::Fz, -1.5, -1.5, 0.2, 0.7))
        .with_member_load(MemberLoad::uniform("M3", LoadDirection::Fx, 1.0))
        .with_member_load(MemberLoad::uniform("M3", LoadDirection::Mx, 10.0))
        .with_member_load(MemberLoad::uniform("M1", LoadDirection::Mz, 50.0));
    model.add_load_case(case).unwrap();
    model
        .add_load_combination(LoadCombination::single("C1", "A"))
        .unwrap();
    model
        .add_load_combination(LoadCombination::new("C2").with_case("A", 2.0))
        .unwrap();
    model
}

/// Applied loads reduced to forces and moments about the origin
fn applied_resultant(model: &Model, case: &LoadCase) -> [f64; 6] {
    let mut total = [0.0; 6];
    let mut add = |point: Vec3, force: Vec3, moment: Vec3| {
        let m = point.cross(&force) + moment;
        for k in 0..3 {
            total[k] += force[k];
            total[k + 3] += m[k];
        }
    };

    for load in &case.node_loads {
        let node = model.node(&load.node).unwrap();
        let mut vector = Vec3::zeros();
        vector[load.direction.axis()] = load.magnitude;
        let point = Vec3::new(node.x, node.y, node.z);
        if load.direction.is_moment() {
            add(point, Vec3::zeros(), vector);
        } else {
            add(point, vector, Vec3::zeros());
        }
    }

    for load in &case.member_loads {
        let member = model.member(&load.member).unwrap();
        let i = model.node(&member.i_node).unwrap();
        let j = model.node(&member.j_node).unwrap();
        let r = rotation_matrix(&i.coords(), &j.coords(), member.rotation).unwrap();
        let length = i.distance_to(j);

        let mut local = Vec3::zeros();
        local[load.direction.axis()] = load.resultant(length);
        let global = r.transpose() * local;

        let (start, end) = load.span();
        let t = (start + end) / 2.0;
        let point = Vec3::new(i.x, i.y, i.z) + (Vec3::new(j.x, j.y, j.z) - Vec3::new(i.x, i.y, i.z)) * t;

        if load.direction.is_moment() {
            add(point, Vec3::zeros(), global);
        } else {
            add(point, global, Vec3::zeros());
        }
    }

    total
}

#[test]
fn cantilever_tip_deflection_matches_closed_form() {
    let model = cantilever(-1000.0);
    let analyzer = Analyzer::new(&model, AnalysisOptions::default()).unwrap();
    let result = analyzer.analyze("C1");

    assert!(result.success, "{:?}", result.error);

    let expected = -1000.0 * 1000.0_f64.powi(3) / (3.0 * E * IZ);
    assert_relative_eq!(result.displacement("N2").unwrap().dy, expected, max_relative = 1e-9);
    assert_relative_eq!(result.reaction("N1").unwrap().fy, 1000.0, max_relative = 1e-9);
    assert_relative_eq!(result.reaction("N1").unwrap().mz, 1.0e6, max_relative = 1e-9);

    assert_eq!(result.summary.max_displacement.location, "N2");
    assert_eq!(result.summary.total_dofs, 12);
    assert_eq!(result.summary.free_dofs, 6);
}

#[test]
fn cantilever_under_line_load() {
    let mut model = cantilever(0.0);
    model
        .add_member_load("A", MemberLoad::uniform("M1", LoadDirection::Fy, -2.0))
        .unwrap();
    let analyzer = Analyzer::new(&model, AnalysisOptions::default()).unwrap();
    let result = analyzer.analyze("C1");
    assert!(result.success, "{:?}", result.error);

    let (w, l) = (-2.0, 1000.0_f64);
    let expected = w * l.powi(4) / (8.0 * E * IZ);
    assert_relative_eq!(result.displacement("N2").unwrap().dy, expected, max_relative = 1e-9);
    assert_relative_eq!(result.reaction("N1").unwrap().fy, -w * l, max_relative = 1e-9);

    let member = result.member("M1").unwrap();
    assert_eq!(member.stations.len(), 12);
    assert_relative_eq!(member.stations[0].moment_z.abs(), w.abs() * l * l / 2.0, max_relative = 1e-9);
    assert_relative_eq!(member.stations[11].moment_z, 0.0, epsilon = 1e-3);
    assert_relative_eq!(member.stations[11].position, l);
    assert_eq!(member.extrema.moment_z.position, 0.0);
    assert_eq!(result.summary.max_moment.location, "M1");
}

#[test]
fn fixed_fixed_point_load_matches_beam_table() {
    let (p, l, a) = (-10.0, 8.0, 2.0);
    let b = l - a;

    let mut model = base_model();
    model.add_node(Node::new("N1", 0.0, 0.0, 0.0)).unwrap();
    model.add_node(Node::new("N2", l, 0.0, 0.0)).unwrap();
    model.add_member(Member::new("M1", "N1", "N2", "Steel", "S1")).unwrap();
    model.add_support(Support::fixed("N1")).unwrap();
    model.add_support(Support::fixed("N2")).unwrap();
    model
        .add_load_case(LoadCase::new("A").with_member_load(MemberLoad::point(
            "M1",
            LoadDirection::Fy,
            p,
            a / l,
        )))
        .unwrap();
    model
        .add_load_combination(LoadCombination::single("C1", "A"))
        .unwrap();

    let analyzer = Analyzer::new(&model, AnalysisOptions::default()).unwrap();
    let result = analyzer.analyze("C1");
    assert!(result.success, "{:?}", result.error);

    let r1 = result.reaction("N1").unwrap();
    let r2 = result.reaction("N2").unwrap();
    assert_relative_eq!(r1.fy, -p * b * b * (3.0 * a + b) / l.powi(3), max_relative = 1e-12);
    assert_relative_eq!(r2.fy, -p * a * a * (a + 3.0 * b) / l.powi(3), max_relative = 1e-12);
    assert_relative_eq!(r1.mz, -p * a * b * b / (l * l), max_relative = 1e-12);
    assert_relative_eq!(r2.mz, p * a * a * b / (l * l), max_relative = 1e-12);
    assert_relative_eq!(r1.fy + r2.fy, -p, max_relative = 1e-12);
}

#[test]
fn space_frame_is_in_equilibrium() {
    let model = space_frame();
    let analyzer = Analyzer::new(&model, AnalysisOptions::default().with_statics_check()).unwrap();
    let result = analyzer.analyze("C1");
    assert!(result.success, "{:?}", result.error);

    let applied = applied_resultant(&model, model.load_case("A").unwrap());
    let mut reactions = [0.0; 6];
    for (id, node) in &result.nodes {
        let n = model.node(id).unwrap();
        let r = node.reaction.to_array();
        let force = Vec3::new(r[0], r[1], r[2]);
        let moment = Vec3::new(n.x, n.y, n.z).cross(&force) + Vec3::new(r[3], r[4], r[5]);
        for k in 0..3 {
            reactions[k] += r[k];
            reactions[k + 3] += moment[k];
        }
    }

    let scale = applied.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    for k in 0..6 {
        assert!(
            (applied[k] + reactions[k]).abs() < 1e-6 * scale,
            "component {k}: applied {} reactions {}",
            applied[k],
            reactions[k]
        );
    }

    let residual = result.equilibrium.unwrap();
    for r in residual {
        assert!(r.abs() < 1e-6 * scale);
    }
}

#[test]
fn global_stiffness_is_symmetric() {
    let model = space_frame();
    let analyzer = Analyzer::new(&model, AnalysisOptions::default()).unwrap();
    let k = analyzer.global_stiffness();

    let scale = k.amax();
    for r in 0..k.nrows() {
        for c in (r + 1)..k.ncols() {
            assert!((k[(r, c)] - k[(c, r)]).abs() <= 1e-12 * scale, "K[{r}][{c}]");
        }
    }
}

#[test]
fn repeated_analysis_is_bit_identical() {
    let model = space_frame();
    let analyzer = Analyzer::new(&model, AnalysisOptions::default()).unwrap();

    let first = analyzer.analyze("C1");
    let second = analyzer.analyze("C1");
    assert_eq!(first, second);

    let batch = analyzer.analyze_all();
    assert_eq!(batch[0], first);
    assert_eq!(batch[1].combination, "C2");
}

#[test]
fn doubled_factor_doubles_results() {
    let model = space_frame();
    let analyzer = Analyzer::new(&model, AnalysisOptions::default()).unwrap();
    let once = analyzer.analyze("C1");
    let twice = analyzer.analyze("C2");
    assert!(once.success && twice.success);

    for (id, node) in &once.nodes {
        let doubled = &twice.nodes[id];
        let pairs = node
            .displacement
            .to_array()
            .into_iter()
            .zip(doubled.displacement.to_array())
            .chain(node.reaction.to_array().into_iter().zip(doubled.reaction.to_array()));
        for (a, b) in pairs {
            assert_relative_eq!(2.0 * a, b, max_relative = 1e-12, epsilon = 1e-12);
        }
    }

    for (id, member) in &once.members {
        let doubled = &twice.members[id];
        for (s1, s2) in member.stations.iter().zip(&doubled.stations) {
            for (a, b) in s1.to_array().into_iter().zip(s2.to_array()) {
                assert_relative_eq!(2.0 * a, b, max_relative = 1e-12, epsilon = 1e-9);
            }
        }
    }

    assert_relative_eq!(
        2.0 * once.summary.max_displacement.value,
        twice.summary.max_displacement.value,
        max_relative = 1e-12
    );
}

fn validation_messages(model: &Model) -> Vec<String> {
    match Analyzer::new(model, AnalysisOptions::default()) {
        Err(FrameError::InvalidModel(errors)) => errors.into_iter().map(|e| e.message).collect(),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("model accepted"),
    }
}

#[test]
fn unsupported_structure_is_rejected() {
    let mut model = cantilever(-1000.0);
    model.supports.clear();
    assert_eq!(validation_messages(&model), ["model has no supports"]);
}

#[test]
fn unrestrained_translation_is_rejected() {
    let mut model = cantilever(-1000.0);
    // Everything held except translation in Z
    model.supports = vec![Support::with_restraints("N1", true, true, false, true, true, true)];
    assert_eq!(validation_messages(&model), ["no support restrains translation in Z"]);
}

#[test]
fn non_finite_coordinate_is_rejected() {
    let mut model = cantilever(-1000.0);
    model.nodes[1].x = f64::NAN;
    assert_eq!(validation_messages(&model), ["node 'N2' has non-finite coordinates"]);
}

#[test]
fn pinned_cantilever_is_a_mechanism() {
    let mut model = cantilever(-1000.0);
    // Free to spin about the pin
    model.supports = vec![Support::pinned("N1")];

    for options in [AnalysisOptions::default(), AnalysisOptions::sparse()] {
        let analyzer = Analyzer::new(&model, options).unwrap();
        assert!(!analyzer.system().is_solvable());

        let result = analyzer.analyze("C1");
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Singular"));
        assert!(result.nodes.is_empty());
    }
}

/// Straight cantilever of `segments` members, `spacing` apart along X, unit tip load in -Y
fn long_chain(segments: usize, spacing: f64) -> Model {
    let mut model = base_model();
    for k in 0..=segments {
        model.add_node(Node::new(&format!("N{k}"), k as f64 * spacing, 0.0, 0.0)).unwrap();
    }
    for k in 0..segments {
        let (i, j) = (format!("N{k}"), format!("N{}", k + 1));
        model.add_member(Member::new(&format!("M{k}"), &i, &j, "Steel", "S1")).unwrap();
    }
    model.add_support(Support::fixed("N0")).unwrap();
    model.add_load_case(LoadCase::new("A")).unwrap();
    model
        .add_node_load("A", NodeLoad::fy(&format!("N{segments}"), -1.0))
        .unwrap();
    model
        .add_load_combination(LoadCombination::single("C1", "A"))
        .unwrap();
    model
}

#[test]
fn long_chain_solves_on_both_solvers() {
    let (segments, spacing) = (150, 1000.0);
    let model = long_chain(segments, spacing);
    let tip = format!("N{segments}");
    let length = segments as f64 * spacing;
    let expected = -length.powi(3) / (3.0 * E * IZ);

    // The relative pivot scale trips the skyline factor on this chain
    let option_sets = [
        (AnalysisOptions::default(), AnalysisOptions::sparse()),
        (
            AnalysisOptions::default().with_relative_pivot(),
            AnalysisOptions::sparse().with_relative_pivot(),
        ),
    ];

    for (dense_options, sparse_options) in option_sets {
        let dense = Analyzer::new(&model, dense_options).unwrap().analyze("C1");
        let sparse = Analyzer::new(&model, sparse_options).unwrap().analyze("C1");
        assert!(dense.success, "{:?}", dense.error);
        assert!(sparse.success, "{:?}", sparse.error);

        let dense_tip = dense.displacement(&tip).unwrap().dy;
        let sparse_tip = sparse.displacement(&tip).unwrap().dy;
        assert_relative_eq!(dense_tip, expected, max_relative = 1e-3);
        assert_relative_eq!(sparse_tip, dense_tip, max_relative = 1e-3);
        assert_relative_eq!(sparse.reaction("N0").unwrap().fy, 1.0, max_relative = 1e-3);
    }
}

#[test]
fn sparse_solver_matches_dense() {
    let model = space_frame();
    let dense = Analyzer::new(&model, AnalysisOptions::default()).unwrap().analyze("C1");
    let sparse = Analyzer::new(&model, AnalysisOptions::sparse()).unwrap().analyze("C1");
    assert!(dense.success && sparse.success);

    for (id, node) in &dense.nodes {
        let other = &sparse.nodes[id];
        for (a, b) in node.displacement.to_array().into_iter().zip(other.displacement.to_array()) {
            assert_relative_eq!(a, b, max_relative = 1e-8, epsilon = 1e-12);
        }
    }
}

#[test]
fn missing_combination_does_not_disturb_others() {
    let model = cantilever(-1000.0);
    let analyzer = Analyzer::new(&model, AnalysisOptions::default()).unwrap();

    let before = analyzer.analyze("C1");
    let missing = analyzer.analyze("C9");
    let after = analyzer.analyze("C1");

    assert!(!missing.success);
    assert_eq!(missing.combination, "C9");
    assert!(missing.error.unwrap().contains("C9"));
    assert_eq!(before, after);
}

#[test]
fn zero_length_member_is_rejected() {
    let mut model = cantilever(-1000.0);
    model.add_node(Node::new("N3", 1000.0, 0.0, 0.0)).unwrap();
    model.add_member(Member::new("M2", "N2", "N3", "Steel", "S1")).unwrap();

    assert_eq!(validation_messages(&model), ["member 'M2' has zero length"]);
}
