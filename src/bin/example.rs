//! Frame Solver Example - Simple Portal Frame
//!
//! Units are N and mm throughout (steel E = 210000 N/mm²).

use frame_solver::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== Frame Solver Example: Portal Frame ===\n");

    let model = portal_frame()?;
    if let Err(errors) = model.validate() {
        for e in &errors {
            eprintln!("  {e}");
        }
        anyhow::bail!("model failed validation");
    }

    let analyzer = Analyzer::new(&model, AnalysisOptions::default().with_statics_check())?;

    println!("Running linear analysis...\n");
    for result in analyzer.analyze_all() {
        print_result(&result);
    }

    println!("=== Analysis Complete ===");
    Ok(())
}

/// Two fixed-base columns and a beam
///
/// ```text
///     N3 -------- N4
///     |          |
///     |          |
///     N1        N2
///   Fixed     Fixed
/// ```
fn portal_frame() -> FrameResult<Model> {
    let mut model = Model::new();

    model.add_material(Material::steel("Steel"))?;
    model.add_section(Section::rectangular("Column", 300.0, 300.0))?;
    model.add_section(Section::rectangular("Beam", 250.0, 500.0))?;

    let height = 4000.0;
    let span = 6000.0;

    model.add_node(Node::new("N1", 0.0, 0.0, 0.0))?;
    model.add_node(Node::new("N2", span, 0.0, 0.0))?;
    model.add_node(Node::new("N3", 0.0, height, 0.0))?;
    model.add_node(Node::new("N4", span, height, 0.0))?;

    model.add_member(Member::new("Col1", "N1", "N3", "Steel", "Column"))?;
    model.add_member(Member::new("Col2", "N2", "N4", "Steel", "Column"))?;
    model.add_member(Member::new("Beam", "N3", "N4", "Steel", "Beam"))?;

    model.add_support(Support::fixed("N1"))?;
    model.add_support(Support::fixed("N2"))?;

    // Dead: 20 kN/m on the beam, local y is global Y for a horizontal member
    model.add_load_case(LoadCase::with_description("Dead", "Self weight and finishes"))?;
    model.add_member_load("Dead", MemberLoad::uniform("Beam", LoadDirection::Fy, -20.0))?;

    // Wind: 10 kN at roof level
    model.add_load_case(LoadCase::new("Wind"))?;
    model.add_node_load("Wind", NodeLoad::fx("N3", 10_000.0))?;

    model.add_load_combination(LoadCombination::new("1.4D").with_case("Dead", 1.4).with_tag("strength"))?;
    model.add_load_combination(
        LoadCombination::new("1.2D + 1.0W")
            .with_case("Dead", 1.2)
            .with_case("Wind", 1.0)
            .with_tag("strength"),
    )?;

    Ok(model)
}

fn print_result(result: &AnalysisResult) {
    println!("=== Results for {} ===\n", result.combination);

    if let Some(error) = &result.error {
        println!("  FAILED: {error}\n");
        return;
    }

    println!("Node Displacements:");
    for (id, node) in &result.nodes {
        let d = &node.displacement;
        println!("  {id}: DX={:.4}mm, DY={:.4}mm, RZ={:.6}rad", d.dx, d.dy, d.rz);
    }

    println!("\nSupport Reactions:");
    for id in ["N1", "N2"] {
        if let Some(r) = result.reaction(id) {
            println!(
                "  {id}: FX={:.2}kN, FY={:.2}kN, MZ={:.2}kN·m",
                r.fx / 1e3,
                r.fy / 1e3,
                r.mz / 1e6
            );
        }
    }

    println!("\nMember Forces:");
    for (id, member) in &result.members {
        let e = &member.extrema;
        println!(
            "  {id}: P={:.2}kN, Vmax={:.2}kN, Mmax={:.2}kN·m at {:.0}mm",
            e.axial.value / 1e3,
            e.shear_y.value.abs() / 1e3,
            e.moment_z.value.abs() / 1e6,
            e.moment_z.position
        );
    }

    let s = &result.summary;
    println!("\nSummary:");
    println!(
        "  Max displacement: {:.4}mm at {}",
        s.max_displacement.value, s.max_displacement.location
    );
    println!(
        "  Max reaction: {:.2}kN at {}",
        s.max_reaction.value / 1e3,
        s.max_reaction.location
    );
    println!(
        "  Max moment: {:.2}kN·m in {}",
        s.max_moment.value / 1e6,
        s.max_moment.location
    );
    if let Some(residual) = result.equilibrium {
        let worst = residual.iter().fold(0.0_f64, |m, r| m.max(r.abs()));
        println!("  Equilibrium residual: {worst:.3e}");
    }
    println!();
}
