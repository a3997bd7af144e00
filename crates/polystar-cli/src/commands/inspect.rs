use crate::cli::InspectArgs;
use crate::error::Result;
use polystar::core::utils::graph::ComponentShape;
use polystar::workflows::inspect::{self, InspectionReport};

pub fn run(args: InspectArgs) -> Result<()> {
    let report = inspect::run(&args.path)?;
    println!("{}", format_report(&report));
    Ok(())
}

fn format_report(report: &InspectionReport) -> String {
    let h = &report.header;
    let mut lines = vec![
        h.title.clone(),
        format!("  Atoms:       {}", h.atoms),
        format!("  Bonds:       {}", h.bonds),
        format!("  Atom types:  {}", h.atom_types),
        format!("  Bond types:  {}", h.bond_types),
        format!(
            "  Box:         [{}, {}] x [{}, {}] x [{}, {}]",
            h.bounds[0].0, h.bounds[0].1, h.bounds[1].0, h.bounds[1].1, h.bounds[2].0, h.bounds[2].1
        ),
        format!("  Components:  {}", report.components.len()),
    ];
    for (i, component) in report.components.iter().enumerate() {
        let first = component
            .atoms
            .first()
            .map(|id| id.to_string())
            .unwrap_or_default();
        lines.push(format!(
            "    #{:<3} {:>6} atoms {:>6} bonds  {:<8} (from atom {})",
            i + 1,
            component.atoms.len(),
            component.bond_count,
            component.shape,
            first
        ));
    }
    let cyclic = report
        .components
        .iter()
        .any(|c| c.shape == ComponentShape::Cyclic);
    lines.push(format!(
        "  Backbone:    {}",
        if report.backbone_is_tree() {
            format!("one tree with {} detached ring(s)", report.ring_count())
        } else if cyclic {
            "contains cycles with attached chains".to_string()
        } else {
            format!("{} separate trees", report.tree_count())
        }
    ));
    lines.join("\n")
}
