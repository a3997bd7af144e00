use crate::cli::{AnalyzeArgs, AnalyzeCommands, CompareArgs, ContractionArgs, GyrationArgs};
use crate::error::{CliError, Result};
use polystar::analysis::contraction::{ContractionReport, contraction_factor};
use polystar::analysis::gfactor::GFactorReport;
use polystar::analysis::gyration::GyrationSeries;
use polystar::analysis::reference::{Compactness, ReferenceComparison, ReferenceSummary};
use tracing::info;

pub fn run(args: AnalyzeArgs) -> Result<()> {
    match args.command {
        AnalyzeCommands::Gyration(args) => gyration(args),
        AnalyzeCommands::Compare(args) => compare(args),
        AnalyzeCommands::Contraction(args) => contraction(args),
    }
}

fn gyration(args: GyrationArgs) -> Result<()> {
    let series = GyrationSeries::from_path(&args.file)?;
    info!("Loaded {} Rg samples from {:?}", series.len(), args.file);
    let report = GFactorReport::compute(&series, args.atoms, args.expected_g)?;
    println!("{}", format_gfactor(&report));
    if let Some(path) = &args.summary {
        report.save(path)?;
        println!("Summary saved to {}", path.display());
    }
    Ok(())
}

fn compare(args: CompareArgs) -> Result<()> {
    let series = GyrationSeries::from_path(&args.polymer_rg)?;
    let reference = ReferenceSummary::from_path(&args.reference)?;
    let comparison = ReferenceComparison::compute(&series, reference);
    println!("{}", format_comparison(&comparison));
    Ok(())
}

fn contraction(args: ContractionArgs) -> Result<()> {
    if !args.exponent.is_finite() {
        return Err(CliError::Argument(format!(
            "--exponent must be finite, got {}",
            args.exponent
        )));
    }
    let a = GyrationSeries::from_path(&args.rg_a)?;
    let b = GyrationSeries::from_path(&args.rg_b)?;
    let report = contraction_factor(&a, &b, args.atoms_a, args.atoms_b, args.exponent)?;
    println!("{}", format_contraction(&report, args.exponent));
    if let Some(path) = &args.differences {
        report.save_differences(path)?;
        println!("Differences saved to {}", path.display());
    }
    Ok(())
}

fn format_gfactor(report: &GFactorReport) -> String {
    let eq = &report.equilibrated;
    let mut lines = vec![
        format!(
            "Samples:                 {} total, {} equilibrated (last timestep {})",
            report.total_samples, eq.samples, report.last_timestep
        ),
        format!("Average Rg (sim):        {:.3} +/- {:.3}", eq.mean, eq.std),
        format!("<Rg>^2 (sim):            {:.3}", report.rg_squared),
        format!("<Rg²> (linear chain):    {:.3}", report.linear_rg_squared),
        format!("Calculated g-factor:     {:.3}", report.g),
    ];
    if let (Some(expected), Some(diff), Some(verdict)) =
        (report.expected, report.difference(), report.verdict())
    {
        lines.push(format!("Expected g-factor:       {:.3}", expected));
        lines.push(format!("Difference:              {:.3}", diff));
        lines.push(verdict.to_string());
    }
    lines.join("\n")
}

fn format_comparison(cmp: &ReferenceComparison) -> String {
    let verdict = match cmp.compactness() {
        Compactness::MoreCompact => "The polymer is more compact than the reference (g < 1).",
        Compactness::MoreExpanded => "The polymer is more expanded than the reference (g >= 1).",
    };
    [
        format!("Mean Rg (this polymer):    {:.4}", cmp.mean_rg),
        format!("Mean <Rg²> (this polymer): {:.4}", cmp.mean_rg_squared),
        format!("Reference <Rg²>:           {:.4}", cmp.reference.mean_rg_squared),
        format!("Contraction factor g = {:.4}", cmp.g),
        verdict.to_string(),
    ]
    .join("\n")
}

fn format_contraction(report: &ContractionReport, exponent: f64) -> String {
    [
        format!("Average Rg (A):            {:.4}", report.mean_a),
        format!("Average Rg (B):            {:.4}", report.mean_b),
        format!("Mean difference (B - A):   {:.4}", report.mean_difference),
        format!("Contraction factor (exponent {}): {:.6}", exponent, report.g),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use polystar::analysis::gyration::GyrationSample;
    use std::path::PathBuf;

    fn series(values: &[f64]) -> GyrationSeries {
        GyrationSeries::from_samples(
            values
                .iter()
                .enumerate()
                .map(|(i, &rg)| GyrationSample {
                    timestep: i as f64,
                    rg,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn gfactor_output_includes_verdict_only_with_expectation() {
        let s = series(&[2.0, 2.0, 3.0, 3.0]);
        let without = GFactorReport::compute(&s, 10, None).unwrap();
        assert!(!format_gfactor(&without).contains("Difference"));

        let with = GFactorReport::compute(&s, 10, Some(without.g)).unwrap();
        let text = format_gfactor(&with);
        assert!(text.contains("Difference:              0.000"));
        assert!(text.contains("Excellent"));
    }

    #[test]
    fn comparison_output_names_compactness() {
        let cmp = ReferenceComparison::compute(
            &series(&[4.0]),
            ReferenceSummary {
                mean_rg_squared: 8.0,
                mean_rg: 2.8,
            },
        );
        assert!(format_comparison(&cmp).contains("more expanded"));
    }

    #[test]
    fn contraction_rejects_non_finite_exponent() {
        let args = ContractionArgs {
            rg_a: PathBuf::from("a.txt"),
            rg_b: PathBuf::from("b.txt"),
            atoms_a: 10,
            atoms_b: 10,
            exponent: f64::NAN,
            differences: None,
        };
        assert!(matches!(contraction(args), Err(CliError::Argument(_))));
    }

    #[test]
    fn gyration_writes_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let rg = dir.path().join("rg.txt");
        std::fs::write(&rg, "# step rg\n0 3.0\n100 3.2\n200 3.4\n300 3.6\n").unwrap();
        let summary = dir.path().join("summary.txt");
        gyration(GyrationArgs {
            file: rg,
            atoms: 22,
            expected_g: Some(0.877),
            summary: Some(summary.clone()),
        })
        .unwrap();
        let text = std::fs::read_to_string(summary).unwrap();
        assert!(text.contains("Mean Rg = 3.500000"));
        assert!(text.contains("Expected g-factor:        0.877000"));
    }
}
