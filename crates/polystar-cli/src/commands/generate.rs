use crate::cli::GenerateArgs;
use crate::config::PartialGenerateConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use polystar::engine::progress::ProgressReporter;
use polystar::workflows::generate::{self, GenerationReport};
use tracing::info;

pub fn run(args: GenerateArgs, quiet: bool) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialGenerateConfig::from_file(path)?,
        None => PartialGenerateConfig::default(),
    };
    info!("Merging configuration from preset, file and CLI arguments...");
    let descriptor = partial_config.merge_with_cli(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = if args.no_progress || quiet {
        ProgressReporter::silent()
    } else {
        ProgressReporter::with_callback(progress_handler.get_callback())
    };

    let report = generate::run(&descriptor, &args.output, &reporter)?;
    println!("{}", format_report(&report));
    Ok(())
}

fn format_report(report: &GenerationReport) -> String {
    let s = &report.summary;
    let mut lines = vec![
        format!("Wrote {}", report.path.display()),
        format!("  Atoms:       {}", s.atoms),
        format!("  Bonds:       {}", s.bonds),
        format!("  Atom types:  {}", s.atom_types),
        format!("  Bond types:  {}", s.bond_types),
    ];
    if s.rings > 0 {
        lines.push(format!("  Rings:       {}", s.rings));
    }
    lines.push(format!("  Structure:   {}", s.description));
    lines.join("\n")
}
