use crate::config::Preset;
use clap::{Args, Parser, Subcommand};
use polystar::analysis::contraction::DEFAULT_EXPONENT;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "polystar - generate branched polymer topologies as LAMMPS data files and analyze their radius of gyration.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a star, tree or looped polymer and write it as a LAMMPS data file.
    Generate(GenerateArgs),
    /// Read a LAMMPS data file and report its counts and connectivity.
    Inspect(InspectArgs),
    /// Reduce radius of gyration series produced by simulations.
    Analyze(AnalyzeArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path of the LAMMPS data file to write.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Built-in parameter set to start from.
    #[arg(long, value_enum, value_name = "NAME")]
    pub preset: Option<Preset>,

    /// Title written on the first line of the data file.
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    // --- Structure ---
    /// Number of primary arms radiating from the core.
    #[arg(long, value_name = "INT")]
    pub arms: Option<usize>,

    /// Beads per primary arm.
    #[arg(long, value_name = "INT")]
    pub arm_length: Option<usize>,

    /// Secondary branches at the end of each arm.
    #[arg(long, value_name = "INT", conflicts_with = "loop_size")]
    pub branches: Option<usize>,

    /// Beads per secondary branch.
    #[arg(long, value_name = "INT", conflicts_with = "loop_size")]
    pub branch_length: Option<usize>,

    /// Place a detached ring of this many atoms beyond each arm.
    #[arg(long, value_name = "INT")]
    pub loop_size: Option<usize>,

    /// Bond length between consecutive beads.
    #[arg(long, value_name = "FLOAT")]
    pub spacing: Option<f64>,

    /// Rotation of the first arm away from +x, in degrees.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub phase_deg: Option<f64>,

    #[command(flatten)]
    pub dimensionality: DimensionalityFlags,

    // --- Output ---
    /// Edge length of the cubic simulation box.
    #[arg(long, value_name = "FLOAT")]
    pub box_size: Option<f64>,

    /// Give every arm its own molecule id (core = 1, arm i = i + 2).
    #[arg(long)]
    pub molecule_per_arm: bool,

    /// Do not draw a progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S structure.terminus.size=6
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Mutually exclusive switches for keeping the structure in the xy-plane.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct DimensionalityFlags {
    /// Keep every bead at the core's z coordinate.
    #[arg(long)]
    pub planar: bool,
    /// Lift branches and rings out of the plane.
    #[arg(long)]
    pub spatial: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// LAMMPS data file to read.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub command: AnalyzeCommands,
}

#[derive(Subcommand, Debug)]
pub enum AnalyzeCommands {
    /// g-factor of one series against an ideal linear chain of the same size.
    Gyration(GyrationArgs),
    /// g-factor of one series against a saved reference summary.
    Compare(CompareArgs),
    /// Contraction factor between two series sampled on the same timesteps.
    Contraction(ContractionArgs),
}

#[derive(Args, Debug)]
pub struct GyrationArgs {
    /// Whitespace-separated `<timestep> <Rg>` file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Number of atoms in the simulated polymer.
    #[arg(long, value_name = "INT")]
    pub atoms: usize,

    /// Expected g-factor, e.g. from a graph-theoretical model.
    #[arg(long, value_name = "FLOAT")]
    pub expected_g: Option<f64>,

    /// Write a plain-text results summary to this path.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Rg series of the polymer under study.
    #[arg(value_name = "POLYMER_RG")]
    pub polymer_rg: PathBuf,

    /// Results summary containing `Mean Rg² = ...` and `Mean Rg = ...` lines.
    #[arg(long, value_name = "SUMMARY")]
    pub reference: PathBuf,
}

#[derive(Args, Debug)]
pub struct ContractionArgs {
    #[arg(value_name = "RG_A")]
    pub rg_a: PathBuf,

    #[arg(value_name = "RG_B")]
    pub rg_b: PathBuf,

    #[arg(long, value_name = "INT")]
    pub atoms_a: usize,

    #[arg(long, value_name = "INT")]
    pub atoms_b: usize,

    /// Scaling exponent applied to the atom-count ratio.
    #[arg(long, value_name = "FLOAT", default_value_t = DEFAULT_EXPONENT)]
    pub exponent: f64,

    /// Write the per-step difference series (`Rg_b - Rg_a`) to this path.
    #[arg(long, value_name = "PATH")]
    pub differences: Option<PathBuf>,
}
