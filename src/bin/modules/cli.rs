use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str =
    "A command-line tool for estimating free-energy differences from paired forward/backward \
     FEP output using the Bennett Acceptance Ratio (BAR) method.";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser)]
#[command(version, about = ABOUT, help_template = HELP_TEMPLATE)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Forward fepout file (lambda increasing).
    ///
    /// Line-oriented FEP output with '#NEW', 'FepEnergy:' and '#Free' markers.
    #[arg(value_name = "FORWARD")]
    pub forward: PathBuf,

    /// Backward fepout file (lambda decreasing).
    #[arg(value_name = "BACKWARD")]
    pub backward: PathBuf,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub analysis: AnalysisArgs,

    #[command(flatten)]
    pub solver: SolverArgs,
}

/// Options for controlling the output format and destination.
#[derive(Args)]
#[command(next_help_heading = "Output Options")]
pub struct OutputOptions {
    /// Output file path for the free-energy profile.
    ///
    /// If not specified, results are written to standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format for the profile.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Number of decimal places to display for floating-point values.
    #[arg(short, long, default_value_t = 4)]
    pub precision: usize,

    /// Write per-window work histograms to this file.
    ///
    /// Requires --bins. Histograms are written as '# window' sections of
    /// value/probability rows.
    #[arg(long, value_name = "FILE")]
    pub histograms: Option<PathBuf>,
}

/// Options for controlling the analysis parameters.
#[derive(Args)]
#[command(next_help_heading = "Analysis Options")]
pub struct AnalysisArgs {
    /// Simulation temperature in Kelvin, shared by both runs.
    #[arg(short = 'T', long, default_value_t = 300.0)]
    pub temperature: f64,

    /// Number of histogram bins per window.
    ///
    /// When set, forward/backward work histograms are computed on shared bin
    /// edges for each window.
    #[arg(short, long, value_name = "N")]
    pub bins: Option<usize>,

    /// Maximum expected number of windows along the pathway.
    ///
    /// Controls the decimal precision of window labels so that all labels stay
    /// unique.
    #[arg(long, default_value_t = 100)]
    pub max_windows: usize,
}

/// Options for controlling the solver behavior.
#[derive(Args)]
#[command(next_help_heading = "Solver Options")]
pub struct SolverArgs {
    /// Convergence tolerance on the BAR residual, in kcal/mol.
    #[arg(long, default_value_t = 1e-8)]
    pub tolerance: f64,

    /// Maximum number of self-consistent iterations per window.
    #[arg(long, default_value_t = 1000)]
    pub max_iterations: u32,
}

/// Output format for the free-energy profile.
#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table with lambda, per-window and cumulative free energies,
    /// transcribed estimates, and convergence status.
    Pretty,
    /// Comma-separated values with one row per window.
    Csv,
    /// JSON object containing the full profile structure.
    Json,
}
