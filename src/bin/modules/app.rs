use super::cli::Cli;
use super::error::CliError;
use super::io;
use fepbar::{
    pair_windows, AnalysisOptions, FepoutParser, ParsedStream, PathwayAggregator, SolverOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn run(args: Cli) -> Result<(), CliError> {
    if args.output.histograms.is_some() && args.analysis.bins.is_none() {
        return Err(CliError::HistogramsWithoutBins);
    }

    let temperature = args.analysis.temperature;
    let max_windows = args.analysis.max_windows;

    // The two streams are independent inputs; parse them concurrently.
    let (forward, backward) = rayon::join(
        || parse_stream(&args.forward, temperature, max_windows),
        || parse_stream(&args.backward, temperature, max_windows),
    );
    let forward = forward?;
    let backward = backward?;

    report_diagnostics(&args.forward, &forward);
    report_diagnostics(&args.backward, &backward);

    let outcome = pair_windows(forward.windows, backward.windows)?;
    for diagnostic in &outcome.diagnostics {
        eprintln!("Warning: {}", diagnostic);
    }

    let options = AnalysisOptions {
        solver: SolverOptions {
            tolerance: args.solver.tolerance,
            max_iterations: args.solver.max_iterations,
        },
        histogram_bins: args.analysis.bins,
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!(
        "Estimating free energies for {} windows...",
        outcome.pairs.len()
    ));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let profile = PathwayAggregator::new()
        .with_options(options)
        .aggregate(&outcome.pairs)?;

    pb.finish_and_clear();

    let writer = io::get_writer(&args.output.output)?;
    io::write_profile(writer, &profile, &args.output.format, args.output.precision)?;

    if let Some(path) = &args.output.histograms {
        io::write_histograms(path, &profile, args.output.precision)?;
    }

    Ok(())
}

fn parse_stream(
    path: &Path,
    temperature: f64,
    max_windows: usize,
) -> Result<ParsedStream, CliError> {
    let file = File::open(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parsed = FepoutParser::new(BufReader::new(file))
        .with_max_windows(max_windows)
        .collect_windows()?;
    Ok(parsed.with_temperature(temperature))
}

fn report_diagnostics(path: &Path, parsed: &ParsedStream) {
    for diagnostic in &parsed.diagnostics {
        eprintln!("Warning: {}: {}", path.display(), diagnostic);
    }
}
