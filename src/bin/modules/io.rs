use super::cli::OutputFormat;
use super::error::CliError;
use fepbar::{PathwayProfile, ProfileStatus, WindowStatus};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn get_writer(output: &Option<PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| CliError::Io {
                path: path.clone(),
                source: e,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

pub fn write_profile(
    mut writer: Box<dyn Write>,
    profile: &PathwayProfile,
    format: &OutputFormat,
    precision: usize,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Pretty => write_pretty(&mut writer, profile, precision),
        OutputFormat::Csv => write_csv(&mut writer, profile, precision),
        OutputFormat::Json => write_json(&mut writer, profile),
    }
}

fn status_text(status: &WindowStatus) -> String {
    match status {
        WindowStatus::Converged { iterations } => format!("converged ({} it)", iterations),
        WindowStatus::MaxIterationsExceeded { max_iterations } => {
            format!("not converged ({} it)", max_iterations)
        }
        WindowStatus::Diverged => "diverged".to_string(),
    }
}

fn opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.precision$}", v),
        None => "n/a".to_string(),
    }
}

fn write_pretty(
    writer: &mut dyn Write,
    profile: &PathwayProfile,
    precision: usize,
) -> Result<(), CliError> {
    writeln!(writer, "{:=<25}", "")?;
    writeln!(writer, "Free Energy Data:")?;
    writeln!(
        writer,
        "{:<10} {:<12} {:<12} {:<12} {:<12} {}",
        "Lambda", "dF_BAR", "F_BAR", "F_fwd", "F_rvs", "Status"
    )?;

    // Pathway origin row: zero free energy by definition.
    let origin = profile
        .windows
        .first()
        .map(|w| w.lambda - width_of(&w.label).unwrap_or(0.0))
        .unwrap_or(0.0);
    writeln!(
        writer,
        "{:<10.2} {:<12.precision$} {:<12.precision$} {:<12.precision$} {:<12.precision$}",
        origin, 0.0, 0.0, 0.0, 0.0
    )?;

    for window in &profile.windows {
        writeln!(
            writer,
            "{:<10.2} {:<12} {:<12} {:<12} {:<12} {}",
            window.lambda,
            opt(window.delta_f, precision),
            opt(window.cumulative_f, precision),
            opt(window.forward_read, precision),
            opt(window.backward_read, precision),
            status_text(&window.status),
        )?;
    }

    writeln!(writer, "{:-<25}", "")?;
    match profile.status {
        ProfileStatus::Complete => {
            writeln!(
                writer,
                "Total free-energy change: {} kcal/mol",
                opt(profile.total, precision)
            )?;
        }
        ProfileStatus::Partial { first_failed } => {
            writeln!(
                writer,
                "PARTIAL PROFILE: window {} failed; cumulative values past it are invalid.",
                profile.windows[first_failed].label
            )?;
        }
    }
    Ok(())
}

// Window width recovered from the label's two lambda fields.
fn width_of(label: &str) -> Option<f64> {
    let (lo, hi) = label.split_once('-')?;
    Some(hi.parse::<f64>().ok()? - lo.parse::<f64>().ok()?)
}

fn write_csv(
    writer: &mut dyn Write,
    profile: &PathwayProfile,
    precision: usize,
) -> Result<(), CliError> {
    writeln!(
        writer,
        "label,lambda,delta_f,cumulative_f,forward_read,backward_read,status"
    )?;
    for window in &profile.windows {
        writeln!(
            writer,
            "{},{:.precision$},{},{},{},{},{}",
            window.label,
            window.lambda,
            opt(window.delta_f, precision),
            opt(window.cumulative_f, precision),
            opt(window.forward_read, precision),
            opt(window.backward_read, precision),
            status_text(&window.status),
        )?;
    }
    Ok(())
}

fn write_json(writer: &mut dyn Write, profile: &PathwayProfile) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *writer, profile)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_histograms(
    path: &Path,
    profile: &PathwayProfile,
    precision: usize,
) -> Result<(), CliError> {
    let file = File::create(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    for window in &profile.windows {
        let Some(histograms) = &window.histograms else {
            continue;
        };
        for (direction, histogram) in [
            ("forward", &histograms.forward),
            ("backward", &histograms.backward),
        ] {
            writeln!(writer, "# Window [ {} ] {} work distribution", window.label, direction)?;
            writeln!(writer, "# {:<12} {}", "Value", "Probability")?;
            for bin in &histogram.bins {
                writeln!(
                    writer,
                    "{:<14.precision$} {:<10.precision$}",
                    bin.center, bin.probability
                )?;
            }
            writeln!(writer, "#{:-<40}", "")?;
        }
    }
    Ok(())
}
