//! End-to-end run over synthetic fepout text: parse both streams, pair, estimate,
//! and check the assembled profile.

use approx::assert_relative_eq;
use fepbar::{
    pair_windows, AnalysisOptions, Direction, FepoutParser, PathwayAggregator, ProfileStatus,
};
use std::io::Cursor;

// Three windows with identical samples per direction, so each BAR root is exactly
// (forward work - backward work) / 2: 0.5, -0.2, 1.0.
const FORWARD_LOG: &str = "\
# synthetic forward run
#NEW FEP WINDOW: LAMBDA SET TO 0.00 LAMBDA2 0.10
FepEnergy:   1  0.0 0.0 0.0 0.0  1.0  0.0 0.0
FepEnergy:   2  0.0 0.0 0.0 0.0  1.0  0.0 0.0
FepEnergy:   3  0.0 0.0 0.0 0.0  1.0  0.0 0.0
#Free energy change for lambda window [ 0.00 0.10 ] is 0.49 ; net change until now is 0.49
#NEW FEP WINDOW: LAMBDA SET TO 0.10 LAMBDA2 0.20
FepEnergy:   1  0.0 0.0 0.0 0.0  -0.4  0.0 0.0
FepEnergy:   2  0.0 0.0 0.0 0.0  -0.4  0.0 0.0
#Free energy change for lambda window [ 0.10 0.20 ] is -0.19 ; net change until now is 0.30
#NEW FEP WINDOW: LAMBDA SET TO 0.20 LAMBDA2 0.30
FepEnergy:   1  0.0 0.0 0.0 0.0  2.0  0.0 0.0
FepEnergy:   2  0.0 0.0 0.0 0.0  2.0  0.0 0.0
#Free energy change for lambda window [ 0.20 0.30 ] is 0.98 ; net change until now is 1.28
";

const BACKWARD_LOG: &str = "\
# synthetic backward run
#NEW FEP WINDOW: LAMBDA SET TO 0.30 LAMBDA2 0.20
FepEnergy:   1  0.0 0.0 0.0 0.0  0.0  0.0 0.0
FepEnergy:   2  0.0 0.0 0.0 0.0  0.0  0.0 0.0
#Free energy change for lambda window [ 0.30 0.20 ] is -0.97 ; net change until now is -0.97
#NEW FEP WINDOW: LAMBDA SET TO 0.20 LAMBDA2 0.10
FepEnergy:   1  0.0 0.0 0.0 0.0  0.0  0.0 0.0
FepEnergy:   2  0.0 0.0 0.0 0.0  0.0  0.0 0.0
#Free energy change for lambda window [ 0.20 0.10 ] is 0.21 ; net change until now is -0.76
#NEW FEP WINDOW: LAMBDA SET TO 0.10 LAMBDA2 0.00
FepEnergy:   1  0.0 0.0 0.0 0.0  0.0  0.0 0.0
FepEnergy:   2  0.0 0.0 0.0 0.0  0.0  0.0 0.0
#Free energy change for lambda window [ 0.10 0.00 ] is -0.51 ; net change until now is -1.27
";

#[test]
fn test_full_pipeline_profile() {
    let forward = FepoutParser::new(Cursor::new(FORWARD_LOG))
        .collect_windows()
        .unwrap()
        .with_temperature(300.0);
    let backward = FepoutParser::new(Cursor::new(BACKWARD_LOG))
        .collect_windows()
        .unwrap()
        .with_temperature(300.0);

    assert!(forward.diagnostics.is_empty());
    assert!(backward.diagnostics.is_empty());
    assert_eq!(forward.windows.len(), 3);
    assert_eq!(backward.windows.len(), 3);
    assert!(forward.windows.iter().all(|w| w.direction() == Direction::Forward));
    assert!(backward.windows.iter().all(|w| w.direction() == Direction::Backward));

    let outcome = pair_windows(forward.windows, backward.windows).unwrap();
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.pairs.len(), 3);

    let profile = PathwayAggregator::new().aggregate(&outcome.pairs).unwrap();
    assert_eq!(profile.status, ProfileStatus::Complete);

    let delta: Vec<f64> = profile.windows.iter().map(|w| w.delta_f.unwrap()).collect();
    assert_relative_eq!(delta[0], 0.5, epsilon = 1e-6);
    assert_relative_eq!(delta[1], -0.2, epsilon = 1e-6);
    assert_relative_eq!(delta[2], 1.0, epsilon = 1e-6);

    let cumulative: Vec<f64> = profile
        .windows
        .iter()
        .map(|w| w.cumulative_f.unwrap())
        .collect();
    assert_relative_eq!(cumulative[0], 0.5, epsilon = 1e-6);
    assert_relative_eq!(cumulative[1], 0.3, epsilon = 1e-6);
    assert_relative_eq!(cumulative[2], 1.3, epsilon = 1e-6);
    assert_relative_eq!(profile.total.unwrap(), 1.3, epsilon = 1e-6);

    // Transcribed estimates from both logs ride along for cross-validation.
    assert_relative_eq!(profile.windows[0].forward_read.unwrap(), 0.49);
    assert_relative_eq!(profile.windows[0].backward_read.unwrap(), -0.51);
    assert_relative_eq!(profile.forward_read_endpoint.unwrap(), 0.98);
    assert_relative_eq!(profile.backward_read_endpoint.unwrap(), -0.97);
}

#[test]
fn test_full_pipeline_with_histograms() {
    let forward = FepoutParser::new(Cursor::new(FORWARD_LOG))
        .collect_windows()
        .unwrap()
        .with_temperature(300.0);
    let backward = FepoutParser::new(Cursor::new(BACKWARD_LOG))
        .collect_windows()
        .unwrap()
        .with_temperature(300.0);

    let outcome = pair_windows(forward.windows, backward.windows).unwrap();
    let options = AnalysisOptions {
        histogram_bins: Some(8),
        ..Default::default()
    };
    let profile = PathwayAggregator::new()
        .with_options(options)
        .aggregate(&outcome.pairs)
        .unwrap();

    for window in &profile.windows {
        let histograms = window.histograms.as_ref().unwrap();
        let forward_mass: f64 = histograms.forward.bins.iter().map(|b| b.probability).sum();
        let backward_mass: f64 = histograms.backward.bins.iter().map(|b| b.probability).sum();
        assert_relative_eq!(forward_mass, 1.0, epsilon = 1e-9);
        assert_relative_eq!(backward_mass, 1.0, epsilon = 1e-9);
        assert_eq!(histograms.forward.min, histograms.backward.min);
        assert_eq!(histograms.forward.max, histograms.backward.max);
    }
}

#[test]
fn test_unpaired_window_surfaces_as_diagnostic() {
    let forward = FepoutParser::new(Cursor::new(FORWARD_LOG))
        .collect_windows()
        .unwrap()
        .with_temperature(300.0);
    // Drop the backward 0.10-0.20 window.
    let backward: Vec<_> = FepoutParser::new(Cursor::new(BACKWARD_LOG))
        .collect_windows()
        .unwrap()
        .with_temperature(300.0)
        .windows
        .into_iter()
        .filter(|w| w.label() != "0.10-0.20")
        .collect();

    let outcome = pair_windows(forward.windows, backward).unwrap();
    assert_eq!(outcome.pairs.len(), 2);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(matches!(
        outcome.diagnostics[0],
        fepbar::FepBarError::UnpairedWindow {
            direction: Direction::Forward,
            ..
        }
    ));
}
