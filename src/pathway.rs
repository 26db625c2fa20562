//! Pathway-level aggregation: per-window BAR estimation and the cumulative
//! free-energy profile.
//!
//! Each window pair's estimate is independent of every other pair, so the solves
//! run on a rayon worker pool. The cumulative sum over pathway order is inherently
//! sequential and happens after all pair results are in. A solver failure on one
//! window never aborts the others; it marks that window's record and downgrades the
//! profile status to partial, so a silently-wrong total can never escape.

use crate::error::FepBarError;
use crate::histogram::{Histogram, HistogramBuilder};
use crate::solver::{BarSolver, Convergence, SolverOptions};
use crate::types::WindowPair;
use rayon::prelude::*;
use serde::Serialize;

/// Parameters for a pathway aggregation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    /// Numerical settings forwarded to every per-window solve.
    pub solver: SolverOptions,
    /// When set, forward/backward work histograms with this many bins are attached
    /// to each window record for quality control.
    pub histogram_bins: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            solver: SolverOptions::default(),
            histogram_bins: None,
        }
    }
}

/// Per-window outcome within an aggregate profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WindowStatus {
    /// The BAR iteration converged.
    Converged {
        /// Zero-function evaluations used.
        iterations: u32,
    },
    /// The iteration cap was exhausted; the recorded estimate is not final.
    MaxIterationsExceeded {
        /// The cap that was exhausted.
        max_iterations: u32,
    },
    /// The iteration produced a non-finite value; no usable estimate exists.
    Diverged,
}

impl WindowStatus {
    /// True only for a fully converged window.
    pub fn is_converged(&self) -> bool {
        matches!(self, WindowStatus::Converged { .. })
    }
}

/// Forward and backward work histograms on shared bin edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkHistograms {
    /// Distribution of the forward work samples.
    pub forward: Histogram,
    /// Distribution of the backward work samples.
    pub backward: Histogram,
}

/// One row of the pathway report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowRecord {
    /// Canonical window label.
    pub label: String,
    /// Pathway coordinate reached once this window is traversed forward (the upper
    /// lambda endpoint).
    pub lambda: f64,
    /// BAR estimate for this window, in kcal/mol. `None` when the solve diverged.
    pub delta_f: Option<f64>,
    /// Running total up to and including this window. `None` from the first failed
    /// window onward: a failed window invalidates every later cumulative value.
    pub cumulative_f: Option<f64>,
    /// Free-energy estimate transcribed from the forward log, for cross-validation.
    pub forward_read: Option<f64>,
    /// Free-energy estimate transcribed from the backward log, for cross-validation.
    pub backward_read: Option<f64>,
    /// Reserved for a future bootstrap error estimator; currently never populated.
    pub error_estimate: Option<f64>,
    /// Convergence status of the solve.
    pub status: WindowStatus,
    /// Work histograms, when requested via [`AnalysisOptions::histogram_bins`].
    pub histograms: Option<WorkHistograms>,
}

/// Overall validity of a pathway profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfileStatus {
    /// Every window converged; the total is valid.
    Complete,
    /// At least one window failed; cumulative values stop at the failure.
    Partial {
        /// Index (in pathway order) of the first failed window.
        first_failed: usize,
    },
}

/// The assembled per-window and cumulative free-energy report for one pathway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathwayProfile {
    /// Per-window records in pathway order.
    pub windows: Vec<WindowRecord>,
    /// Whether every window converged.
    pub status: ProfileStatus,
    /// Total free-energy change over the pathway. `None` unless the profile is
    /// complete.
    pub total: Option<f64>,
    /// Transcribed estimate at the forward endpoint (last window's forward read).
    pub forward_read_endpoint: Option<f64>,
    /// Transcribed estimate at the backward endpoint (last window's backward read).
    pub backward_read_endpoint: Option<f64>,
}

/// Walks an ordered pathway of window pairs, estimating each and accumulating the
/// cumulative free-energy profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathwayAggregator {
    options: AnalysisOptions,
}

impl PathwayAggregator {
    /// Creates an aggregator with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default analysis options.
    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Estimates every pair and assembles the cumulative profile.
    ///
    /// Pairs are re-ordered by pathway position; the per-pair solves run in
    /// parallel. The solver is seeded with the forward window's transcribed
    /// estimate (falling back to the backward one, then zero). Divergence or
    /// non-convergence on one window marks that window and downgrades the profile
    /// to [`ProfileStatus::Partial`] without touching the other windows.
    ///
    /// # Errors
    ///
    /// Precondition violations only: [`FepBarError::EmptySampleSet`] if a pair's
    /// samples were discarded before aggregation, or
    /// [`FepBarError::InvalidBinCount`] for a zero histogram bin count.
    pub fn aggregate(&self, pairs: &[WindowPair]) -> Result<PathwayProfile, FepBarError> {
        let histogram_builder = self
            .options
            .histogram_bins
            .map(HistogramBuilder::new)
            .transpose()?;

        let mut ordered: Vec<&WindowPair> = pairs.iter().collect();
        ordered.sort_by(|a, b| a.pathway_position().total_cmp(&b.pathway_position()));

        let mut records = ordered
            .par_iter()
            .map(|pair| self.solve_pair(pair, histogram_builder.as_ref()))
            .collect::<Result<Vec<WindowRecord>, FepBarError>>()?;

        // The cumulative sum is inherently sequential over pathway order.
        let mut running = 0.0;
        let mut first_failed = None;
        for (index, record) in records.iter_mut().enumerate() {
            if first_failed.is_none() {
                if let (Some(delta_f), true) = (record.delta_f, record.status.is_converged()) {
                    running += delta_f;
                    record.cumulative_f = Some(running);
                } else {
                    first_failed = Some(index);
                }
            }
        }

        let status = match first_failed {
            None => ProfileStatus::Complete,
            Some(first_failed) => ProfileStatus::Partial { first_failed },
        };
        let total = match status {
            ProfileStatus::Complete => records.last().and_then(|r| r.cumulative_f),
            ProfileStatus::Partial { .. } => None,
        };

        Ok(PathwayProfile {
            forward_read_endpoint: records.last().and_then(|r| r.forward_read),
            backward_read_endpoint: records.last().and_then(|r| r.backward_read),
            windows: records,
            status,
            total,
        })
    }

    fn solve_pair(
        &self,
        pair: &WindowPair,
        histogram_builder: Option<&HistogramBuilder>,
    ) -> Result<WindowRecord, FepBarError> {
        let solver = BarSolver::for_pair(pair)?.with_options(self.options.solver);

        let initial_guess = pair
            .forward()
            .transcribed_estimate()
            .or_else(|| pair.backward().transcribed_estimate())
            .unwrap_or(0.0);

        let (delta_f, status) = match solver.solve(initial_guess) {
            Ok(solution) => {
                let status = match solution.convergence {
                    Convergence::Converged { iterations } => WindowStatus::Converged { iterations },
                    Convergence::MaxIterationsExceeded { max_iterations } => {
                        WindowStatus::MaxIterationsExceeded { max_iterations }
                    }
                };
                (Some(solution.delta_f), status)
            }
            Err(FepBarError::NumericalDivergence { .. }) => (None, WindowStatus::Diverged),
            Err(other) => return Err(other),
        };

        let histograms = match histogram_builder {
            Some(builder) => {
                let (forward, backward) =
                    builder.build_shared(pair.forward().samples(), pair.backward().samples())?;
                Some(WorkHistograms { forward, backward })
            }
            None => None,
        };

        Ok(WindowRecord {
            label: pair.label().to_string(),
            lambda: pair.upper_lambda(),
            delta_f,
            cumulative_f: None,
            forward_read: pair.forward().transcribed_estimate(),
            backward_read: pair.backward().transcribed_estimate(),
            error_estimate: None,
            status,
            histograms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Window;
    use approx::assert_relative_eq;

    // A single sample per direction puts the BAR root at exactly (a - b)/2, which
    // makes per-window targets easy to dial in.
    fn pair_with_root(l1: f64, l2: f64, delta_f: f64) -> WindowPair {
        let forward = Window::new(l1, l2, vec![2.0 * delta_f])
            .unwrap()
            .with_temperature(300.0);
        let backward = Window::new(l2, l1, vec![0.0])
            .unwrap()
            .with_temperature(300.0);
        WindowPair::new(forward, backward).unwrap()
    }

    #[test]
    fn test_cumulative_profile_in_pathway_order() {
        let pairs = vec![
            pair_with_root(0.0, 0.1, 0.5),
            pair_with_root(0.1, 0.2, -0.2),
            pair_with_root(0.2, 0.3, 1.0),
        ];
        let profile = PathwayAggregator::new().aggregate(&pairs).unwrap();

        assert_eq!(profile.status, ProfileStatus::Complete);
        let cumulative: Vec<f64> = profile
            .windows
            .iter()
            .map(|w| w.cumulative_f.unwrap())
            .collect();
        assert_relative_eq!(cumulative[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(cumulative[1], 0.3, epsilon = 1e-6);
        assert_relative_eq!(cumulative[2], 1.3, epsilon = 1e-6);
        assert_relative_eq!(profile.total.unwrap(), 1.3, epsilon = 1e-6);
    }

    #[test]
    fn test_unordered_input_is_sorted_by_pathway_position() {
        let pairs = vec![
            pair_with_root(0.2, 0.3, 1.0),
            pair_with_root(0.0, 0.1, 0.5),
            pair_with_root(0.1, 0.2, -0.2),
        ];
        let profile = PathwayAggregator::new().aggregate(&pairs).unwrap();
        let labels: Vec<&str> = profile.windows.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, ["0.00-0.10", "0.10-0.20", "0.20-0.30"]);
    }

    #[test]
    fn test_divergence_yields_partial_profile() {
        let poisoned = WindowPair::new(
            Window::new(0.1, 0.2, vec![f64::NAN])
                .unwrap()
                .with_temperature(300.0),
            Window::new(0.2, 0.1, vec![0.0])
                .unwrap()
                .with_temperature(300.0),
        )
        .unwrap();
        let pairs = vec![
            pair_with_root(0.0, 0.1, 0.5),
            poisoned,
            pair_with_root(0.2, 0.3, 1.0),
        ];
        let profile = PathwayAggregator::new().aggregate(&pairs).unwrap();

        assert_eq!(profile.status, ProfileStatus::Partial { first_failed: 1 });
        assert!(profile.total.is_none());

        // The first window's result is untouched by the failure downstream of it.
        assert_relative_eq!(profile.windows[0].cumulative_f.unwrap(), 0.5, epsilon = 1e-6);
        assert!(profile.windows[0].status.is_converged());

        // The failed window and everything after it carry no cumulative value.
        assert_eq!(profile.windows[1].status, WindowStatus::Diverged);
        assert!(profile.windows[1].delta_f.is_none());
        assert!(profile.windows[1].cumulative_f.is_none());
        assert!(profile.windows[2].status.is_converged());
        assert!(profile.windows[2].cumulative_f.is_none());
    }

    #[test]
    fn test_histograms_attached_when_requested() {
        let pairs = vec![pair_with_root(0.0, 0.1, 0.5)];
        let options = AnalysisOptions {
            histogram_bins: Some(4),
            ..Default::default()
        };
        let profile = PathwayAggregator::new()
            .with_options(options)
            .aggregate(&pairs)
            .unwrap();
        let histograms = profile.windows[0].histograms.as_ref().unwrap();
        assert_eq!(histograms.forward.min, histograms.backward.min);
        assert_eq!(histograms.forward.max, histograms.backward.max);
    }

    #[test]
    fn test_discarded_samples_are_a_precondition_violation() {
        let mut forward = Window::new(0.0, 0.1, vec![1.0]).unwrap().with_temperature(300.0);
        forward.discard_samples();
        let backward = Window::new(0.1, 0.0, vec![0.0]).unwrap().with_temperature(300.0);
        let pair = WindowPair::new(forward, backward).unwrap();
        let err = PathwayAggregator::new().aggregate(&[pair]).unwrap_err();
        assert!(matches!(err, FepBarError::EmptySampleSet));
    }
}
