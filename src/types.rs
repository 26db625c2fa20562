//! Core value types for BAR analysis: traversal direction, simulation windows, and
//! validated forward/backward window pairs.
//!
//! Windows are immutable once constructed: the lambda pair, direction, canonical
//! label, and sample statistics are all fixed at creation and validated there, so no
//! partially-initialised window can reach the solver. The only two post-construction
//! mutations are deliberate: assigning the simulation temperature (a property of the
//! run, not of the log text) and explicitly discarding the raw samples once derived
//! statistics have been computed, to bound memory on large simulations.

use crate::error::FepBarError;
use crate::math::constants::DEFAULT_MAX_WINDOWS;
use serde::Serialize;
use std::fmt;

/// Traversal direction of a window along the alchemical pathway.
///
/// Derived from the lambda ordering at construction, never set directly:
/// `lambda1 < lambda2` is forward, `lambda1 > lambda2` is backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// Lambda increasing across the window.
    Forward,
    /// Lambda decreasing across the window.
    Backward,
}

impl Direction {
    /// Returns the other direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// Number of decimal places needed to format unique window labels given a ceiling
/// on the expected window count.
///
/// With at most `max_windows` windows over the unit lambda interval, adjacent
/// endpoints differ by at least `1/max_windows`, so `ceil(log10(max_windows))`
/// decimals are sufficient to keep labels distinct. A floor of two decimals keeps
/// the common 50-window layout readable ("0.02-0.04").
pub fn label_decimals(max_windows: usize) -> usize {
    let mut decimals = 0;
    let mut span = 1usize;
    while span < max_windows {
        span = span.saturating_mul(10);
        decimals += 1;
    }
    decimals.max(2)
}

fn format_label(lambda1: f64, lambda2: f64, decimals: usize) -> String {
    let lo = lambda1.min(lambda2);
    let hi = lambda1.max(lambda2);
    format!("{lo:.decimals$}-{hi:.decimals$}")
}

/// One lambda-pair segment of the alchemical pathway, with its recorded work samples
/// and cached sample statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    lambda1: f64,
    lambda2: f64,
    direction: Direction,
    label: String,
    samples: Vec<f64>,
    mean: f64,
    variance: f64,
    temperature: Option<f64>,
    transcribed_estimate: Option<f64>,
}

impl Window {
    /// Creates a window from its lambda endpoints and recorded work samples, using
    /// the default label precision (see [`label_decimals`] and
    /// [`DEFAULT_MAX_WINDOWS`]).
    ///
    /// # Errors
    ///
    /// * [`FepBarError::InvalidWindow`] if the endpoints are equal.
    /// * [`FepBarError::EmptySampleSet`] if no samples were recorded.
    pub fn new(lambda1: f64, lambda2: f64, samples: Vec<f64>) -> Result<Self, FepBarError> {
        Self::with_label_decimals(lambda1, lambda2, samples, label_decimals(DEFAULT_MAX_WINDOWS))
    }

    /// Creates a window with an explicit label precision.
    ///
    /// Direction is derived from the endpoint ordering; the label is the canonical
    /// `min-max` form shared by a window and its opposite-direction counterpart.
    pub fn with_label_decimals(
        lambda1: f64,
        lambda2: f64,
        samples: Vec<f64>,
        decimals: usize,
    ) -> Result<Self, FepBarError> {
        if lambda1 == lambda2 {
            return Err(FepBarError::InvalidWindow { lambda: lambda1 });
        }
        if samples.is_empty() {
            return Err(FepBarError::EmptySampleSet);
        }

        let direction = if lambda1 < lambda2 {
            Direction::Forward
        } else {
            Direction::Backward
        };
        let label = format_label(lambda1, lambda2, decimals);

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = if samples.len() > 1 {
            samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };

        Ok(Self {
            lambda1,
            lambda2,
            direction,
            label,
            samples,
            mean,
            variance,
            temperature: None,
            transcribed_estimate: None,
        })
    }

    /// Assigns the simulation temperature in Kelvin. Required before estimation.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Attaches the free-energy estimate transcribed from the source log.
    ///
    /// The value is never fed into the solver as data; it seeds the initial guess
    /// and appears in reports for cross-validation.
    pub fn with_transcribed_estimate(mut self, estimate: f64) -> Self {
        self.transcribed_estimate = Some(estimate);
        self
    }

    /// First lambda endpoint as recorded.
    pub fn lambda1(&self) -> f64 {
        self.lambda1
    }

    /// Second lambda endpoint as recorded.
    pub fn lambda2(&self) -> f64 {
        self.lambda2
    }

    /// Traversal direction derived from the endpoint ordering.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Canonical `min-max` label shared with the opposite-direction counterpart.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The recorded work samples, in log order. Empty after [`discard_samples`].
    ///
    /// [`discard_samples`]: Window::discard_samples
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample mean of the recorded work values, cached at construction.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance of the recorded work values, cached at
    /// construction. Zero for a single-sample window.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Simulation temperature in Kelvin, if assigned.
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// Free-energy estimate transcribed from the source log, if present.
    pub fn transcribed_estimate(&self) -> Option<f64> {
        self.transcribed_estimate
    }

    /// Lower lambda endpoint; the window's position along the pathway.
    pub fn pathway_position(&self) -> f64 {
        self.lambda1.min(self.lambda2)
    }

    /// Upper lambda endpoint; the pathway coordinate reached once the window is
    /// traversed in the forward direction.
    pub fn upper_lambda(&self) -> f64 {
        self.lambda1.max(self.lambda2)
    }

    /// Releases the raw sample storage while keeping the cached statistics and
    /// label.
    ///
    /// This is the explicit memory-bounding step for large simulations: once the
    /// mean, variance, and any histograms have been computed, the samples may no
    /// longer be needed. Estimation on a discarded window fails with
    /// [`FepBarError::EmptySampleSet`].
    pub fn discard_samples(&mut self) {
        self.samples = Vec::new();
    }
}

/// A validated association of one forward and one backward window over the same
/// lambda pair at the same temperature.
///
/// The three pairing invariants are enforced at construction; a `WindowPair` that
/// exists is always valid input for BAR estimation (modulo sample discarding).
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPair {
    forward: Window,
    backward: Window,
}

impl WindowPair {
    /// Associates a forward and a backward window.
    ///
    /// # Errors
    ///
    /// * [`FepBarError::LabelMismatch`] if the windows describe different lambda pairs.
    /// * [`FepBarError::DirectionMismatch`] unless there is exactly one window of
    ///   each direction.
    /// * [`FepBarError::MissingTemperature`] if either window has no temperature.
    /// * [`FepBarError::TemperatureMismatch`] if the temperatures differ.
    pub fn new(forward: Window, backward: Window) -> Result<Self, FepBarError> {
        if forward.label() != backward.label() {
            return Err(FepBarError::LabelMismatch {
                forward: forward.label().to_string(),
                backward: backward.label().to_string(),
            });
        }
        if forward.direction() != Direction::Forward
            || backward.direction() != Direction::Backward
        {
            return Err(FepBarError::DirectionMismatch {
                label: forward.label().to_string(),
            });
        }

        let t_forward = forward.temperature().ok_or(FepBarError::MissingTemperature {
            label: forward.label().to_string(),
        })?;
        let t_backward = backward
            .temperature()
            .ok_or(FepBarError::MissingTemperature {
                label: backward.label().to_string(),
            })?;
        if t_forward != t_backward {
            return Err(FepBarError::TemperatureMismatch {
                label: forward.label().to_string(),
                forward: t_forward,
                backward: t_backward,
            });
        }

        Ok(Self { forward, backward })
    }

    /// The forward member.
    pub fn forward(&self) -> &Window {
        &self.forward
    }

    /// The backward member.
    pub fn backward(&self) -> &Window {
        &self.backward
    }

    /// The shared window label.
    pub fn label(&self) -> &str {
        self.forward.label()
    }

    /// The shared simulation temperature in Kelvin.
    pub fn temperature(&self) -> f64 {
        // Present and equal on both members by construction.
        self.forward.temperature().unwrap_or_default()
    }

    /// Position of the pair along the pathway (the lower lambda endpoint).
    pub fn pathway_position(&self) -> f64 {
        self.forward.pathway_position()
    }

    /// The pathway coordinate reached once this window is traversed forward.
    pub fn upper_lambda(&self) -> f64 {
        self.forward.upper_lambda()
    }
}
