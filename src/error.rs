use crate::types::Direction;
use thiserror::Error;

/// The primary error type for all fallible operations in the `fepbar` library.
///
/// The variants split into three groups with different handling policies:
///
/// * Precondition violations (`InvalidWindow`, `EmptySampleSet`, `InvalidBinCount`,
///   `MissingTemperature`) are surfaced immediately at construction time; they
///   indicate caller or input misuse.
/// * Per-window input problems (`MalformedWindow`, `AmbiguousLabel`,
///   `UnpairedWindow`, `LabelMismatch`, `DirectionMismatch`,
///   `TemperatureMismatch`) are collected as diagnostics by the parser and the
///   pairer so one bad window never aborts processing of the rest.
/// * Numerical failures (`NumericalDivergence`) mark a single window's estimate as
///   failed inside the aggregate profile.
#[derive(Error, Debug)]
pub enum FepBarError {
    /// A window was declared with identical lambda endpoints, so no direction can
    /// be derived and the window carries no thermodynamic meaning.
    #[error("Degenerate window: lambda1 == lambda2 == {lambda}")]
    InvalidWindow {
        /// The repeated lambda value.
        lambda: f64,
    },

    /// The fepout marker sequence was violated: a marker appeared outside the
    /// canonical new → samples → complete order, a numeric field was missing or
    /// unparseable, or the stream ended with a window still open.
    #[error("Malformed window at line {line}: {reason}")]
    MalformedWindow {
        /// 1-based line number in the input stream where the violation was detected.
        line: usize,
        /// Human-readable description of the violated expectation.
        reason: String,
    },

    /// A work-sample collection was empty where at least one sample is required.
    #[error("At least one work sample is required in each direction")]
    EmptySampleSet,

    /// The self-consistent iteration produced a non-finite free-energy estimate or
    /// residual. Distinct from running out of iterations: a diverged state carries
    /// no usable estimate at all.
    #[error("BAR iteration diverged to a non-finite value at iteration {iteration}")]
    NumericalDivergence {
        /// The last free-energy estimate before divergence was detected.
        delta_f: f64,
        /// The iteration at which a non-finite value first appeared.
        iteration: u32,
    },

    /// Two windows of the same direction share a label, so pairing by label would
    /// be ambiguous.
    #[error("Duplicate {direction} window '{label}': pairing would be ambiguous")]
    AmbiguousLabel {
        /// The duplicated label.
        label: String,
        /// The direction in which the duplicate was found.
        direction: Direction,
    },

    /// A window has no counterpart of the opposite direction. Reported as a
    /// diagnostic by the pairer, never silently dropped.
    #[error("No {} counterpart for {direction} window '{label}'", .direction.opposite())]
    UnpairedWindow {
        /// The label of the window that could not be paired.
        label: String,
        /// The direction of the unpaired window.
        direction: Direction,
    },

    /// A window pair was constructed from two windows with different labels.
    #[error("Windows '{forward}' and '{backward}' do not describe the same lambda pair")]
    LabelMismatch {
        /// Label of the window supplied as the forward member.
        forward: String,
        /// Label of the window supplied as the backward member.
        backward: String,
    },

    /// A window pair must hold exactly one forward and one backward window.
    #[error("Window pair '{label}' does not hold one forward and one backward window")]
    DirectionMismatch {
        /// The shared label of the offending windows.
        label: String,
    },

    /// The two members of a window pair were simulated at different temperatures,
    /// so their work distributions are not comparable.
    #[error("Temperature mismatch for window '{label}': forward {forward} K, backward {backward} K")]
    TemperatureMismatch {
        /// The shared label of the offending windows.
        label: String,
        /// Temperature assigned to the forward window.
        forward: f64,
        /// Temperature assigned to the backward window.
        backward: f64,
    },

    /// A window reached estimation without a temperature assigned.
    #[error("Window '{label}' has no temperature assigned; required before estimation")]
    MissingTemperature {
        /// The label of the window missing a temperature.
        label: String,
    },

    /// A histogram was requested with zero bins.
    #[error("Histogram bin count must be at least 1")]
    InvalidBinCount,

    /// An I/O error occurred while reading an input stream.
    #[error("I/O error while reading input stream: {0}")]
    Io(#[from] std::io::Error),
}
