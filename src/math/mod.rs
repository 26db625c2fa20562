//! Mathematical utilities and physical constants for the fepbar library.
//!
//! It contains the unit-fixing constants and default numerical settings, together with
//! the numerically stable logistic-function primitives that the BAR solver is built on.

/// Physical constants and default numerical settings.
pub mod constants;

/// Stable log-space logistic helpers (`ln(1/(1+eˣ))` and its sample mean).
pub mod logistic;
