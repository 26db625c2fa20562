//! This module defines physical constants and default numerical settings used throughout
//! the fepbar library.
//!
//! The values here fix the energy units of the whole crate: work samples are read in
//! kcal/mol and all free-energy results are reported in kcal/mol.

/// Boltzmann constant in kcal·mol⁻¹·K⁻¹.
///
/// Multiplied by the simulation temperature this gives kT, the thermal energy scale
/// that converts the dimensionless BAR residual into a free-energy increment.
pub const BOLTZMANN_KCAL_MOL_K: f64 = 0.001987200;

/// Default convergence tolerance for the self-consistent BAR iteration.
///
/// The solver stops once the absolute value of the BAR zero function falls below this
/// threshold, i.e. once further iterations would change the estimate by less than
/// this many kcal/mol.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Default cap on the number of self-consistent iterations.
///
/// Well-behaved work distributions converge in far fewer iterations; the cap acts as
/// the solver's own timeout for pathological inputs.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Default ceiling on the number of windows expected along one pathway.
///
/// Window labels carry the lambda endpoints at a fixed decimal precision; the
/// precision is chosen from this ceiling so that distinct windows always format to
/// distinct labels. See [`crate::types::label_decimals`].
pub const DEFAULT_MAX_WINDOWS: usize = 100;
