//! Configuration options for the self-consistent BAR solver.

use crate::math::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

/// Numerical settings controlling the self-consistent BAR iteration.
///
/// The defaults (tolerance 1e-8, at most 1000 iterations) converge comfortably for
/// well-sampled work distributions; tighten or relax them to trade accuracy against
/// iteration count for difficult windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Convergence tolerance on the BAR residual, in kcal/mol.
    ///
    /// The iteration stops once `|zero_function(delta_f)|` falls below this value.
    pub tolerance: f64,
    /// Maximum number of self-consistent iterations before giving up.
    ///
    /// Exhausting the cap is reported as a distinct non-converged outcome, never
    /// silently returned as a final estimate.
    pub max_iterations: u32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}
