//! The core `BarSolver` implementing Bennett Acceptance Ratio estimation for one
//! window.
//!
//! Given the forward and reverse work samples of a window and the simulation
//! temperature, the solver evaluates the BAR zero function
//!
//! ```text
//! zero(ΔF) = kT · ( logmean({w_r + ΔF}) − logmean({w_f − ΔF}) )
//! ```
//!
//! where `logmean(x) = ln((1/n)·Σ 1/(1+exp(xᵢ)))`, and iterates the self-consistent
//! fixed point `ΔF ← ΔF + zero(ΔF)` until the residual falls below tolerance. The
//! root of the zero function in `ΔF` is the BAR free-energy estimate for the
//! window. All exponentials are evaluated in log space (see
//! [`crate::math::logistic`]); the naive formulation overflows for the work
//! magnitudes real simulations produce.

use crate::error::FepBarError;
use crate::math::constants::BOLTZMANN_KCAL_MOL_K;
use crate::math::logistic::log_mean_logistic;
use crate::solver::options::SolverOptions;
use crate::types::WindowPair;
use serde::Serialize;

/// Outcome of the self-consistent iteration.
///
/// A non-converged outcome still carries a usable (if unpolished) estimate in
/// [`BarSolution::delta_f`]; callers must check the convergence status before
/// treating it as final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Convergence {
    /// The residual fell below tolerance.
    Converged {
        /// Number of zero-function evaluations performed, including the final one.
        iterations: u32,
    },
    /// The iteration cap was exhausted with the residual still above tolerance.
    MaxIterationsExceeded {
        /// The cap that was exhausted.
        max_iterations: u32,
    },
}

/// A BAR estimate for one window, with its convergence status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarSolution {
    /// The estimated free-energy change in kcal/mol.
    pub delta_f: f64,
    /// Whether and how fast the self-consistent iteration converged.
    pub convergence: Convergence,
}

impl BarSolution {
    /// True if the residual fell below tolerance.
    pub fn is_converged(&self) -> bool {
        matches!(self.convergence, Convergence::Converged { .. })
    }
}

/// Single-window BAR estimator over borrowed forward and reverse work samples.
///
/// The solver is a pure numerical component: it owns no samples and carries no
/// state between calls, so one instance may be queried repeatedly (for example to
/// probe the zero function directly).
pub struct BarSolver<'w> {
    forward_work: &'w [f64],
    reverse_work: &'w [f64],
    kt: f64,
    options: SolverOptions,
}

impl<'w> BarSolver<'w> {
    /// Creates a solver over the two work-sample collections of one window.
    ///
    /// `temperature` is in Kelvin and fixes the thermal energy scale
    /// kT = k·T with k in kcal·mol⁻¹·K⁻¹.
    ///
    /// # Errors
    ///
    /// [`FepBarError::EmptySampleSet`] if either collection is empty.
    pub fn new(
        forward_work: &'w [f64],
        reverse_work: &'w [f64],
        temperature: f64,
    ) -> Result<Self, FepBarError> {
        if forward_work.is_empty() || reverse_work.is_empty() {
            return Err(FepBarError::EmptySampleSet);
        }
        Ok(Self {
            forward_work,
            reverse_work,
            kt: BOLTZMANN_KCAL_MOL_K * temperature,
            options: SolverOptions::default(),
        })
    }

    /// Creates a solver directly from a validated window pair.
    ///
    /// Fails with [`FepBarError::EmptySampleSet`] if either window's samples have
    /// been discarded.
    pub fn for_pair(pair: &'w WindowPair) -> Result<Self, FepBarError> {
        Self::new(
            pair.forward().samples(),
            pair.backward().samples(),
            pair.temperature(),
        )
    }

    /// Replaces the default solver options.
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Evaluates the BAR zero function at the given free-energy estimate.
    ///
    /// The function is continuous and strictly decreasing in `delta_f`; its unique
    /// root is the BAR estimate. The magnitude of the return value is the
    /// convergence residual in kcal/mol.
    pub fn zero_function(&self, delta_f: f64) -> f64 {
        let log_mean_reverse = log_mean_logistic(self.reverse_work, delta_f);
        let log_mean_forward = log_mean_logistic(self.forward_work, -delta_f);
        self.kt * (log_mean_reverse - log_mean_forward)
    }

    /// Runs the self-consistent iteration `ΔF ← ΔF + zero(ΔF)` from the given
    /// initial guess.
    ///
    /// When available, the free-energy estimate transcribed from the simulation log
    /// makes a much better guess than zero and materially reduces the iteration
    /// count. Re-invoking `solve` with a converged estimate returns the same value
    /// after a single evaluation.
    ///
    /// # Errors
    ///
    /// [`FepBarError::NumericalDivergence`] if the estimate or the residual
    /// becomes non-finite at any iteration.
    pub fn solve(&self, initial_guess: f64) -> Result<BarSolution, FepBarError> {
        let mut delta_f = initial_guess;

        for iteration in 1..=self.options.max_iterations {
            let residual = self.zero_function(delta_f);
            if !residual.is_finite() || !delta_f.is_finite() {
                return Err(FepBarError::NumericalDivergence { delta_f, iteration });
            }
            if residual.abs() < self.options.tolerance {
                return Ok(BarSolution {
                    delta_f,
                    convergence: Convergence::Converged {
                        iterations: iteration,
                    },
                });
            }
            delta_f += residual;
        }

        Ok(BarSolution {
            delta_f,
            convergence: Convergence::MaxIterationsExceeded {
                max_iterations: self.options.max_iterations,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // With a single sample per direction the root is analytic:
    // zero(ΔF) = kT·(softplus(a−ΔF) − softplus(b+ΔF)) vanishes at ΔF = (a−b)/2.
    fn single_sample_solver<'w>(a: &'w [f64; 1], b: &'w [f64; 1]) -> BarSolver<'w> {
        BarSolver::new(a.as_slice(), b.as_slice(), 300.0).unwrap()
    }

    #[test]
    fn test_empty_sample_set_rejected() {
        let work = [1.0];
        assert!(matches!(
            BarSolver::new(&[], &work, 300.0),
            Err(FepBarError::EmptySampleSet)
        ));
        assert!(matches!(
            BarSolver::new(&work, &[], 300.0),
            Err(FepBarError::EmptySampleSet)
        ));
    }

    #[test]
    fn test_single_sample_analytic_root() {
        let a = [1.0];
        let b = [0.0];
        let solver = single_sample_solver(&a, &b);
        let solution = solver.solve(0.0).unwrap();
        assert!(solution.is_converged());
        assert_relative_eq!(solution.delta_f, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_function_vanishes_at_root() {
        let a = [2.0];
        let b = [0.0];
        let solver = single_sample_solver(&a, &b);
        assert_relative_eq!(solver.zero_function(1.0), 0.0, epsilon = 1e-12);
        assert!(solver.zero_function(0.0) > 0.0);
        assert!(solver.zero_function(2.0) < 0.0);
    }

    #[test]
    fn test_nan_sample_diverges() {
        let a = [f64::NAN];
        let b = [0.0];
        let solver = single_sample_solver(&a, &b);
        assert!(matches!(
            solver.solve(0.0),
            Err(FepBarError::NumericalDivergence { iteration: 1, .. })
        ));
    }

    #[test]
    fn test_max_iterations_reported() {
        let a = [1.0];
        let b = [0.0];
        let solver = single_sample_solver(&a, &b).with_options(SolverOptions {
            tolerance: 1e-8,
            max_iterations: 1,
        });
        let solution = solver.solve(40.0).unwrap();
        assert!(matches!(
            solution.convergence,
            Convergence::MaxIterationsExceeded { max_iterations: 1 }
        ));
    }

    #[test]
    fn test_extreme_work_values_stay_finite() {
        // Work magnitudes in the hundreds overflow the naive formulation.
        let a = [350.0, 420.0, 390.0];
        let b = [-360.0, -410.0, -385.0];
        let solver = BarSolver::new(&a, &b, 300.0).unwrap();
        let z = solver.zero_function(0.0);
        assert!(z.is_finite());
        let solution = solver.solve(0.0).unwrap();
        assert!(solution.delta_f.is_finite());
    }
}
