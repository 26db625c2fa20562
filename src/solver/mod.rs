//! The Bennett Acceptance Ratio solver and its configuration.
//!
//! [`BarSolver`] is the numerical core of the crate: the log-space BAR zero
//! function and its self-consistent fixed-point iteration. [`SolverOptions`]
//! controls tolerance and the iteration cap.

mod implementation;
mod options;

pub use implementation::{BarSolution, BarSolver, Convergence};
pub use options::SolverOptions;
