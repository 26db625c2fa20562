//! fepbar computes free-energy differences from paired forward/backward FEP work
//! measurements using the Bennett Acceptance Ratio (BAR) method, window by window
//! across an alchemical transformation pathway.
//!
//! The pipeline is: fepout log text → [`parser::FepoutParser`] → validated
//! [`types::Window`]s → [`pairing::pair_windows`] → [`types::WindowPair`]s →
//! [`solver::BarSolver`] (with optional [`histogram`] diagnostics) →
//! [`pathway::PathwayAggregator`] → [`pathway::PathwayProfile`], the report
//! consumed by whatever frontend formats the output.
//!
//! All estimation happens in log space so that work values in the hundreds of
//! kcal/mol never overflow, and every domain invariant (lambda ordering, label
//! matching, direction and temperature consistency) is validated at construction
//! rather than discovered mid-solve.

pub mod error;
pub mod histogram;
pub mod math;
pub mod pairing;
pub mod parser;
pub mod pathway;
pub mod solver;
pub mod types;

pub use error::FepBarError;
pub use histogram::{Histogram, HistogramBin, HistogramBuilder};
pub use pairing::{pair_windows, PairingOutcome};
pub use parser::{FepoutParser, ParsedStream};
pub use pathway::{
    AnalysisOptions, PathwayAggregator, PathwayProfile, ProfileStatus, WindowRecord, WindowStatus,
    WorkHistograms,
};
pub use solver::{BarSolution, BarSolver, Convergence, SolverOptions};
pub use types::{label_decimals, Direction, Window, WindowPair};
