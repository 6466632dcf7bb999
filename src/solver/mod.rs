//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine for DC circuit solving.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and battery branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   0 ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations)
//! - B, C connect batteries to nodes
//! - v is the vector of non-reference node voltages
//! - j is the vector of battery currents
//! - i is the sum of current injections into each node (LED offsets)
//! - e is the vector of battery EMFs
//!
//! ## LEDs
//!
//! LEDs are piecewise linear. Each solve runs the linear system repeatedly,
//! re-deciding every LED's `On`/`Leak` state from its solved voltage drop
//! until nothing changes or the pass limit is reached.

mod dc;
mod iteration;
mod linear;
mod mna;
mod result;

pub use dc::{solve, solve_with_config, DcSolver, ReferenceNode, SolverConfig};
pub use iteration::{ConductionStates, IterationOutcome, LedIteration};
pub use linear::{solve_dense, DenseMatrix};
pub use mna::{assemble, MnaLayout, MnaSystem};
pub use result::{FailureReason, SolveResult};

/// Default cap on LED passes per solve.
pub const DEFAULT_MAX_ITERATIONS: usize = 14;

/// Resistance of wires and closed switches (ohms).
pub const WIRE_RESISTANCE: f64 = 1e-6;

/// Minimum conductance to prevent singular matrix.
pub const MIN_CONDUCTANCE: f64 = 1e-12;

/// Pivots smaller than this mark the matrix as singular.
pub const PIVOT_EPSILON: f64 = 1e-15;

/// Slack on the LED forward-voltage comparison (volts).
pub const THRESHOLD_EPSILON: f64 = 1e-9;
