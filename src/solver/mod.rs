//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine for DC operating-point analysis.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations)
//! - B, C connect voltage sources to nodes
//! - D is 0 for ideal voltage sources
//! - v is the vector of node voltages
//! - j is the vector of voltage source currents
//! - i is the sum of current sources into each node
//! - e is the vector of voltage source values

mod dc;
mod mna;
mod newton;
mod options;

pub use dc::{analyze_dc, AnalysisType, ConvergenceInfo, DcAnalysis, OperatingPoint};
pub use mna::{assemble, MnaSystem, NodeIndexMap};
pub use newton::{solve_newton_raphson, FnSystem, NewtonResult, NonlinearSystem};
pub use options::{NewtonOptions, SolverOptions};

/// Maximum Newton-Raphson iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Convergence threshold for both the update and residual infinity norms.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 1e-12;

/// Relative tolerance. Validated and carried, not used by the convergence test.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-3;

/// Pivots with magnitude below this are treated as zero.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-13;

/// Full Newton step.
pub const DEFAULT_DAMPING_FACTOR: f64 = 1.0;
