//! # Nodal Core
//!
//! A DC operating-point solver for linear circuits.
//!
//! This library provides:
//! - A SPICE-flavoured netlist language for describing circuits
//! - Modified Nodal Analysis (MNA) assembly with topology validation
//! - Dense LU factorization with partial pivoting
//! - A damped Newton-Raphson driver for nonlinear systems
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the netlist language
//! - [`components`] - Component models (resistors, sources, ground marker)
//! - [`circuit`] - Circuit container and topology validation
//! - [`linalg`] - Dense matrices, LU factorization and linear solves
//! - [`solver`] - MNA assembly, DC analysis and Newton-Raphson
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! nodal divider.net --json
//! ```
//!
//! ### Library
//!
//! ```
//! use nodal_core::{analyze_dc, dsl, SolverOptions};
//!
//! let circuit = dsl::parse_circuit("V1 in 0 DC 12\nR1 in out 1k\nR2 out 0 2k").unwrap();
//! let result = analyze_dc(&circuit, &SolverOptions::default()).unwrap();
//! assert!((result.operating_point.node_voltages["out"] - 8.0).abs() < 1e-9);
//! ```
//!
//! ## Solution Method
//!
//! 1. Validate the topology (ground present, no floating nodes, DC-capable parts)
//! 2. Assign matrix indices: sorted node ids, then one branch per voltage source
//! 3. Stamp every component into A and z
//! 4. Solve Ax = z by LU factorization and read back voltages, currents and powers

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod linalg;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{ErrorKind, NodalError, Result};
pub use solver::{analyze_dc, solve_newton_raphson, DcAnalysis, NewtonOptions, SolverOptions};
