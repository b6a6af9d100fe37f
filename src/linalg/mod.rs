//! Dense linear algebra for the solver core.
//!
//! - [`Matrix`] / [`Vector`]: owned row-major value types
//! - [`factorize`]: LU factorization with partial pivoting
//! - [`solve`], [`solve_multiple`], [`inverse`]: substitution against an [`LuResult`]
//! - [`solve_linear_system`]: factorize and solve in one call

mod linear;
mod lu;
mod matrix;

pub use linear::{inverse, solve, solve_linear_system, solve_multiple};
pub use lu::{determinant, extract_l, extract_u, factorize, permute_rows, LuResult};
pub use matrix::{Matrix, Vector};
