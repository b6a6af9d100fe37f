//! Solver configuration.

use super::{
    DEFAULT_ABSOLUTE_TOLERANCE, DEFAULT_DAMPING_FACTOR, DEFAULT_MAX_ITERATIONS,
    DEFAULT_PIVOT_TOLERANCE, DEFAULT_RELATIVE_TOLERANCE,
};
use crate::error::{NodalError, Result};

/// Configuration shared by the linear and DC solvers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SolverOptions {
    /// Iteration cap for iterative solvers.
    pub max_iterations: usize,
    /// Absolute tolerance on residual and update norms.
    pub absolute_tolerance: f64,
    /// Relative tolerance. Carried and validated, but the Newton-Raphson
    /// convergence test only compares absolute norms.
    pub relative_tolerance: f64,
    /// Pivots smaller than this in magnitude mark a matrix singular.
    pub pivot_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

impl SolverOptions {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the absolute tolerance.
    pub fn with_absolute_tolerance(mut self, tolerance: f64) -> Self {
        self.absolute_tolerance = tolerance;
        self
    }

    /// Set the relative tolerance.
    pub fn with_relative_tolerance(mut self, tolerance: f64) -> Self {
        self.relative_tolerance = tolerance;
        self
    }

    /// Set the pivot tolerance.
    ///
    /// Raising it reports ill-conditioned circuits as singular instead of
    /// returning numerically unreliable voltages.
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(NodalError::invalid_parameter(
                "max_iterations must be a positive integer",
            ));
        }
        check_tolerance("absolute_tolerance", self.absolute_tolerance)?;
        check_tolerance("relative_tolerance", self.relative_tolerance)?;
        check_tolerance("pivot_tolerance", self.pivot_tolerance)
    }
}

fn check_tolerance(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(NodalError::invalid_parameter(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Configuration for [`solve_newton_raphson`](super::solve_newton_raphson).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NewtonOptions {
    /// Maximum Newton iterations.
    pub max_iterations: usize,
    /// Both the update and residual infinity norms must fall below this.
    pub absolute_tolerance: f64,
    /// Not consulted by the convergence test.
    pub relative_tolerance: f64,
    /// Pivot tolerance for each inner linear solve.
    pub pivot_tolerance: f64,
    /// Step scale in `(0, 1]`; 1 is an undamped Newton step.
    pub damping_factor: f64,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        SolverOptions::default().into()
    }
}

impl From<SolverOptions> for NewtonOptions {
    fn from(options: SolverOptions) -> Self {
        Self {
            max_iterations: options.max_iterations,
            absolute_tolerance: options.absolute_tolerance,
            relative_tolerance: options.relative_tolerance,
            pivot_tolerance: options.pivot_tolerance,
            damping_factor: DEFAULT_DAMPING_FACTOR,
        }
    }
}

impl NewtonOptions {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the absolute convergence tolerance.
    pub fn with_absolute_tolerance(mut self, tolerance: f64) -> Self {
        self.absolute_tolerance = tolerance;
        self
    }

    /// Set the relative tolerance. Carried and validated, not used by the convergence test.
    pub fn with_relative_tolerance(mut self, tolerance: f64) -> Self {
        self.relative_tolerance = tolerance;
        self
    }

    /// Set the pivot tolerance used for each Jacobian factorization.
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    /// Set the damping factor.
    ///
    /// Smaller values take shorter steps and need more iterations.
    pub fn with_damping_factor(mut self, damping_factor: f64) -> Self {
        self.damping_factor = damping_factor;
        self
    }

    /// The linear-solver subset of these options.
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            max_iterations: self.max_iterations,
            absolute_tolerance: self.absolute_tolerance,
            relative_tolerance: self.relative_tolerance,
            pivot_tolerance: self.pivot_tolerance,
        }
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(NodalError::invalid_parameter(format!(
                "damping_factor must be in (0, 1], got {}",
                self.damping_factor
            )));
        }
        self.solver_options().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SolverOptions::default();
        assert_eq!(opts.max_iterations, 100);
        assert_eq!(opts.absolute_tolerance, 1e-12);
        assert_eq!(opts.relative_tolerance, 1e-3);
        assert_eq!(opts.pivot_tolerance, 1e-13);
        assert!(opts.validate().is_ok());
        assert_eq!(NewtonOptions::default().damping_factor, 1.0);
    }

    #[test]
    fn test_validation() {
        assert!(SolverOptions::new().with_max_iterations(0).validate().is_err());
        assert!(SolverOptions::new().with_pivot_tolerance(f64::NAN).validate().is_err());
        assert!(SolverOptions::new().with_absolute_tolerance(-1.0).validate().is_err());
        assert!(SolverOptions::new().with_pivot_tolerance(0.0).validate().is_ok());

        assert!(NewtonOptions::new().with_damping_factor(0.0).validate().is_err());
        assert!(NewtonOptions::new().with_damping_factor(1.5).validate().is_err());
        assert!(NewtonOptions::new().with_damping_factor(f64::NAN).validate().is_err());
        assert!(NewtonOptions::new().with_damping_factor(0.25).validate().is_ok());
    }

    #[test]
    fn test_newton_relative_tolerance_builder() {
        let opts = NewtonOptions::new().with_relative_tolerance(1e-6);
        assert_eq!(opts.relative_tolerance, 1e-6);
        assert_eq!(opts.solver_options().relative_tolerance, 1e-6);
        assert!(NewtonOptions::new().with_relative_tolerance(-1.0).validate().is_err());
    }
}
