//! Newton-Raphson iteration for nonlinear systems.
//!
//! Solves `F(x) = 0` given a residual `F` and its Jacobian `J` by repeating
//!
//! ```text
//! J(x) * dx = -F(x)
//! x        += damping * dx
//! ```
//!
//! until both the step and the residual are small in the infinity norm.

use log::{debug, info, warn};

use super::options::NewtonOptions;
use crate::error::{ConvergenceFailure, ErrorKind, NodalError, Result};
use crate::linalg::{solve_linear_system, Matrix, Vector};

/// A nonlinear system of `size()` equations in `size()` unknowns.
///
/// Implementations hold no iteration state; both methods may be called any
/// number of times with different `x`.
pub trait NonlinearSystem {
    /// Number of unknowns.
    fn size(&self) -> usize;

    /// Evaluate the residual `F(x)`.
    fn residual(&self, x: &Vector) -> Vector;

    /// Evaluate the Jacobian `dF/dx` at `x`.
    fn jacobian(&self, x: &Vector) -> Matrix;
}

/// A [`NonlinearSystem`] built from a pair of closures.
pub struct FnSystem<R, J> {
    size: usize,
    residual: R,
    jacobian: J,
}

impl<R, J> FnSystem<R, J>
where
    R: Fn(&Vector) -> Vector,
    J: Fn(&Vector) -> Matrix,
{
    /// Wrap a residual/Jacobian pair of dimension `size`.
    pub fn new(size: usize, residual: R, jacobian: J) -> Self {
        Self {
            size,
            residual,
            jacobian,
        }
    }
}

impl<R, J> NonlinearSystem for FnSystem<R, J>
where
    R: Fn(&Vector) -> Vector,
    J: Fn(&Vector) -> Matrix,
{
    fn size(&self) -> usize {
        self.size
    }

    fn residual(&self, x: &Vector) -> Vector {
        (self.residual)(x)
    }

    fn jacobian(&self, x: &Vector) -> Matrix {
        (self.jacobian)(x)
    }
}

/// Outcome of a converged Newton-Raphson run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NewtonResult {
    /// Converged solution vector.
    pub solution: Vector,
    /// Always true; failures are returned as errors.
    pub converged: bool,
    /// Newton steps taken (0 if the initial guess already satisfied the tolerance).
    pub iterations: usize,
    /// Infinity norm of `F(solution)`.
    pub final_residual_norm: f64,
    /// Infinity norm of the last applied step.
    pub final_update_norm: f64,
}

fn evaluate_residual<S: NonlinearSystem + ?Sized>(system: &S, x: &Vector) -> Result<Vector> {
    let f = system.residual(x);
    if f.len() != system.size() {
        return Err(NodalError::invalid_parameter(format!(
            "residual has length {}, system size is {}",
            f.len(),
            system.size()
        )));
    }
    Ok(f)
}

/// Solve `F(x) = 0` starting from `initial_guess`.
///
/// Converges when both the damped update and the residual fall below
/// `absolute_tolerance` in the infinity norm. A non-finite residual at the
/// initial guess is [`ErrorKind::InvalidParameter`]. A singular Jacobian or a
/// step that makes the residual non-finite aborts immediately; running out of
/// iterations reports the last norms. These failures surface as
/// [`ErrorKind::ConvergenceFailed`].
pub fn solve_newton_raphson<S: NonlinearSystem + ?Sized>(
    system: &S,
    initial_guess: &Vector,
    options: &NewtonOptions,
) -> Result<NewtonResult> {
    let size = system.size();
    if initial_guess.len() != size {
        return Err(NodalError::invalid_parameter(format!(
            "initial guess has length {}, system size is {}",
            initial_guess.len(),
            size
        )));
    }
    options.validate()?;
    let linear_options = options.solver_options();

    let mut x = initial_guess.clone();
    let mut f = evaluate_residual(system, &x)?;
    if !f.is_finite() {
        return Err(NodalError::invalid_parameter(
            "residual is not finite at the initial guess",
        ));
    }
    let mut residual_norm = f.norm_inf();

    if residual_norm < options.absolute_tolerance {
        info!("initial guess already converged (residual {:.3e})", residual_norm);
        return Ok(NewtonResult {
            solution: x,
            converged: true,
            iterations: 0,
            final_residual_norm: residual_norm,
            final_update_norm: 0.0,
        });
    }

    let mut update_norm = f64::INFINITY;
    for iteration in 1..=options.max_iterations {
        let jacobian = system.jacobian(&x);
        if jacobian.rows() != size || jacobian.cols() != size {
            return Err(NodalError::invalid_parameter(format!(
                "Jacobian is {}x{}, system size is {}",
                jacobian.rows(),
                jacobian.cols(),
                size
            )));
        }

        let delta = match solve_linear_system(&jacobian, &f.scale(-1.0), &linear_options) {
            Ok(delta) => delta,
            Err(e) if e.kind() == ErrorKind::SingularMatrix => {
                warn!("singular Jacobian at iteration {}", iteration);
                return Err(NodalError::convergence_failure(
                    ConvergenceFailure::SingularJacobian { iteration },
                ));
            }
            Err(e) => return Err(e),
        };

        let step = delta.scale(options.damping_factor);
        update_norm = step.norm_inf();
        x = x.add(&step)?;

        f = evaluate_residual(system, &x)?;
        if !f.is_finite() {
            warn!("non-finite residual at iteration {}", iteration);
            return Err(NodalError::convergence_failure(
                ConvergenceFailure::NonFiniteResidual { iteration },
            ));
        }
        residual_norm = f.norm_inf();

        debug!(
            "iteration {}: update {:.3e}, residual {:.3e}",
            iteration, update_norm, residual_norm
        );

        if update_norm < options.absolute_tolerance && residual_norm < options.absolute_tolerance {
            info!("Newton-Raphson converged in {} iterations", iteration);
            return Ok(NewtonResult {
                solution: x,
                converged: true,
                iterations: iteration,
                final_residual_norm: residual_norm,
                final_update_norm: update_norm,
            });
        }
    }

    warn!(
        "Newton-Raphson stopped after {} iterations (residual {:.3e})",
        options.max_iterations, residual_norm
    );
    Err(NodalError::convergence_failure(
        ConvergenceFailure::MaxIterationsExceeded {
            iterations: options.max_iterations,
            residual_norm,
            update_norm,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sqrt2_system() -> impl NonlinearSystem {
        FnSystem::new(
            1,
            |x: &Vector| Vector::from_vec(vec![x.get(0) * x.get(0) - 2.0]),
            |x: &Vector| Matrix::from_raw(1, 1, vec![2.0 * x.get(0)]),
        )
    }

    #[test]
    fn test_sqrt2_quadratic_convergence() {
        let result = solve_newton_raphson(
            &sqrt2_system(),
            &Vector::from_vec(vec![1.0]),
            &NewtonOptions::default(),
        )
        .unwrap();
        assert!(result.converged);
        assert!(result.iterations < 10, "took {} iterations", result.iterations);
        assert_abs_diff_eq!(result.solution.get(0), 2.0f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_damping_increases_iterations() {
        let guess = Vector::from_vec(vec![1.0]);
        let full = solve_newton_raphson(&sqrt2_system(), &guess, &NewtonOptions::default()).unwrap();
        let half = solve_newton_raphson(
            &sqrt2_system(),
            &guess,
            &NewtonOptions::default().with_damping_factor(0.5),
        )
        .unwrap();
        assert!(half.iterations > full.iterations);
        assert_abs_diff_eq!(half.solution.get(0), 2.0f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_already_converged_guess() {
        let system = FnSystem::new(
            1,
            |x: &Vector| Vector::from_vec(vec![x.get(0) - 3.0]),
            |_: &Vector| -> Matrix { panic!("Jacobian must not be evaluated") },
        );
        let result =
            solve_newton_raphson(&system, &Vector::from_vec(vec![3.0]), &NewtonOptions::default())
                .unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.final_update_norm, 0.0);
    }

    #[test]
    fn test_zero_jacobian_is_singular() {
        let system = FnSystem::new(
            1,
            |x: &Vector| Vector::from_vec(vec![x.get(0) * x.get(0) - 2.0]),
            |_: &Vector| Matrix::zeros(1, 1),
        );
        let err = solve_newton_raphson(&system, &Vector::from_vec(vec![1.0]), &NewtonOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConvergenceFailed);
        assert!(err.to_string().contains("singular Jacobian at iteration 1"));
    }

    #[test]
    fn test_non_finite_initial_residual() {
        // sqrt(x - 4) is NaN at x = 0
        let system = FnSystem::new(
            1,
            |x: &Vector| Vector::from_vec(vec![(x.get(0) - 4.0).sqrt() - 1.0]),
            |_: &Vector| Matrix::identity(1),
        );
        let err = solve_newton_raphson(&system, &Vector::from_vec(vec![0.0]), &NewtonOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_step_into_nan_residual() {
        // Wrong-signed Jacobian sends x from 1 to -1, where sqrt is NaN
        let system = FnSystem::new(
            1,
            |x: &Vector| Vector::from_vec(vec![x.get(0).sqrt() - 3.0]),
            |_: &Vector| Matrix::from_raw(1, 1, vec![-1.0]),
        );
        let err = solve_newton_raphson(&system, &Vector::from_vec(vec![1.0]), &NewtonOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConvergenceFailed);
        match err {
            NodalError::ConvergenceFailed { reason } => {
                assert_eq!(reason, ConvergenceFailure::NonFiniteResidual { iteration: 1 });
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_max_iterations_exceeded() {
        let err = solve_newton_raphson(
            &sqrt2_system(),
            &Vector::from_vec(vec![1.0]),
            &NewtonOptions::default().with_max_iterations(2),
        )
        .unwrap_err();
        match err {
            NodalError::ConvergenceFailed {
                reason:
                    ConvergenceFailure::MaxIterationsExceeded {
                        iterations,
                        residual_norm,
                        update_norm,
                    },
            } => {
                assert_eq!(iterations, 2);
                assert!(residual_norm > 0.0);
                assert!(update_norm > 0.0);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_two_dimensional_system() {
        // x^2 + y^2 = 4, x = y  ->  x = y = sqrt(2)
        let system = FnSystem::new(
            2,
            |v: &Vector| {
                let (x, y) = (v.get(0), v.get(1));
                Vector::from_vec(vec![x * x + y * y - 4.0, x - y])
            },
            |v: &Vector| Matrix::from_raw(2, 2, vec![2.0 * v.get(0), 2.0 * v.get(1), 1.0, -1.0]),
        );
        let result =
            solve_newton_raphson(&system, &Vector::from_vec(vec![1.0, 2.0]), &NewtonOptions::default())
                .unwrap();
        assert_abs_diff_eq!(result.solution.get(0), 2.0f64.sqrt(), epsilon = 1e-10);
        assert_abs_diff_eq!(result.solution.get(1), 2.0f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_precondition_errors() {
        let guess = Vector::from_vec(vec![1.0, 2.0]);
        let err = solve_newton_raphson(&sqrt2_system(), &guess, &NewtonOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let guess = Vector::from_vec(vec![1.0]);
        for opts in [
            NewtonOptions::default().with_damping_factor(0.0),
            NewtonOptions::default().with_damping_factor(1.01),
            NewtonOptions::default().with_max_iterations(0),
        ] {
            let err = solve_newton_raphson(&sqrt2_system(), &guess, &opts).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        }
    }
}
