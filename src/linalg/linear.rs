//! Forward/backward substitution on top of an [`LuResult`].

use super::lu::{factorize, LuResult};
use super::matrix::{Matrix, Vector};
use crate::error::{NodalError, Result};
use crate::solver::SolverOptions;

fn ensure_usable(lu: &LuResult) -> Result<()> {
    if lu.is_singular() {
        return Err(NodalError::singular(format!(
            "{}x{} matrix has a pivot below tolerance",
            lu.size(),
            lu.size()
        )));
    }
    Ok(())
}

/// Solve `A x = b` for the `A` that produced `lu`.
pub fn solve(lu: &LuResult, b: &Vector) -> Result<Vector> {
    ensure_usable(lu)?;
    if b.len() != lu.size() {
        return Err(NodalError::invalid_parameter(format!(
            "right-hand side has length {}, factorization has size {}",
            b.len(),
            lu.size()
        )));
    }
    if !b.is_finite() {
        return Err(NodalError::invalid_parameter(
            "right-hand side contains non-finite entries",
        ));
    }
    Ok(Vector::from_vec(substitute(lu, b.data())))
}

/// Permute, then forward- and back-substitute. Assumes a non-singular `lu`
/// and a right-hand side of matching length.
fn substitute(lu: &LuResult, b: &[f64]) -> Vec<f64> {
    let n = lu.size();
    let packed = lu.lu().data();

    // Apply pivot permutation to b
    let mut x: Vec<f64> = lu.permutation().iter().map(|&src| b[src]).collect();

    // Forward substitution (L * y = Pb), unit diagonal
    for i in 0..n {
        let mut sum = x[i];
        for j in 0..i {
            sum -= packed[i * n + j] * x[j];
        }
        x[i] = sum;
    }

    // Back substitution (U * x = y)
    for i in (0..n).rev() {
        let mut sum = x[i];
        for j in (i + 1)..n {
            sum -= packed[i * n + j] * x[j];
        }
        x[i] = sum / packed[i * n + i];
    }

    x
}

/// Solve against every column of `b`, reusing one factorization.
pub fn solve_multiple(lu: &LuResult, b: &Matrix) -> Result<Matrix> {
    ensure_usable(lu)?;
    if b.rows() != lu.size() {
        return Err(NodalError::invalid_parameter(format!(
            "right-hand side has {} rows, factorization has size {}",
            b.rows(),
            lu.size()
        )));
    }
    if !b.is_finite() {
        return Err(NodalError::invalid_parameter(
            "right-hand side contains non-finite entries",
        ));
    }

    let n = lu.size();
    let cols = b.cols();
    let mut out = vec![0.0; n * cols];
    for j in 0..cols {
        let column = b.column(j);
        for (i, v) in substitute(lu, column.data()).into_iter().enumerate() {
            out[i * cols + j] = v;
        }
    }
    Ok(Matrix::from_raw(n, cols, out))
}

/// Inverse of the factorized matrix, one solve per identity column.
pub fn inverse(lu: &LuResult) -> Result<Matrix> {
    ensure_usable(lu)?;
    solve_multiple(lu, &Matrix::identity(lu.size()))
}

/// Factorize `a` and solve `a x = b` in one call.
pub fn solve_linear_system(a: &Matrix, b: &Vector, options: &SolverOptions) -> Result<Vector> {
    options.validate()?;
    if b.len() != a.rows() {
        return Err(NodalError::invalid_parameter(format!(
            "right-hand side has length {}, matrix has {} rows",
            b.len(),
            a.rows()
        )));
    }
    let lu = factorize(a, options.pivot_tolerance)?;
    solve(&lu, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix {
        Matrix::from_rows(&[
            vec![4.0, -2.0, 1.0],
            vec![-2.0, 4.0, -2.0],
            vec![1.0, -2.0, 4.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_solve_residual() {
        let a = sample();
        let b = Vector::from_vec(vec![11.0, -16.0, 17.0]);
        let lu = factorize(&a, 1e-13).unwrap();
        let x = solve(&lu, &b).unwrap();

        let residual = a.mul_vector(&x).unwrap().sub(&b).unwrap();
        assert!(residual.norm_inf() < 1e-12);
        assert_abs_diff_eq!(x.get(0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get(1), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get(2), 3.0, epsilon = 1e-12);

        let direct = solve_linear_system(&a, &b, &SolverOptions::default()).unwrap();
        assert_eq!(direct, x);
    }

    #[test]
    fn test_solve_with_pivoting() {
        let a = Matrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let x = solve_linear_system(&a, &Vector::from_vec(vec![3.0, 7.0]), &SolverOptions::default())
            .unwrap();
        assert_eq!(x.data(), &[7.0, 3.0]);
    }

    #[test]
    fn test_solve_rejects_singular_and_mismatch() {
        let singular = Matrix::from_rows(&[vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let lu = factorize(&singular, 1e-13).unwrap();
        let err = solve(&lu, &Vector::zeros(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SingularMatrix);

        let lu = factorize(&sample(), 1e-13).unwrap();
        let err = solve(&lu, &Vector::zeros(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err = solve_linear_system(&sample(), &Vector::zeros(4), &SolverOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_solve_multiple_matches_columns() {
        let a = sample();
        let lu = factorize(&a, 1e-13).unwrap();
        let b = Matrix::from_rows(&[vec![11.0, 1.0], vec![-16.0, 0.0], vec![17.0, 0.0]]).unwrap();
        let x = solve_multiple(&lu, &b).unwrap();

        for j in 0..2 {
            let single = solve(&lu, &b.column(j)).unwrap();
            assert_eq!(x.column(j), single);
        }
    }

    #[test]
    fn test_inverse() {
        let a = sample();
        let lu = factorize(&a, 1e-13).unwrap();
        let inv = inverse(&lu).unwrap();
        let product = a.multiply(&inv).unwrap();
        let identity = Matrix::identity(3);
        for (p, e) in product.data().iter().zip(identity.data()) {
            assert_abs_diff_eq!(*p, *e, epsilon = 1e-12);
        }

        let singular = Matrix::from_rows(&[vec![2.0, 4.0], vec![1.0, 2.0]]).unwrap();
        let lu = factorize(&singular, 1e-13).unwrap();
        assert_eq!(inverse(&lu).unwrap_err().kind(), ErrorKind::SingularMatrix);
    }
}
