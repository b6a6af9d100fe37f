//! LU factorization with partial pivoting.
//!
//! The factorization works column by column on a private copy of the input.
//! Both triangular factors are packed into one `n x n` buffer:
//!
//! ```text
//! [ u00 u01 u02 ]
//! [ l10 u11 u12 ]     L has an implicit unit diagonal
//! [ l20 l21 u22 ]
//! ```
//!
//! `permutation[i]` is the original row that ended up at pivoted row `i`,
//! so `P * A = L * U` where row `i` of `P * A` is row `permutation[i]` of `A`.

use log::{debug, warn};

use super::matrix::Matrix;
use crate::error::{NodalError, Result};

/// Immutable result of [`factorize`].
#[derive(Debug, Clone)]
pub struct LuResult {
    lu: Matrix,
    permutation: Vec<usize>,
    swap_count: usize,
    size: usize,
    singular: bool,
}

impl LuResult {
    /// Packed L (strictly lower) and U (diagonal and above) factors.
    pub fn lu(&self) -> &Matrix {
        &self.lu
    }

    /// Row permutation: pivoted row `i` came from original row `permutation[i]`.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Number of row transpositions performed.
    pub fn swap_count(&self) -> usize {
        self.swap_count
    }

    /// Dimension of the factorized matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether some pivot column fell below the pivot tolerance.
    ///
    /// A singular factorization is not a usable partial factorization;
    /// every solve against it is rejected.
    pub fn is_singular(&self) -> bool {
        self.singular
    }

    /// Determinant of the original matrix.
    pub fn determinant(&self) -> f64 {
        determinant(self)
    }
}

/// Factorize a square matrix with partial pivoting.
///
/// Rows whose pivot column has no entry at or above `pivot_tolerance` in
/// magnitude mark the result singular; that column is left un-eliminated.
/// An exact-zero pivot is singular even with a tolerance of 0.
pub fn factorize(a: &Matrix, pivot_tolerance: f64) -> Result<LuResult> {
    if !a.is_square() {
        return Err(NodalError::invalid_parameter(format!(
            "cannot factorize a non-square {}x{} matrix",
            a.rows(),
            a.cols()
        )));
    }
    if a.rows() == 0 {
        return Err(NodalError::invalid_parameter("cannot factorize an empty matrix"));
    }
    if !a.is_finite() {
        return Err(NodalError::invalid_parameter("matrix contains non-finite entries"));
    }
    if !pivot_tolerance.is_finite() || pivot_tolerance < 0.0 {
        return Err(NodalError::invalid_parameter(format!(
            "pivot tolerance must be finite and non-negative, got {}",
            pivot_tolerance
        )));
    }

    let n = a.rows();
    let mut lu = a.data().to_vec();
    let mut permutation: Vec<usize> = (0..n).collect();
    let mut swap_count = 0usize;
    let mut singular = false;

    for k in 0..n {
        // Find pivot; ties keep the lowest row
        let mut max_val = lu[k * n + k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = lu[i * n + k].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if max_val < pivot_tolerance || max_val == 0.0 {
            debug!("column {} has no usable pivot (max {:.3e})", k, max_val);
            singular = true;
            continue;
        }

        // Swap rows if needed
        if max_row != k {
            permutation.swap(k, max_row);
            swap_count += 1;
            for j in 0..n {
                lu.swap(k * n + j, max_row * n + j);
            }
        }

        // Eliminate
        let pivot = lu[k * n + k];
        for i in (k + 1)..n {
            let factor = lu[i * n + k] / pivot;
            lu[i * n + k] = factor;
            if factor == 0.0 {
                continue;
            }
            for j in (k + 1)..n {
                lu[i * n + j] -= factor * lu[k * n + j];
            }
        }
    }

    if singular {
        warn!("{}x{} matrix is singular at pivot tolerance {:.1e}", n, n, pivot_tolerance);
    } else {
        debug!("factorized {}x{} matrix with {} row swaps", n, n, swap_count);
    }

    Ok(LuResult {
        lu: Matrix::from_raw(n, n, lu),
        permutation,
        swap_count,
        size: n,
        singular,
    })
}

/// Explicit unit lower-triangular factor.
pub fn extract_l(lu: &LuResult) -> Matrix {
    let n = lu.size;
    let packed = lu.lu.data();
    let mut data = vec![0.0; n * n];
    for i in 0..n {
        data[i * n..i * n + i].copy_from_slice(&packed[i * n..i * n + i]);
        data[i * n + i] = 1.0;
    }
    Matrix::from_raw(n, n, data)
}

/// Explicit upper-triangular factor.
pub fn extract_u(lu: &LuResult) -> Matrix {
    let n = lu.size;
    let packed = lu.lu.data();
    let mut data = vec![0.0; n * n];
    for i in 0..n {
        data[i * n + i..(i + 1) * n].copy_from_slice(&packed[i * n + i..(i + 1) * n]);
    }
    Matrix::from_raw(n, n, data)
}

/// `(-1)^swap_count * prod(U_ii)`, or exactly 0 for a singular factorization.
pub fn determinant(lu: &LuResult) -> f64 {
    if lu.singular {
        return 0.0;
    }
    let n = lu.size;
    let packed = lu.lu.data();
    let product: f64 = (0..n).map(|i| packed[i * n + i]).product();
    if lu.swap_count % 2 == 1 {
        -product
    } else {
        product
    }
}

/// Rows of `a` reordered by the factorization's permutation (`P * A`).
pub fn permute_rows(lu: &LuResult, a: &Matrix) -> Result<Matrix> {
    if a.rows() != lu.size {
        return Err(NodalError::invalid_parameter(format!(
            "matrix has {} rows, factorization has size {}",
            a.rows(),
            lu.size
        )));
    }
    let mut data = Vec::with_capacity(a.rows() * a.cols());
    for &src in &lu.permutation {
        data.extend_from_slice(a.row(src));
    }
    Ok(Matrix::from_raw(a.rows(), a.cols(), data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOL: f64 = 1e-13;

    fn assert_matrix_eq(a: &Matrix, b: &Matrix, eps: f64) {
        assert_eq!(a.rows(), b.rows());
        assert_eq!(a.cols(), b.cols());
        for (x, y) in a.data().iter().zip(b.data()) {
            assert!((x - y).abs() < eps, "{} != {}\n{}\n{}", x, y, a, b);
        }
    }

    #[test]
    fn test_reconstruction() {
        let a = Matrix::from_rows(&[
            vec![2.0, 1.0, 1.0, 0.0],
            vec![4.0, 3.0, 3.0, 1.0],
            vec![8.0, 7.0, 9.0, 5.0],
            vec![6.0, 7.0, 9.0, 8.0],
        ])
        .unwrap();
        let lu = factorize(&a, TOL).unwrap();
        assert!(!lu.is_singular());

        let pa = permute_rows(&lu, &a).unwrap();
        let l_times_u = extract_l(&lu).multiply(&extract_u(&lu)).unwrap();
        assert_matrix_eq(&pa, &l_times_u, 1e-12);
    }

    #[test]
    fn test_determinant_examples() {
        let a = Matrix::from_rows(&[vec![2.0, 1.0], vec![4.0, 3.0]]).unwrap();
        assert_relative_eq!(factorize(&a, TOL).unwrap().determinant(), 2.0, epsilon = 1e-12);

        let b = Matrix::from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 10.0],
        ])
        .unwrap();
        assert_relative_eq!(factorize(&b, TOL).unwrap().determinant(), -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_detection() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        let lu = factorize(&a, TOL).unwrap();
        assert!(lu.is_singular());
        assert_eq!(determinant(&lu), 0.0);
    }

    #[test]
    fn test_zero_tolerance_still_flags_zero_pivot() {
        let a = Matrix::from_rows(&[vec![0.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert!(factorize(&a, 0.0).unwrap().is_singular());
    }

    #[test]
    fn test_pivot_tie_keeps_first_row() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![-1.0, 3.0]]).unwrap();
        let lu = factorize(&a, TOL).unwrap();
        assert_eq!(lu.permutation(), &[0, 1]);
        assert_eq!(lu.swap_count(), 0);
    }

    #[test]
    fn test_permutation_records_source_rows() {
        let a = Matrix::from_rows(&[vec![1.0, 0.0], vec![5.0, 1.0]]).unwrap();
        let lu = factorize(&a, TOL).unwrap();
        assert_eq!(lu.permutation(), &[1, 0]);
        assert_eq!(lu.swap_count(), 1);
        assert_relative_eq!(lu.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_input_not_mutated() {
        let a = Matrix::from_rows(&[vec![1.0, 0.0], vec![5.0, 1.0]]).unwrap();
        let before = a.clone();
        let _ = factorize(&a, TOL).unwrap();
        assert_eq!(a, before);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(factorize(&Matrix::zeros(2, 3), TOL).is_err());
        assert!(factorize(&Matrix::zeros(0, 0), TOL).is_err());
        let nan = Matrix::from_rows(&[vec![f64::NAN]]).unwrap();
        assert!(factorize(&nan, TOL).is_err());
        assert!(factorize(&Matrix::identity(2), -1.0).is_err());
    }
}
