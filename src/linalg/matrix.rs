//! Dense row-major matrix and vector value types.
//!
//! Both types own their buffer and expose no in-place mutators. Every
//! operation allocates and returns a new value, so a [`Matrix`] handed to a
//! solver can never be changed behind the caller's back.

use std::fmt;

use crate::error::{NodalError, Result};

/// A dense `rows x cols` matrix of `f64` stored row-major.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self {
            rows: n,
            cols: n,
            data,
        }
    }

    /// Wrap a row-major buffer. The buffer length must equal `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(NodalError::invalid_parameter(format!(
                "matrix buffer has {} entries, expected {}x{} = {}",
                data.len(),
                rows,
                cols,
                rows * cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Wrap a buffer already known to hold `rows * cols` entries.
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Build a matrix from a slice of equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(NodalError::invalid_parameter(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the matrix is square.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Whether the matrix has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get element at (row, col). Panics when out of bounds, like slice indexing.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        self.data[row * self.cols + col]
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Borrow the row-major buffer.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Consume the matrix, returning its buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Extract one column as a vector.
    pub fn column(&self, col: usize) -> Vector {
        Vector::from_vec((0..self.rows).map(|i| self.data[i * self.cols + col]).collect())
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    fn check_same_shape(&self, other: &Matrix, op: &str) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(NodalError::invalid_parameter(format!(
                "cannot {} {}x{} and {}x{} matrices",
                op, self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    /// Element-wise sum.
    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "add")?;
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a + b).collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Element-wise difference.
    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "subtract")?;
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a - b).collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Multiply every entry by a scalar.
    pub fn scale(&self, factor: f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(NodalError::invalid_parameter(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut data = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    data[i * other.cols + j] += a * other.data[k * other.cols + j];
                }
            }
        }
        Ok(Matrix {
            rows: self.rows,
            cols: other.cols,
            data,
        })
    }

    /// Matrix-vector product `self * x`.
    pub fn mul_vector(&self, x: &Vector) -> Result<Vector> {
        if self.cols != x.len() {
            return Err(NodalError::invalid_parameter(format!(
                "cannot multiply {}x{} matrix by vector of length {}",
                self.rows,
                self.cols,
                x.len()
            )));
        }
        let data = (0..self.rows)
            .map(|i| self.row(i).iter().zip(x.data()).map(|(a, b)| a * b).sum())
            .collect();
        Ok(Vector::from_vec(data))
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.data.len()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Maximum absolute row sum. NaN if any entry is NaN.
    pub fn norm_inf(&self) -> f64 {
        (0..self.rows)
            .map(|i| self.row(i).iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, max_or_nan)
    }

    /// Frobenius norm, accumulated with scaling to avoid overflow.
    pub fn norm_frobenius(&self) -> f64 {
        scaled_norm_2(&self.data)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let row: Vec<String> = self.row(i).iter().map(|v| format!("{:>12.6e}", v)).collect();
            writeln!(f, "[{}]", row.join(" "))?;
        }
        Ok(())
    }
}

/// A dense vector of `f64`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    /// Create a zero-filled vector.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    /// Wrap an owned buffer.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get entry `i`.
    pub fn get(&self, i: usize) -> f64 {
        self.data[i]
    }

    /// Borrow the buffer.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Consume the vector, returning its buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    fn check_same_len(&self, other: &Vector, op: &str) -> Result<()> {
        if self.len() != other.len() {
            return Err(NodalError::invalid_parameter(format!(
                "cannot {} vectors of length {} and {}",
                op,
                self.len(),
                other.len()
            )));
        }
        Ok(())
    }

    /// Element-wise sum.
    pub fn add(&self, other: &Vector) -> Result<Vector> {
        self.check_same_len(other, "add")?;
        Ok(Vector::from_vec(
            self.data.iter().zip(&other.data).map(|(a, b)| a + b).collect(),
        ))
    }

    /// Element-wise difference.
    pub fn sub(&self, other: &Vector) -> Result<Vector> {
        self.check_same_len(other, "subtract")?;
        Ok(Vector::from_vec(
            self.data.iter().zip(&other.data).map(|(a, b)| a - b).collect(),
        ))
    }

    /// Multiply every entry by a scalar.
    pub fn scale(&self, factor: f64) -> Vector {
        Vector::from_vec(self.data.iter().map(|v| v * factor).collect())
    }

    /// Inner product.
    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_same_len(other, "take the dot product of")?;
        Ok(self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum())
    }

    /// Largest absolute entry (0 for an empty vector). NaN if any entry is NaN.
    pub fn norm_inf(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, v| max_or_nan(acc, v.abs()))
    }

    /// Euclidean norm, accumulated with scaling to avoid overflow.
    pub fn norm_2(&self) -> f64 {
        scaled_norm_2(&self.data)
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self::from_vec(data)
    }
}

/// Like `f64::max`, but a NaN operand wins.
fn max_or_nan(acc: f64, v: f64) -> f64 {
    if acc.is_nan() || v.is_nan() {
        f64::NAN
    } else {
        acc.max(v)
    }
}

/// Two-norm of a slice using the running scale/sum-of-squares recurrence,
/// so intermediate squares never overflow or flush to zero.
fn scaled_norm_2(values: &[f64]) -> f64 {
    let mut scale = 0.0f64;
    let mut ssq = 1.0f64;
    for &v in values {
        if v != 0.0 {
            let a = v.abs();
            if scale < a {
                ssq = 1.0 + ssq * (scale / a) * (scale / a);
                scale = a;
            } else {
                ssq += (a / scale) * (a / scale);
            }
        }
    }
    scale * ssq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0]).is_err());
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.get(1, 2), 6.0);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn test_multiply_and_transpose() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let ab = a.multiply(&b).unwrap();
        assert_eq!(ab.data(), &[2.0, 1.0, 4.0, 3.0]);
        assert_eq!(a.transpose().data(), &[1.0, 3.0, 2.0, 4.0]);
        assert!(a.multiply(&Matrix::zeros(3, 1)).is_err());
    }

    #[test]
    fn test_operations_do_not_alias() {
        let a = Matrix::identity(2);
        let b = a.scale(3.0);
        assert_eq!(a.get(0, 0), 1.0);
        assert_eq!(b.get(0, 0), 3.0);
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.get(1, 1), 4.0);
        assert_eq!(sum.sub(&b).unwrap(), a);
    }

    #[test]
    fn test_mul_vector() {
        let a = Matrix::from_rows(&[vec![2.0, 1.0], vec![4.0, 3.0]]).unwrap();
        let y = a.mul_vector(&Vector::from_vec(vec![1.0, -1.0])).unwrap();
        assert_eq!(y.data(), &[1.0, 1.0]);
        assert!(a.mul_vector(&Vector::zeros(3)).is_err());
    }

    #[test]
    fn test_norms() {
        let v = Vector::from_vec(vec![3.0, -4.0]);
        assert_relative_eq!(v.norm_2(), 5.0);
        assert_eq!(v.norm_inf(), 4.0);
        assert_eq!(Vector::zeros(0).norm_inf(), 0.0);

        // Squares of these would overflow a naive accumulation.
        let big = Vector::from_vec(vec![3e200, 4e200]);
        assert_relative_eq!(big.norm_2(), 5e200, max_relative = 1e-12);

        let m = Matrix::from_rows(&[vec![1.0, -2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.norm_inf(), 7.0);
        assert_relative_eq!(m.norm_frobenius(), 30.0f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn test_norm_inf_propagates_nan() {
        assert!(Vector::from_vec(vec![f64::NAN, 1.0]).norm_inf().is_nan());
        assert!(Vector::from_vec(vec![1.0, f64::NAN]).norm_inf().is_nan());
        assert!(Vector::from_vec(vec![f64::NAN]).norm_inf().is_nan());
        assert_eq!(Vector::from_vec(vec![f64::INFINITY, 1.0]).norm_inf(), f64::INFINITY);

        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![f64::NAN, 0.0]]).unwrap();
        assert!(m.norm_inf().is_nan());
        let m = Matrix::from_rows(&[vec![f64::NAN, 0.0], vec![5.0, 5.0]]).unwrap();
        assert!(m.norm_inf().is_nan());
    }

    #[test]
    fn test_vector_arithmetic() {
        let a = Vector::from_vec(vec![1.0, 2.0]);
        let b = Vector::from_vec(vec![0.5, 0.5]);
        assert_eq!(a.add(&b).unwrap().data(), &[1.5, 2.5]);
        assert_eq!(a.sub(&b).unwrap().data(), &[0.5, 1.5]);
        assert_eq!(a.dot(&b).unwrap(), 1.5);
        assert!(a.dot(&Vector::zeros(3)).is_err());
    }
}
