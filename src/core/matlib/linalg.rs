use serde::Serialize;
use stats::{Result, StatError};

/// Dense row-major matrix, sized for covariance work (a handful of predictors).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(StatError::Shape(format!(
                "{} values cannot fill a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// `self * a + other * b`, elementwise; shapes must agree.
    pub fn scaled_sum(&self, a: f64, other: &Matrix, b: f64) -> Result<Matrix> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(StatError::Shape(format!(
                "cannot add {}x{} and {}x{} matrices",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(x, y)| a * x + b * y)
            .collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Quadratic form `l * self * l^T` for a row vector `l`.
    pub fn quad_form(&self, l: &[f64]) -> Result<f64> {
        if !self.is_square() || l.len() != self.rows {
            return Err(StatError::Shape(format!(
                "contrast of length {} does not match a {}x{} matrix",
                l.len(),
                self.rows,
                self.cols
            )));
        }
        let mut total = 0.0;
        for (i, li) in l.iter().enumerate() {
            for (j, lj) in l.iter().enumerate() {
                total += li * self.get(i, j) * lj;
            }
        }
        Ok(total)
    }
}

/// Simple Gaussian elimination solver with partial pivoting.
///
/// `a` is row-major `n x n`.
pub fn gauss_elimination(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    if a.len() != n * n || b.len() != n {
        return Err(StatError::Shape(format!(
            "system of size {} needs {} coefficients and {} right-hand values",
            n,
            n * n,
            n
        )));
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();

    // Forward elimination
    for col in 0..n {
        let mut max_row = col;
        for row in (col + 1)..n {
            if a[row * n + col].abs() > a[max_row * n + col].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..n {
                a.swap(col * n + j, max_row * n + j);
            }
            b.swap(col, max_row);
        }

        if a[col * n + col].abs() < 1e-15 {
            return Err(StatError::DegenerateInput("matrix is singular".to_string()));
        }

        for row in (col + 1)..n {
            let factor = a[row * n + col] / a[col * n + col];
            for j in col..n {
                a[row * n + j] -= factor * a[col * n + j];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        x[i] = b[i];
        for j in (i + 1)..n {
            x[i] -= a[i * n + j] * x[j];
        }
        x[i] /= a[i * n + i];
    }

    Ok(x)
}
