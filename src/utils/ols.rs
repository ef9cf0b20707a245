//! Ordinary Least Squares (OLS) regression on an explicit design matrix.
//!
//! Columns are processed in order with a pivoting QR decomposition (modified
//! Gram-Schmidt). A column that is numerically a linear combination of the
//! columns before it is marked as aliased and gets no coefficient, so
//! over-specified seasonal designs still produce a unique fit.

use crate::error::{ForecastError, Result};

/// Relative residual norm under which a column counts as aliased.
const ALIAS_TOLERANCE: f64 = 1e-7;

/// Fitted linear model.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// One entry per design column; `None` marks an aliased column.
    pub coefficients: Vec<Option<f64>>,
    /// In-sample fitted values.
    pub fitted: Vec<f64>,
}

impl OLSResult {
    /// Number of estimated (non-aliased) coefficients.
    pub fn rank(&self) -> usize {
        self.coefficients.iter().filter(|c| c.is_some()).count()
    }

    /// Evaluate the model on one design row.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }
        Ok(self
            .coefficients
            .iter()
            .zip(row.iter())
            .filter_map(|(c, x)| c.map(|c| c * x))
            .sum())
    }
}

/// Fit `y = X beta` where `columns` holds the columns of `X`.
pub fn ols_fit(columns: &[Vec<f64>], y: &[f64]) -> Result<OLSResult> {
    let n = y.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if columns.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "design matrix has no columns".into(),
        ));
    }
    for col in columns {
        if col.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: col.len(),
            });
        }
    }

    let k = columns.len();
    // Orthonormal basis of kept columns and the matching upper-triangular R
    let mut q: Vec<Vec<f64>> = Vec::with_capacity(k);
    let mut r: Vec<Vec<f64>> = Vec::with_capacity(k);
    let mut kept: Vec<usize> = Vec::with_capacity(k);

    for (j, col) in columns.iter().enumerate() {
        let original_norm = norm(col);
        let mut v = col.clone();
        let mut r_col = Vec::with_capacity(q.len() + 1);
        for basis in &q {
            let proj = dot(basis, &v);
            for (vi, bi) in v.iter_mut().zip(basis.iter()) {
                *vi -= proj * bi;
            }
            r_col.push(proj);
        }

        let residual_norm = norm(&v);
        if original_norm == 0.0 || residual_norm <= ALIAS_TOLERANCE * original_norm {
            continue;
        }

        for vi in v.iter_mut() {
            *vi /= residual_norm;
        }
        r_col.push(residual_norm);
        q.push(v);
        r.push(r_col);
        kept.push(j);
    }

    if kept.is_empty() {
        return Err(ForecastError::ComputationError(
            "design matrix has rank zero".into(),
        ));
    }

    // Back substitution on R beta = Q'y, where r[j][i] is R(i, j)
    let qty: Vec<f64> = q.iter().map(|basis| dot(basis, y)).collect();
    let m = kept.len();
    let mut beta = vec![0.0; m];
    for i in (0..m).rev() {
        let mut acc = qty[i];
        for j in (i + 1)..m {
            acc -= r[j][i] * beta[j];
        }
        beta[i] = acc / r[i][i];
    }

    let mut coefficients = vec![None; k];
    for (pos, &col) in kept.iter().enumerate() {
        coefficients[col] = Some(beta[pos]);
    }

    let fitted = (0..n)
        .map(|t| {
            kept.iter()
                .zip(beta.iter())
                .map(|(&col, b)| b * columns[col][t])
                .sum()
        })
        .collect();

    Ok(OLSResult {
        coefficients,
        fitted,
    })
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}
