//! Ordinary Least Squares regression on an explicit design matrix.
//!
//! Used by the unit-root test, which needs coefficient standard errors in
//! addition to the point estimates.

use crate::error::{ForecastError, Result};

/// Fitted OLS regression.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Coefficients, one per design column.
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    /// Number of observations.
    pub n: usize,
}

impl OLSResult {
    /// t-ratio of coefficient `index`.
    pub fn t_stat(&self, index: usize) -> f64 {
        match (self.coefficients.get(index), self.std_errors.get(index)) {
            (Some(&b), Some(&se)) if se > 0.0 => b / se,
            _ => f64::NAN,
        }
    }

    /// Gaussian AIC `n ln(RSS/n) + 2k`.
    pub fn aic(&self) -> f64 {
        let n = self.n as f64;
        if self.rss <= 0.0 || n == 0.0 {
            return f64::NEG_INFINITY;
        }
        n * (self.rss / n).ln() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit `y = X b` where `columns[j]` is the j-th design column.
///
/// Solves the normal equations by Cholesky decomposition. Fails when the
/// design is rank deficient or there are no residual degrees of freedom.
pub fn ols_fit(y: &[f64], columns: &[Vec<f64>]) -> Result<OLSResult> {
    let n = y.len();
    let k = columns.len();

    if k == 0 {
        return Err(ForecastError::InvalidParameter(
            "OLS requires at least one design column".into(),
        ));
    }
    if n <= k {
        return Err(ForecastError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }
    if let Some(col) = columns.iter().find(|c| c.len() != n) {
        return Err(ForecastError::InvalidParameter(format!(
            "design column has length {}, expected {}",
            col.len(),
            n
        )));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum();
        for j in 0..=i {
            let v: f64 = columns[i].iter().zip(&columns[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = v;
            xtx[j][i] = v;
        }
    }

    let chol = cholesky(&xtx).ok_or_else(|| {
        ForecastError::ComputationError("OLS design matrix is singular".into())
    })?;
    let coefficients = cholesky_solve(&chol, &xty);

    let rss: f64 = (0..n)
        .map(|t| {
            let fitted: f64 = (0..k).map(|j| coefficients[j] * columns[j][t]).sum();
            (y[t] - fitted).powi(2)
        })
        .sum();
    let sigma2 = rss / (n - k) as f64;

    // diag((X'X)^-1) via unit right-hand sides
    let std_errors = (0..k)
        .map(|j| {
            let mut e = vec![0.0; k];
            e[j] = 1.0;
            let col = cholesky_solve(&chol, &e);
            (sigma2 * col[j]).max(0.0).sqrt()
        })
        .collect();

    Ok(OLSResult {
        coefficients,
        std_errors,
        rss,
        n,
    })
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f64::max).max(1.0);
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 1e-12 * scale {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `L L' x = b`.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }
    x
}
