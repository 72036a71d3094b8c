//! Stationarity testing with the Augmented Dickey-Fuller test.
//!
//! The null hypothesis is a unit root; rejecting it means the series is
//! treated as stationary.

use crate::core::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::difference;
use crate::utils::ols::{ols_fit, OLSResult};
use crate::utils::stats::normal_cdf;
use tracing::{debug, warn};

/// Degrees of freedom the ADF regression must keep.
const MIN_RESIDUAL_DF: usize = 10;

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

/// Result of an ADF test.
#[derive(Debug, Clone)]
pub struct AdfResult {
    /// t-ratio of the lagged level coefficient
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged differences in the regression
    pub lags: usize,
    /// Observations used in the final regression
    pub nobs: usize,
    pub critical_values: CriticalValues,
}

impl AdfResult {
    /// Whether the unit root is rejected at `significance`.
    pub fn is_stationary(&self, significance: f64) -> bool {
        self.p_value <= significance
    }
}

/// Augmented Dickey-Fuller test with a constant.
///
/// Regression: `Δy_t = α + β y_{t-1} + Σ_{i=1..k} γ_i Δy_{t-i} + ε_t`.
/// The lag count `k` minimises AIC over `0..=max_lags`, all orders being
/// compared on the same sample. The default `max_lags` is
/// `⌊12 (n/100)^{1/4}⌋`.
///
/// # Errors
/// `InsufficientData` for series too short to keep ten residual degrees of
/// freedom, `ComputationError` for constant series, singular regressions or
/// a non-finite statistic.
pub fn adf_test(values: &[f64], max_lags: Option<usize>) -> Result<AdfResult> {
    let n = values.len();
    let needed = MIN_RESIDUAL_DF + 3;
    if n < needed {
        return Err(ForecastError::InsufficientData { needed, got: n });
    }
    if values.iter().all(|v| *v == values[0]) {
        return Err(ForecastError::ComputationError(
            "constant series has no unit-root test".into(),
        ));
    }

    // (n - 1 - k) observations and k + 2 regressors must leave the minimum df.
    let cap = (n - needed) / 2;
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize;
    let max_lags = max_lags.unwrap_or(schwert).min(cap);

    let dy = difference(values, 1);

    let mut best: Option<(usize, f64)> = None;
    for k in 0..=max_lags {
        let fit = adf_regression(values, &dy, k, max_lags)?;
        let aic = fit.aic();
        debug!(lags = k, aic, "ADF lag candidate");
        if best.map_or(true, |(_, b)| aic < b) {
            best = Some((k, aic));
        }
    }
    let lags = best.map_or(0, |(k, _)| k);

    let fit = adf_regression(values, &dy, lags, lags)?;
    let statistic = fit.t_stat(1);
    if !statistic.is_finite() {
        return Err(ForecastError::ComputationError(
            "ADF statistic is not finite".into(),
        ));
    }

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        lags,
        nobs: fit.n,
        critical_values: mackinnon_critical_values(fit.n),
    })
}

/// ADF regression with `k` lagged differences, starting after `start_lag` lags.
fn adf_regression(values: &[f64], dy: &[f64], k: usize, start_lag: usize) -> Result<OLSResult> {
    // dy[j] = y[j+1] - y[j]; regress dy[j] on 1, y[j], dy[j-1..=j-k]
    let rows = start_lag..dy.len();
    let y: Vec<f64> = rows.clone().map(|j| dy[j]).collect();

    let mut columns = Vec::with_capacity(k + 2);
    columns.push(vec![1.0; y.len()]);
    columns.push(rows.clone().map(|j| values[j]).collect());
    for i in 1..=k {
        columns.push(rows.clone().map(|j| dy[j - i]).collect());
    }
    ols_fit(&y, &columns)
}

/// MacKinnon (1994) approximate p-value for the constant-only ADF statistic.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefs: &[f64] = if statistic <= TAU_STAR {
        &SMALL_P
    } else {
        &LARGE_P
    };
    let poly = coefs
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);
    normal_cdf(poly)
}

/// MacKinnon (2010) finite-sample critical values, constant only.
pub fn mackinnon_critical_values(nobs: usize) -> CriticalValues {
    const TAU_C_1: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
    const TAU_C_5: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
    const TAU_C_10: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

    let inv = 1.0 / nobs.max(1) as f64;
    let surface = |b: &[f64; 4]| b[0] + b[1] * inv + b[2] * inv * inv + b[3] * inv * inv * inv;

    CriticalValues {
        cv_1pct: surface(&TAU_C_1),
        cv_5pct: surface(&TAU_C_5),
        cv_10pct: surface(&TAU_C_10),
    }
}

/// What the stationarity test concluded.
#[derive(Debug, Clone, PartialEq)]
pub enum StationarityOutcome {
    /// The test ran.
    Decided { statistic: f64, lags: usize },
    /// The test could not be computed; the series is treated as non-stationary.
    Inconclusive { reason: String },
}

/// Stationarity decision for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct StationarityVerdict {
    pub is_stationary: bool,
    pub p_value: f64,
    pub outcome: StationarityOutcome,
}

impl StationarityVerdict {
    pub fn is_inconclusive(&self) -> bool {
        matches!(self.outcome, StationarityOutcome::Inconclusive { .. })
    }
}

/// Configuration for [`StationarityTester`].
#[derive(Debug, Clone)]
pub struct StationarityConfig {
    /// Unit root is rejected when the p-value is at most this.
    pub significance: f64,
    /// Override of the default maximum ADF lag.
    pub max_lags: Option<usize>,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self {
            significance: 0.05,
            max_lags: None,
        }
    }
}

impl StationarityConfig {
    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn with_max_lags(mut self, max_lags: usize) -> Self {
        self.max_lags = Some(max_lags);
        self
    }
}

/// Decides whether a series needs differencing.
#[derive(Debug, Clone, Default)]
pub struct StationarityTester {
    config: StationarityConfig,
}

impl StationarityTester {
    pub fn new(config: StationarityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StationarityConfig {
        &self.config
    }

    /// Run the ADF test; never fails.
    pub fn test(&self, series: &MonthlySeries) -> StationarityVerdict {
        match adf_test(series.values(), self.config.max_lags) {
            Ok(result) => {
                debug!(
                    statistic = result.statistic,
                    p_value = result.p_value,
                    lags = result.lags,
                    "ADF test"
                );
                StationarityVerdict {
                    is_stationary: result.is_stationary(self.config.significance),
                    p_value: result.p_value,
                    outcome: StationarityOutcome::Decided {
                        statistic: result.statistic,
                        lags: result.lags,
                    },
                }
            }
            Err(e) => {
                warn!(error = %e, "stationarity test inconclusive, assuming non-stationary");
                StationarityVerdict {
                    is_stationary: false,
                    p_value: 1.0,
                    outcome: StationarityOutcome::Inconclusive {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}
