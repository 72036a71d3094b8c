//! Seasonal ARIMA model fitted by conditional maximum likelihood.
//!
//! The model for a series `y` with period `s` is
//!
//! ```text
//! phi(B) Phi(B^s) (w_t - mu) = theta(B) Theta(B^s) e_t
//! w_t = (1 - B)^d (1 - B^s)^D y_t
//! ```
//!
//! where `mu` is only estimated when `d + D <= 1` (a mean for undifferenced
//! data, a drift otherwise). The likelihood conditions on the first
//! `p + s*P` differenced values: their innovations are set to zero and left
//! out, and the later innovations are computed recursively. The Gaussian
//! likelihood of those innovations (with the variance concentrated out) is
//! maximised with Nelder-Mead over an unconstrained parameterisation that
//! keeps every iterate stationary and invertible.

use crate::core::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, seasonal_difference};
use crate::models::arima::polynomial::{
    ar_form, ar_operator, differencing_operator, is_invertible, is_stationary, ma_operator,
    multiply, pacf_to_ar, psi_weights,
};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, std_dev};
use std::fmt;

/// Partial autocorrelations produced by the parameter transform stay inside this bound.
const PACF_BOUND: f64 = 0.999;

/// Seasonal ARIMA order `(p, d, q)(P, D, Q)[s]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelOrder {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub cap_p: usize,
    /// Seasonal differencing order.
    pub cap_d: usize,
    /// Seasonal MA order.
    pub cap_q: usize,
    /// Seasonal period.
    pub s: usize,
}

impl ModelOrder {
    pub fn new(
        (p, d, q): (usize, usize, usize),
        (cap_p, cap_d, cap_q): (usize, usize, usize),
        s: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// Non-seasonal ARIMA(p, d, q).
    pub fn non_seasonal(p: usize, d: usize, q: usize) -> Self {
        Self::new((p, d, q), (0, 0, 0), 0)
    }

    /// Check if this is a seasonal model.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// Number of ARMA coefficients (p + q + P + Q).
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q
    }

    /// Total differencing applied (d + D).
    pub fn total_differencing(&self) -> usize {
        self.d + self.cap_d
    }

    /// `(p, d, q)`.
    pub fn non_seasonal_order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// `(P, D, Q, s)`.
    pub fn seasonal_order(&self) -> (usize, usize, usize, usize) {
        (self.cap_p, self.cap_d, self.cap_q, self.s)
    }

    /// Observations lost to differencing.
    pub fn differencing_loss(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Length of the full AR lag polynomial, `p + s*P`.
    pub fn ar_span(&self) -> usize {
        self.p + self.cap_p * self.s.max(1)
    }

    /// Smallest series length this order may be fitted to.
    pub fn min_length(&self) -> usize {
        let s = self.s.max(1);
        self.differencing_loss()
            + self
                .p
                .max(self.q)
                .max(self.cap_p * s)
                .max(self.cap_q * s)
            + 5
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)?;
        if self.s > 1 {
            write!(
                f,
                "({},{},{})[{}]",
                self.cap_p, self.cap_d, self.cap_q, self.s
            )?;
        }
        Ok(())
    }
}

/// Options controlling a single fit.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Estimate a mean/drift when `d + D <= 1`.
    pub allow_constant: bool,
    /// Leading innovations excluded from the likelihood, so candidates with
    /// different differencing orders are scored on the same observations.
    /// Never less than the order's AR span.
    pub skip: usize,
    /// Optimiser iteration limit.
    pub max_iterations: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            allow_constant: true,
            skip: 0,
            max_iterations: 5000,
        }
    }
}

/// A fitted seasonal ARIMA model. Immutable once fitted.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    order: ModelOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    constant: Option<f64>,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    aicc: f64,
    bic: f64,
    n_used: usize,
    num_params: usize,
    /// Original (undifferenced) training values.
    history: Vec<f64>,
    /// Model-differenced training values `w`.
    differenced: Vec<f64>,
    /// Innovations for every element of `differenced`.
    innovations: Vec<f64>,
    /// Index into `history` of the first innovation used in the likelihood.
    residual_start: usize,
    /// Index into `innovations` of the first likelihood innovation.
    skip: usize,
}

/// Coefficients unpacked from an optimiser vector.
struct Coefficients {
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    constant: Option<f64>,
}

impl Coefficients {
    fn ar_operator(&self, s: usize) -> Vec<f64> {
        multiply(&ar_operator(&self.ar, 1), &ar_operator(&self.seasonal_ar, s))
    }

    fn ma_operator(&self, s: usize) -> Vec<f64> {
        multiply(&ma_operator(&self.ma, 1), &ma_operator(&self.seasonal_ma, s))
    }
}

/// Maps an unconstrained optimiser vector to admissible coefficients.
struct Parameterization {
    order: ModelOrder,
    with_constant: bool,
    center: f64,
    scale: f64,
}

impl Parameterization {
    fn len(&self) -> usize {
        self.order.num_coefficients() + usize::from(self.with_constant)
    }

    fn unpack(&self, u: &[f64]) -> Coefficients {
        let o = &self.order;
        let mut offset = 0;
        let mut take = |count: usize| {
            let block = &u[offset..offset + count];
            offset += count;
            block
                .iter()
                .map(|v| PACF_BOUND * v.tanh())
                .collect::<Vec<f64>>()
        };
        let ar = pacf_to_ar(&take(o.p));
        let ma = negate(pacf_to_ar(&take(o.q)));
        let seasonal_ar = pacf_to_ar(&take(o.cap_p));
        let seasonal_ma = negate(pacf_to_ar(&take(o.cap_q)));
        let constant = self
            .with_constant
            .then(|| self.center + self.scale * u[self.len() - 1]);

        Coefficients {
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
            constant,
        }
    }
}

fn negate(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|v| -v).collect()
}

/// Innovations of the recursion `x_t = sum a_i x_{t-i} + sum b_j e_{t-j} + e_t`
/// with `x = w - mu`, conditional on the first `ar.len()` values of `x`.
///
/// Innovations before that point are zero.
fn innovations(w: &[f64], mu: f64, ar: &[f64], ma_op: &[f64]) -> Vec<f64> {
    let n = w.len();
    let mut e = vec![0.0; n];
    for t in ar.len().min(n)..n {
        let mut pred = 0.0;
        for (i, a) in ar.iter().enumerate() {
            let lag = i + 1;
            if lag > t {
                break;
            }
            pred += a * (w[t - lag] - mu);
        }
        for (j, b) in ma_op.iter().enumerate().skip(1) {
            if j > t {
                break;
            }
            pred += b * e[t - j];
        }
        e[t] = (w[t] - mu) - pred;
    }
    e
}

impl ModelSpec {
    /// Fit `order` to a monthly series.
    pub fn fit(series: &MonthlySeries, order: ModelOrder, options: &FitOptions) -> Result<Self> {
        fit_sarima(series.values(), order, options)
    }

    pub fn order(&self) -> ModelOrder {
        self.order
    }

    /// Non-seasonal AR coefficients phi.
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// Non-seasonal MA coefficients theta.
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Seasonal AR coefficients Phi.
    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    /// Seasonal MA coefficients Theta.
    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Mean (d + D = 0) or drift (d + D = 1), if estimated.
    pub fn constant(&self) -> Option<f64> {
        self.constant
    }

    /// Innovation variance.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bias-corrected AIC, the selection criterion.
    pub fn aicc(&self) -> f64 {
        self.aicc
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Number of innovations in the likelihood.
    pub fn n_used(&self) -> usize {
        self.n_used
    }

    /// Parameter count k (coefficients, constant and variance).
    pub fn num_params(&self) -> usize {
        self.num_params
    }

    /// Residuals entering the likelihood.
    ///
    /// These are innovations: observed minus one-step fitted, so
    /// `training_values()[residual_start() + i] == fitted_values()[i] + residuals()[i]`.
    pub fn residuals(&self) -> &[f64] {
        &self.innovations[self.skip..]
    }

    /// Position in the training series of the first residual.
    pub fn residual_start(&self) -> usize {
        self.residual_start
    }

    /// In-sample one-step predictions aligned with [`residuals`](Self::residuals).
    pub fn fitted_values(&self) -> Vec<f64> {
        self.history[self.residual_start..]
            .iter()
            .zip(self.residuals())
            .map(|(y, e)| y - e)
            .collect()
    }

    /// Training values the model was fitted to.
    pub fn training_values(&self) -> &[f64] {
        &self.history
    }

    fn full_ar_operator(&self) -> Vec<f64> {
        multiply(
            &ar_operator(&self.ar, 1),
            &ar_operator(&self.seasonal_ar, self.order.s.max(1)),
        )
    }

    fn full_ma_operator(&self) -> Vec<f64> {
        multiply(
            &ma_operator(&self.ma, 1),
            &ma_operator(&self.seasonal_ma, self.order.s.max(1)),
        )
    }

    /// Conditional-expectation point forecasts for steps `1..=horizon`.
    pub fn forecast_mean(&self, horizon: usize) -> Vec<f64> {
        let mu = self.constant.unwrap_or(0.0);
        let a = ar_form(&self.full_ar_operator());
        let ma_op = self.full_ma_operator();

        let n = self.differenced.len();
        let mut x: Vec<f64> = self.differenced.iter().map(|w| w - mu).collect();
        let mut e = self.innovations.clone();
        for _ in 0..horizon {
            let t = x.len();
            let mut pred = 0.0;
            for (i, coef) in a.iter().enumerate() {
                let lag = i + 1;
                if lag <= t {
                    pred += coef * x[t - lag];
                }
            }
            for (j, coef) in ma_op.iter().enumerate().skip(1) {
                if j <= t {
                    pred += coef * e[t - j];
                }
            }
            x.push(pred);
            e.push(0.0);
        }
        let w_forecast: Vec<f64> = x[n..].iter().map(|v| v + mu).collect();

        // y_t = w_t - sum_{i>=1} delta_i y_{t-i}
        let delta = differencing_operator(self.order.d, self.order.cap_d, self.order.s.max(1));
        if delta.len() == 1 {
            return w_forecast;
        }
        let mut y = self.history.clone();
        for w in w_forecast {
            let t = y.len();
            let lagged: f64 = delta
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * y[t - i])
                .sum();
            y.push(w - lagged);
        }
        y.split_off(self.history.len())
    }

    /// Forecast standard errors for steps `1..=horizon`.
    ///
    /// `sigma * sqrt(sum_{j<h} psi_j^2)` with psi weights of the full model
    /// including its differencing, so the sequence is non-decreasing.
    pub fn forecast_std_errors(&self, horizon: usize) -> Vec<f64> {
        let delta = differencing_operator(self.order.d, self.order.cap_d, self.order.s.max(1));
        let ar = multiply(&self.full_ar_operator(), &delta);
        let psi = psi_weights(&ar, &self.full_ma_operator(), horizon);
        let sigma = self.sigma2.sqrt();

        psi.iter()
            .scan(0.0, |acc, p| {
                *acc += p * p;
                Some(sigma * acc.sqrt())
            })
            .collect()
    }
}

/// Fit a seasonal ARIMA model to raw values.
pub(crate) fn fit_sarima(values: &[f64], order: ModelOrder, options: &FitOptions) -> Result<ModelSpec> {
    if order.cap_p + order.cap_d + order.cap_q > 0 && order.s < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "seasonal terms require a period of at least 2, got {}",
            order.s
        )));
    }
    let min_len = order.min_length();
    if values.len() < min_len {
        return Err(ForecastError::InsufficientData {
            needed: min_len,
            got: values.len(),
        });
    }

    let w = seasonal_difference(&difference(values, order.d), order.cap_d, order.s);
    let with_constant = options.allow_constant && order.total_differencing() <= 1;
    let num_params = order.num_coefficients() + usize::from(with_constant) + 1;

    let skip = options.skip.max(order.ar_span());
    let n_used = w.len().saturating_sub(skip);
    let s = order.s.max(1);
    let needed = (num_params + 2).max(order.ar_span() + order.q + s * order.cap_q + 3);
    if n_used < needed {
        return Err(ForecastError::InsufficientData {
            needed: skip + needed,
            got: w.len(),
        });
    }

    let center = mean(&w);
    let scale = std_dev(&w);
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ForecastError::ComputationError(format!(
            "{}: differenced series has no variation",
            order
        )));
    }
    let param = Parameterization {
        order,
        with_constant,
        center,
        scale,
    };

    let objective = |u: &[f64]| {
        let coef = param.unpack(u);
        let e = innovations(
            &w,
            coef.constant.unwrap_or(0.0),
            &ar_form(&coef.ar_operator(s)),
            &coef.ma_operator(s),
        );
        let css: f64 = e[skip..].iter().map(|v| v * v).sum();
        if css > 0.0 {
            0.5 * n_used as f64 * (css / n_used as f64).ln()
        } else {
            f64::NAN
        }
    };

    let result = nelder_mead(
        objective,
        &vec![0.0; param.len()],
        NelderMeadConfig {
            max_iter: options.max_iterations,
            ..Default::default()
        },
    );

    if !result.converged || !result.optimal_value.is_finite() {
        return Err(ForecastError::ComputationError(format!(
            "{} did not converge after {} iterations",
            order, result.iterations
        )));
    }

    let coef = param.unpack(&result.optimal_point);
    if !is_stationary(&ar_form(&coef.ar_operator(s))) {
        return Err(ForecastError::ComputationError(format!(
            "{} has a non-stationary AR polynomial",
            order
        )));
    }
    if !is_invertible(&coef.ma_operator(s)[1..]) {
        return Err(ForecastError::ComputationError(format!(
            "{} has a non-invertible MA polynomial",
            order
        )));
    }

    let mu = coef.constant.unwrap_or(0.0);
    let e = innovations(
        &w,
        mu,
        &ar_form(&coef.ar_operator(s)),
        &coef.ma_operator(s),
    );
    let css: f64 = e[skip..].iter().map(|v| v * v).sum();
    let n = n_used as f64;
    let sigma2 = css / n;
    if !(sigma2.is_finite() && sigma2 > 0.0) {
        return Err(ForecastError::ComputationError(format!(
            "{} produced a degenerate innovation variance",
            order
        )));
    }

    let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
    let k = num_params as f64;
    let aic = -2.0 * log_likelihood + 2.0 * k;
    let aicc = aic + 2.0 * k * (k + 1.0) / (n - k - 1.0);
    let bic = -2.0 * log_likelihood + k * n.ln();

    Ok(ModelSpec {
        order,
        ar: coef.ar,
        ma: coef.ma,
        seasonal_ar: coef.seasonal_ar,
        seasonal_ma: coef.seasonal_ma,
        constant: coef.constant,
        sigma2,
        log_likelihood,
        aic,
        aicc,
        bic,
        n_used,
        num_params,
        history: values.to_vec(),
        differenced: w,
        innovations: e,
        residual_start: order.differencing_loss() + skip,
        skip,
    })
}
