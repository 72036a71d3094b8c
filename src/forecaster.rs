//! Multi-step forecasting with nested Gaussian prediction intervals.

use crate::core::{ForecastResult, LEVEL_80, LEVEL_95};
use crate::error::{ForecastError, Result};
use crate::models::arima::{DifferenceSeed, Differencer, ModelSpec};
use crate::utils::stats::z_for_level;

/// Accepted horizon range, inclusive.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub min_horizon: usize,
    pub max_horizon: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_horizon: 1,
            max_horizon: 60,
        }
    }
}

impl ForecastConfig {
    pub fn with_max_horizon(mut self, max_horizon: usize) -> Self {
        self.max_horizon = max_horizon;
        self
    }
}

/// Projects a fitted [`ModelSpec`] forward.
#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    config: ForecastConfig,
}

impl Forecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Check `horizon` against the configured range.
    pub fn validate_horizon(&self, horizon: i64) -> Result<usize> {
        let invalid = ForecastError::InvalidHorizon {
            horizon,
            min: self.config.min_horizon,
            max: self.config.max_horizon,
        };
        let h = usize::try_from(horizon).map_err(|_| invalid.clone())?;
        if h == 0 || h < self.config.min_horizon || h > self.config.max_horizon {
            return Err(invalid);
        }
        Ok(h)
    }

    /// Forecast `horizon` steps with 80% and 95% bands.
    ///
    /// With a `seed`, the forecast is on a pipeline-differenced scale and
    /// every sequence is cumulated back to original units.
    ///
    /// # Example
    /// ```
    /// use cpi_forecast::core::{MonthlySeries, YearMonth};
    /// use cpi_forecast::forecaster::Forecaster;
    /// use cpi_forecast::models::arima::{FitOptions, ModelOrder, ModelSpec};
    ///
    /// let values: Vec<f64> = (0..48).map(|i| 100.0 + (i % 5) as f64).collect();
    /// let series = MonthlySeries::new(YearMonth::new(2015, 1).unwrap(), values).unwrap();
    /// let model = ModelSpec::fit(&series, ModelOrder::non_seasonal(1, 0, 0), &FitOptions::default()).unwrap();
    ///
    /// let forecast = Forecaster::default().forecast(&model, 6, None).unwrap();
    /// assert_eq!(forecast.horizon(), 6);
    /// ```
    pub fn forecast(
        &self,
        model: &ModelSpec,
        horizon: i64,
        seed: Option<&DifferenceSeed>,
    ) -> Result<ForecastResult> {
        let h = self.validate_horizon(horizon)?;

        let point = model.forecast_mean(h);
        let se = model.forecast_std_errors(h);
        if point.iter().chain(&se).any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(format!(
                "{} produced a non-finite forecast",
                model.order()
            )));
        }

        let band = |level: f64| {
            let z = z_for_level(level);
            let lower: Vec<f64> = point.iter().zip(&se).map(|(p, s)| p - z * s).collect();
            let upper: Vec<f64> = point.iter().zip(&se).map(|(p, s)| p + z * s).collect();
            (lower, upper)
        };
        let forecast = ForecastResult::new(point.clone(), band(LEVEL_80), band(LEVEL_95))?;

        Ok(match seed {
            Some(seed) => forecast.map_sequences(|values| Differencer::invert(values, seed)),
            None => forecast,
        })
    }
}
