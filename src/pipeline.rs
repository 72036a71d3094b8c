//! End-to-end forecasting runs.
//!
//! A run is a pure function of the raw observations and a
//! [`PipelineConfig`]:
//!
//! ```text
//! normalize -> stationarity test -> (difference) -> select order
//!           -> diagnose residuals -> forecast -> table
//! ```
//!
//! Runs share no state, so many series can be processed in parallel with
//! [`run_batch`]. Memoisation is opt-in through a caller-owned
//! [`PipelineCache`].

use crate::core::{
    ForecastResult, MonthlySeries, NormalizerConfig, RawObservation, SeriesNormalizer, YearMonth,
};
use crate::error::{ForecastError, Result};
use crate::forecaster::{ForecastConfig, Forecaster};
use crate::models::arima::{Differencer, ModelOrder, ModelSelector, ModelSpec, SearchConfig};
use crate::provider::SeriesProvider;
use crate::report::ForecastTable;
use crate::validation::{
    DiagnosticsConfig, ResidualDiagnostics, ResidualReport, StationarityConfig,
    StationarityTester, StationarityVerdict,
};
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, info_span};

/// Where a non-stationary series gets its differencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifferencingPolicy {
    /// Difference the series once before the search; the search may add more.
    #[default]
    PreDifference,
    /// Leave the series as is and require `d >= 1` in the search.
    InModel,
}

/// Run-scoped configuration of every stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub normalizer: NormalizerConfig,
    pub stationarity: StationarityConfig,
    pub search: SearchConfig,
    pub diagnostics: DiagnosticsConfig,
    pub forecast: ForecastConfig,
    /// Forecast steps; validated against `forecast` before any work.
    pub horizon: i64,
    pub differencing: DifferencingPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            stationarity: StationarityConfig::default(),
            search: SearchConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            forecast: ForecastConfig::default(),
            horizon: 12,
            differencing: DifferencingPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_window_start(mut self, window_start: YearMonth) -> Self {
        self.normalizer.window_start = window_start;
        self
    }

    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_stationarity(mut self, stationarity: StationarityConfig) -> Self {
        self.stationarity = stationarity;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_forecast(mut self, forecast: ForecastConfig) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn with_differencing(mut self, policy: DifferencingPolicy) -> Self {
        self.differencing = policy;
        self
    }

    /// Largest `p + q + P + Q` the search may try.
    pub fn largest_candidate_order(&self) -> usize {
        let search = &self.search;
        let seasonal = if search.seasonal_period >= 2 {
            search.max_cap_p + search.max_cap_q
        } else {
            0
        };
        let bound = search.max_p + search.max_q + seasonal;
        search.max_order.map_or(bound, |max| bound.min(max))
    }

    /// `min_observations` must exceed the largest candidate order.
    pub fn validate_history_bounds(&self) -> Result<()> {
        let largest = self.largest_candidate_order();
        if self.normalizer.min_observations <= largest {
            return Err(ForecastError::InvalidParameter(format!(
                "min_observations ({}) must exceed the largest candidate order ({})",
                self.normalizer.min_observations, largest
            )));
        }
        Ok(())
    }
}

/// Everything a run produced, as plain data.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub series_id: String,
    /// Normalized input series (before any pipeline differencing).
    pub series: MonthlySeries,
    pub verdict: StationarityVerdict,
    /// Differences applied before the search (0 or 1).
    pub pipeline_d: usize,
    pub model: ModelSpec,
    /// Converged candidates with their AICc, best first.
    pub candidates: Vec<(ModelOrder, f64)>,
    pub residual_report: ResidualReport,
    pub forecast: ForecastResult,
    pub table: ForecastTable,
}

impl PipelineResult {
    /// Regular differencing from the pipeline and the model combined.
    pub fn total_differencing(&self) -> usize {
        self.pipeline_d + self.model.order().d
    }

    /// Human-readable order, e.g. `ARIMA(1,0,1)(0,1,1)[12]`.
    pub fn order_label(&self) -> String {
        self.model.order().to_string()
    }
}

/// Run the full pipeline on raw observations.
pub fn run_forecast_pipeline(
    series_id: &str,
    raw: &[RawObservation],
    config: &PipelineConfig,
) -> Result<PipelineResult> {
    let _span = info_span!("pipeline", series_id).entered();

    let forecaster = Forecaster::new(config.forecast.clone());
    forecaster.validate_horizon(config.horizon)?;
    config.validate_history_bounds()?;

    let series = SeriesNormalizer::new(config.normalizer.clone()).normalize(raw)?;
    info!(
        start = %series.start(),
        end = %series.end(),
        len = series.len(),
        "series normalized"
    );

    let verdict = StationarityTester::new(config.stationarity.clone()).test(&series);
    info!(
        stationary = verdict.is_stationary,
        p_value = verdict.p_value,
        "stationarity tested"
    );

    let mut search = config.search.clone();
    let pipeline_d = match config.differencing {
        DifferencingPolicy::PreDifference => usize::from(!verdict.is_stationary),
        DifferencingPolicy::InModel => {
            if !verdict.is_stationary {
                search.min_d = search.min_d.max(1);
                search.max_d = search.max_d.max(search.min_d);
            }
            0
        }
    };
    let differenced = Differencer::apply(&series, pipeline_d)?;
    debug!(pipeline_d, "differencing applied");

    let outcome = ModelSelector::new(search).select(differenced.series())?;
    let model = outcome.model;

    let residual_report = ResidualDiagnostics::new(config.diagnostics.clone()).diagnose(&model);

    let seed = (pipeline_d > 0).then(|| differenced.seed());
    let forecast = forecaster.forecast(&model, config.horizon, seed)?;
    let table = ForecastTable::assemble(series.end(), &forecast);
    info!(order = %model.order(), horizon = forecast.horizon(), "forecast complete");

    Ok(PipelineResult {
        series_id: series_id.to_string(),
        series,
        verdict,
        pipeline_d,
        model,
        candidates: outcome.candidates,
        residual_report,
        forecast,
        table,
    })
}

/// Fetch a series from `provider` and run the pipeline on it.
pub fn run_for_provider<P>(
    provider: &P,
    series_id: &str,
    config: &PipelineConfig,
) -> Result<PipelineResult>
where
    P: SeriesProvider + ?Sized,
{
    Forecaster::new(config.forecast.clone()).validate_horizon(config.horizon)?;
    config.validate_history_bounds()?;
    let raw = provider.fetch(series_id)?;
    run_forecast_pipeline(series_id, &raw, config)
}

/// Run many series independently and in parallel.
///
/// A failure in one series is recorded under its id and does not affect
/// the others.
pub fn run_batch<P, S>(
    provider: &P,
    series_ids: &[S],
    config: &PipelineConfig,
) -> BTreeMap<String, Result<PipelineResult>>
where
    P: SeriesProvider + ?Sized,
    S: AsRef<str> + Sync,
{
    series_ids
        .par_iter()
        .map(|id| {
            let id = id.as_ref();
            (id.to_string(), run_for_provider(provider, id, config))
        })
        .collect()
}

/// Cache key: series plus the run parameters that change its result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub series_id: String,
    pub horizon: i64,
    pub window_start: YearMonth,
}

impl CacheKey {
    pub fn new(series_id: &str, config: &PipelineConfig) -> Self {
        Self {
            series_id: series_id.to_string(),
            horizon: config.horizon,
            window_start: config.normalizer.window_start,
        }
    }
}

/// Caller-owned memo of successful runs.
///
/// Keyed by series id, horizon and window start only; changing other
/// settings requires [`invalidate`](Self::invalidate) or [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct PipelineCache {
    entries: HashMap<CacheKey, PipelineResult>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, series_id: &str, config: &PipelineConfig) -> Option<&PipelineResult> {
        self.entries.get(&CacheKey::new(series_id, config))
    }

    /// Return the cached result or run the pipeline and store it.
    ///
    /// Failures are returned and not cached.
    pub fn get_or_run<P>(
        &mut self,
        provider: &P,
        series_id: &str,
        config: &PipelineConfig,
    ) -> Result<&PipelineResult>
    where
        P: SeriesProvider + ?Sized,
    {
        match self.entries.entry(CacheKey::new(series_id, config)) {
            Entry::Occupied(entry) => {
                debug!(series_id, "pipeline cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let result = run_for_provider(provider, series_id, config)?;
                Ok(entry.insert(result))
            }
        }
    }

    /// Drop every entry for `series_id`; returns how many were removed.
    pub fn invalidate(&mut self, series_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.series_id != series_id);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
