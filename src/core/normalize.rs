//! Conversion of raw provider output into a canonical monthly series.

use crate::core::time_series::{MonthlySeries, YearMonth};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use tracing::debug;

/// A single observation as delivered by the ingestion collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub date: NaiveDate,
    /// `None` (or a non-finite number) marks a missing value.
    pub value: Option<f64>,
}

impl RawObservation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }

    /// Observation with a present value.
    pub fn present(date: NaiveDate, value: f64) -> Self {
        Self::new(date, Some(value))
    }

    /// Observation with a missing value.
    pub fn missing(date: NaiveDate) -> Self {
        Self::new(date, None)
    }

    fn usable_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// How to handle months with no usable value inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Treat the remaining values as consecutive months from the first kept date.
    #[default]
    Compact,
    /// Fill interior gaps by linear interpolation.
    Interpolate,
    /// Fail on any interior gap.
    Reject,
}

/// Configuration for [`SeriesNormalizer`].
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Earliest month kept.
    pub window_start: YearMonth,
    /// Minimum number of observations required after filtering.
    pub min_observations: usize,
    /// Interior gap handling.
    pub gap_policy: GapPolicy,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            window_start: YearMonth::default(),
            min_observations: 36,
            gap_policy: GapPolicy::Compact,
        }
    }
}

impl NormalizerConfig {
    /// Set the window start.
    pub fn with_window_start(mut self, window_start: YearMonth) -> Self {
        self.window_start = window_start;
        self
    }

    /// Set the minimum observation count.
    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    /// Set the gap policy.
    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }
}

/// Turns raw dated observations into a gap-free [`MonthlySeries`].
#[derive(Debug, Clone, Default)]
pub struct SeriesNormalizer {
    config: NormalizerConfig,
}

impl SeriesNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize a raw sequence sorted ascending by date.
    ///
    /// Missing values are dropped, observations before the window start are
    /// discarded, and interior gaps are resolved per [`GapPolicy`]. Fails
    /// with [`ForecastError::EmptySeries`] if fewer than
    /// `min_observations` values remain.
    pub fn normalize(&self, raw: &[RawObservation]) -> Result<MonthlySeries> {
        validate_ordering(raw)?;

        let window_start = self.config.window_start;
        let kept: Vec<(YearMonth, f64)> = raw
            .iter()
            .filter_map(|obs| {
                let month = YearMonth::from_date(obs.date);
                match obs.usable_value() {
                    Some(v) if month >= window_start => Some((month, v)),
                    _ => None,
                }
            })
            .collect();

        debug!(
            raw = raw.len(),
            kept = kept.len(),
            window_start = %window_start,
            "normalized raw observations"
        );

        if kept.len() < self.config.min_observations {
            return Err(ForecastError::EmptySeries {
                needed: self.config.min_observations,
                got: kept.len(),
            });
        }

        let start = kept
            .first()
            .map(|&(month, _)| month)
            .ok_or(ForecastError::EmptySeries {
                needed: self.config.min_observations.max(1),
                got: 0,
            })?;
        let values = match self.config.gap_policy {
            GapPolicy::Compact => kept.iter().map(|&(_, v)| v).collect(),
            GapPolicy::Interpolate => interpolate_gaps(&kept),
            GapPolicy::Reject => {
                if let Some(w) = kept.windows(2).find(|w| w[0].0.succ() != w[1].0) {
                    return Err(ForecastError::TimestampError(format!(
                        "gap between {} and {}",
                        w[0].0, w[1].0
                    )));
                }
                kept.iter().map(|&(_, v)| v).collect()
            }
        };

        MonthlySeries::new(start, values)
    }
}

/// Raw dates must be strictly increasing by calendar month.
fn validate_ordering(raw: &[RawObservation]) -> Result<()> {
    for w in raw.windows(2) {
        let prev = YearMonth::from_date(w[0].date);
        let next = YearMonth::from_date(w[1].date);
        if next <= prev {
            return Err(ForecastError::TimestampError(format!(
                "observations must be sorted by strictly increasing month: {} follows {}",
                next, prev
            )));
        }
    }
    Ok(())
}

/// Linear interpolation over missing interior months.
fn interpolate_gaps(kept: &[(YearMonth, f64)]) -> Vec<f64> {
    let mut values = Vec::with_capacity(kept.len());
    for (i, &(month, value)) in kept.iter().enumerate() {
        if i > 0 {
            let (prev_month, prev_value) = kept[i - 1];
            let span = prev_month.months_until(month);
            for step in 1..span {
                let frac = step as f64 / span as f64;
                values.push(prev_value + frac * (value - prev_value));
            }
        }
        values.push(value);
    }
    values
}
