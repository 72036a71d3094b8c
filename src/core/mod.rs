//! Core data structures for monthly series forecasting.

mod forecast;
mod normalize;
mod time_series;

pub use forecast::{ForecastResult, LEVEL_80, LEVEL_95};
pub use normalize::{GapPolicy, NormalizerConfig, RawObservation, SeriesNormalizer};
pub use time_series::{MonthlySeries, YearMonth, MONTHLY_PERIOD};
