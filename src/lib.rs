//! # cpi-forecast
//!
//! Automatic seasonal ARIMA forecasting for monthly index series such as
//! consumer price indices.
//!
//! A run normalizes raw dated observations, tests for a unit root,
//! differences when needed, selects a SARIMA(p,d,q)(P,D,Q)\[12\] order by
//! AICc, reports residual diagnostics and produces a forecast with nested
//! 80% and 95% prediction intervals.
//!
//! ```no_run
//! use cpi_forecast::prelude::*;
//!
//! let provider = CsvSeriesProvider::new("data");
//! let result = run_for_provider(&provider, "US", &PipelineConfig::default())?;
//! println!("{}", result.order_label());
//! result.table.write_csv(std::io::stdout())?;
//! # Ok::<(), ForecastError>(())
//! ```

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod forecaster;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{
        ForecastResult, GapPolicy, MonthlySeries, NormalizerConfig, RawObservation, YearMonth,
    };
    pub use crate::error::{ForecastError, Result};
    pub use crate::forecaster::{ForecastConfig, Forecaster};
    pub use crate::models::arima::{ModelOrder, ModelSelector, ModelSpec, SearchConfig, SearchStrategy};
    pub use crate::pipeline::{
        run_batch, run_for_provider, run_forecast_pipeline, DifferencingPolicy, PipelineCache,
        PipelineConfig, PipelineResult,
    };
    pub use crate::provider::{CsvSeriesProvider, InMemoryProvider, SeriesProvider};
    pub use crate::report::ForecastTable;
    pub use crate::utils::quantile_normal;
}
