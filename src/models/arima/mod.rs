//! Seasonal ARIMA models.
//!
//! This module provides:
//! - Differencing and its inversion for the pipeline
//! - Lag-polynomial algebra (stationarity, invertibility, psi weights)
//! - Conditional maximum likelihood fitting of SARIMA(p, d, q)(P, D, Q)\[s\]
//! - Automatic order selection by AICc

mod auto_arima;
mod diff;
mod model;
pub mod polynomial;

pub use auto_arima::{ModelSelector, SearchConfig, SearchStrategy, SelectionOutcome};
pub use diff::{difference, seasonal_difference, DifferenceSeed, Differenced, Differencer};
pub use model::{FitOptions, ModelOrder, ModelSpec};
