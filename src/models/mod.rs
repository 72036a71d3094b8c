//! Forecasting models.

pub mod arima;
