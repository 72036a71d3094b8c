//! Error types for the cpi-forecast library.

use thiserror::Error;

/// Result type alias for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that abort a forecasting run.
///
/// Non-fatal findings (an inconclusive stationarity test, residual
/// autocorrelation) are not errors; they are carried as data on
/// [`StationarityVerdict`](crate::validation::StationarityVerdict) and
/// [`ResidualReport`](crate::validation::ResidualReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Too little history left after normalization.
    #[error("series too short after normalization: need at least {needed} observations, got {got}")]
    EmptySeries { needed: usize, got: usize },

    /// No candidate order produced a convergent, admissible fit.
    #[error("no convergent model among {evaluated} candidate orders")]
    NoConvergentModel { evaluated: usize },

    /// Requested forecast horizon is outside the accepted range.
    #[error("invalid horizon {horizon}: must be between {min} and {max}")]
    InvalidHorizon { horizon: i64, min: usize, max: usize },

    /// Insufficient data points for fitting a particular model order.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Timestamp-related error (unsorted, duplicated or gapped months).
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// The ingestion collaborator failed to deliver a series.
    #[error("data source error: {0}")]
    DataSource(String),

    /// Writing the forecast table failed.
    #[error("export error: {0}")]
    Export(String),
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Export(err.to_string())
    }
}
