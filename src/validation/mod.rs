//! Statistical validation: unit-root testing and residual diagnostics.
//!
//! # Example
//!
//! ```
//! use cpi_forecast::validation::{adf_test, ljung_box};
//!
//! let residuals = vec![0.1, -0.2, 0.15, -0.1, 0.05, -0.08, 0.12, -0.15, 0.1, -0.05];
//! let lb = ljung_box(&residuals, Some(5), 0);
//! if lb.is_white_noise(0.05) {
//!     println!("Residuals pass Ljung-Box test");
//! }
//!
//! let series: Vec<f64> = (0..60).map(|i| ((i * 7) % 11) as f64).collect();
//! let adf = adf_test(&series, None).unwrap();
//! println!("ADF p-value: {:.3}", adf.p_value);
//! ```

pub mod stationarity;

pub use residual_tests::{
    acf, box_pierce, ljung_box, DiagnosticsConfig, DistributionSummary, LjungBoxResult,
    ResidualDiagnosticWarning, ResidualDiagnostics, ResidualReport,
};
pub use stationarity::{
    adf_test, mackinnon_critical_values, mackinnon_p_value, AdfResult, CriticalValues,
    StationarityConfig, StationarityOutcome, StationarityTester, StationarityVerdict,
};
