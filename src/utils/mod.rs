//! Numerical utilities shared by the models and tests.

pub mod ols;
pub mod optimization;
pub mod stats;

pub use ols::{ols_fit, OLSResult};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{chi_squared_sf, quantile_normal, z_for_level};
