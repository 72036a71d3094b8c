//! Forecast result structure holding point predictions and nested bands.

use crate::error::{ForecastError, Result};

/// Confidence level of the inner band.
pub const LEVEL_80: f64 = 0.80;
/// Confidence level of the outer band.
pub const LEVEL_95: f64 = 0.95;

/// Multi-step forecast with 80% and 95% prediction intervals.
///
/// All sequences have length `horizon`, and at every step
/// `lower_95 <= lower_80 <= point <= upper_80 <= upper_95`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    horizon: usize,
    point: Vec<f64>,
    lower_80: Vec<f64>,
    upper_80: Vec<f64>,
    lower_95: Vec<f64>,
    upper_95: Vec<f64>,
}

impl ForecastResult {
    /// Build a result from point forecasts and their two bands.
    pub fn new(
        point: Vec<f64>,
        (lower_80, upper_80): (Vec<f64>, Vec<f64>),
        (lower_95, upper_95): (Vec<f64>, Vec<f64>),
    ) -> Result<Self> {
        let horizon = point.len();
        for band in [&lower_80, &upper_80, &lower_95, &upper_95] {
            if band.len() != horizon {
                return Err(ForecastError::ComputationError(format!(
                    "band length {} does not match horizon {}",
                    band.len(),
                    horizon
                )));
            }
        }
        Ok(Self {
            horizon,
            point,
            lower_80,
            upper_80,
            lower_95,
            upper_95,
        })
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn lower_80(&self) -> &[f64] {
        &self.lower_80
    }

    pub fn upper_80(&self) -> &[f64] {
        &self.upper_80
    }

    pub fn lower_95(&self) -> &[f64] {
        &self.lower_95
    }

    pub fn upper_95(&self) -> &[f64] {
        &self.upper_95
    }

    /// Width of the 80% band at each step.
    pub fn width_80(&self) -> Vec<f64> {
        widths(&self.lower_80, &self.upper_80)
    }

    /// Width of the 95% band at each step.
    pub fn width_95(&self) -> Vec<f64> {
        widths(&self.lower_95, &self.upper_95)
    }

    /// Apply the same transform to the point forecast and every bound.
    ///
    /// Only valid for monotone increasing transforms (such as cumulative
    /// summation from a fixed level), which keep the bands ordered.
    pub fn map_sequences<F>(&self, f: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        Self {
            horizon: self.horizon,
            point: f(&self.point),
            lower_80: f(&self.lower_80),
            upper_80: f(&self.upper_80),
            lower_95: f(&self.lower_95),
            upper_95: f(&self.upper_95),
        }
    }
}

fn widths(lower: &[f64], upper: &[f64]) -> Vec<f64> {
    lower.iter().zip(upper).map(|(l, u)| u - l).collect()
}
