//! Monthly time series representation.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Seasonal period of a monthly series.
pub const MONTHLY_PERIOD: usize = 12;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a new year/month pair. `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidParameter(format!(
                "month must be in 1..=12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // year/month are validated on construction, day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Months since year 0, used for arithmetic.
    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: (ordinal.rem_euclid(12) + 1) as u32,
        }
    }

    /// Shift by `months` (may be negative).
    pub fn add_months(&self, months: i64) -> Self {
        Self::from_ordinal(self.ordinal() + months)
    }

    /// The following month.
    pub fn succ(&self) -> Self {
        self.add_months(1)
    }

    /// Number of months from `self` to `other` (negative if `other` is earlier).
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.ordinal() - self.ordinal()
    }
}

impl Default for YearMonth {
    /// 1990-01, the default window start.
    fn default() -> Self {
        Self {
            year: 1990,
            month: 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

/// A gap-free monthly series with seasonal period 12.
///
/// Timestamps are implied by `start` and position, so the series cannot
/// contain missing periods. Values are always finite.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    start: YearMonth,
    values: Vec<f64>,
}

impl MonthlySeries {
    /// Create a series starting at `start`.
    pub fn new(start: YearMonth, values: Vec<f64>) -> Result<Self> {
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "non-finite value at position {} ({})",
                pos,
                start.add_months(pos as i64)
            )));
        }
        Ok(Self { start, values })
    }

    /// Derived copy sharing nothing with `self`, starting `offset` months later.
    pub fn with_values(&self, offset: usize, values: Vec<f64>) -> Result<Self> {
        Self::new(self.start.add_months(offset as i64), values)
    }

    /// First month.
    pub fn start(&self) -> YearMonth {
        self.start
    }

    /// Last observed month. Equals `start` for an empty series.
    pub fn end(&self) -> YearMonth {
        self.start
            .add_months(self.values.len().saturating_sub(1) as i64)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Seasonal period (always 12).
    pub fn period(&self) -> usize {
        MONTHLY_PERIOD
    }

    /// Month of the observation at `index`.
    pub fn date_at(&self, index: usize) -> YearMonth {
        self.start.add_months(index as i64)
    }

    /// All observation months in order.
    pub fn dates(&self) -> Vec<YearMonth> {
        (0..self.values.len()).map(|i| self.date_at(i)).collect()
    }

    /// Iterate `(month, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.date_at(i), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_arithmetic_wraps_years() {
        let ym = YearMonth::new(1999, 11).unwrap();
        assert_eq!(ym.succ(), YearMonth::new(1999, 12).unwrap());
        assert_eq!(ym.add_months(2), YearMonth::new(2000, 1).unwrap());
        assert_eq!(ym.add_months(-11), YearMonth::new(1998, 12).unwrap());
        assert_eq!(ym.months_until(YearMonth::new(2001, 1).unwrap()), 14);
    }

    #[test]
    fn year_month_rejects_bad_month() {
        assert!(YearMonth::new(2020, 0).is_err());
        assert!(YearMonth::new(2020, 13).is_err());
    }

    #[test]
    fn year_month_display_and_date() {
        let ym = YearMonth::new(2023, 3).unwrap();
        assert_eq!(ym.to_string(), "2023-03");
        assert_eq!(ym.first_day(), NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        let from = YearMonth::from(NaiveDate::from_ymd_opt(2023, 3, 17).unwrap());
        assert_eq!(from, ym);
    }

    #[test]
    fn default_year_month_is_window_start() {
        assert_eq!(YearMonth::default().to_string(), "1990-01");
    }

    #[test]
    fn monthly_series_dates() {
        let start = YearMonth::new(2020, 11).unwrap();
        let series = MonthlySeries::new(start, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.period(), 12);
        assert_eq!(series.end(), YearMonth::new(2021, 1).unwrap());
        assert_eq!(
            series.dates(),
            vec![
                YearMonth::new(2020, 11).unwrap(),
                YearMonth::new(2020, 12).unwrap(),
                YearMonth::new(2021, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn monthly_series_rejects_non_finite() {
        let start = YearMonth::default();
        assert!(MonthlySeries::new(start, vec![1.0, f64::NAN]).is_err());
        assert!(MonthlySeries::new(start, vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn derived_copy_shifts_start() {
        let start = YearMonth::new(2020, 1).unwrap();
        let series = MonthlySeries::new(start, vec![1.0, 2.0, 4.0]).unwrap();
        let derived = series.with_values(1, vec![1.0, 2.0]).unwrap();
        assert_eq!(derived.start(), YearMonth::new(2020, 2).unwrap());
        assert_eq!(series.values(), &[1.0, 2.0, 4.0]);
    }
}
