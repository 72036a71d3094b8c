//! Dated forecast table and its CSV export.

use crate::core::{ForecastResult, YearMonth};
use crate::error::{ForecastError, Result};
use csv::Writer;
use std::io::Write;

/// CSV header of an exported table.
pub const CSV_HEADER: [&str; 6] = ["Date", "Forecast", "Lo80", "Hi80", "Lo95", "Hi95"];

/// One forecast step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub date: YearMonth,
    pub forecast: f64,
    pub lo80: f64,
    pub hi80: f64,
    pub lo95: f64,
    pub hi95: f64,
}

/// Forecast steps labelled with their calendar months.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Label `forecast` with the months following `last_observed`.
    pub fn assemble(last_observed: YearMonth, forecast: &ForecastResult) -> Self {
        let rows = (0..forecast.horizon())
            .map(|i| ForecastRow {
                date: last_observed.add_months(i as i64 + 1),
                forecast: forecast.point()[i],
                lo80: forecast.lower_80()[i],
                hi80: forecast.upper_80()[i],
                lo95: forecast.lower_95()[i],
                hi95: forecast.upper_95()[i],
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV with a `Date,Forecast,Lo80,Hi80,Lo95,Hi95` header.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::from_writer(out);
        writer.write_record(CSV_HEADER)?;

        for row in &self.rows {
            writer.write_record([
                row.date.to_string(),
                row.forecast.to_string(),
                row.lo80.to_string(),
                row.hi80.to_string(),
                row.lo95.to_string(),
                row.hi95.to_string(),
            ])?;
        }

        writer
            .flush()
            .map_err(|e| ForecastError::Export(e.to_string()))
    }

    /// CSV rendering as a string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ForecastError::Export(e.to_string()))
    }
}
