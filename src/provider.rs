//! Ingestion boundary: where raw observations come from.

use crate::core::RawObservation;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies raw dated observations for a series identifier.
///
/// Implementations return observations sorted ascending by date; the
/// normalizer rejects anything else.
pub trait SeriesProvider: Sync {
    fn fetch(&self, series_id: &str) -> Result<Vec<RawObservation>>;
}

/// Provider backed by in-memory observation lists.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, Vec<RawObservation>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a series.
    pub fn insert(&mut self, series_id: impl Into<String>, observations: Vec<RawObservation>) {
        self.series.insert(series_id.into(), observations);
    }

    pub fn with_series(
        mut self,
        series_id: impl Into<String>,
        observations: Vec<RawObservation>,
    ) -> Self {
        self.insert(series_id, observations);
        self
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

impl SeriesProvider for InMemoryProvider {
    fn fetch(&self, series_id: &str) -> Result<Vec<RawObservation>> {
        self.series
            .get(series_id)
            .cloned()
            .ok_or_else(|| ForecastError::DataSource(format!("unknown series '{}'", series_id)))
    }
}

/// Reads `<dir>/<series_id>.csv` files with a `date,value` header.
///
/// Dates are `YYYY-MM-DD` or `YYYY-MM`; an empty value is a missing
/// observation.
#[derive(Debug, Clone)]
pub struct CsvSeriesProvider {
    dir: PathBuf,
}

impl CsvSeriesProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, series_id: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", series_id))
    }

    fn read(path: &Path) -> Result<Vec<RawObservation>> {
        let source = |e: String| ForecastError::DataSource(format!("{}: {}", path.display(), e));
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| source(e.to_string()))?;

        let mut observations = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| source(e.to_string()))?;
            let date_field = record
                .get(0)
                .ok_or_else(|| source(format!("row {} has no date", line + 1)))?;
            let date = parse_date(date_field)
                .ok_or_else(|| source(format!("row {}: bad date '{}'", line + 1, date_field)))?;
            let value = match record.get(1).unwrap_or("") {
                "" => None,
                text => Some(text.parse::<f64>().map_err(|e| {
                    source(format!("row {}: bad value '{}': {}", line + 1, text, e))
                })?),
            };
            observations.push(RawObservation::new(date, value));
        }
        Ok(observations)
    }
}

impl SeriesProvider for CsvSeriesProvider {
    fn fetch(&self, series_id: &str) -> Result<Vec<RawObservation>> {
        Self::read(&self.path_for(series_id))
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d"))
        .ok()
}
