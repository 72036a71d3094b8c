//! Differencing and its inversion.

use crate::core::MonthlySeries;
use crate::error::{ForecastError, Result};

/// Apply `d` regular differences to a series.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `d` seasonal differences at lag `period`.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

fn cumulative_from(anchor: f64, steps: &[f64]) -> Vec<f64> {
    steps
        .iter()
        .scan(anchor, |level, &step| {
            *level += step;
            Some(*level)
        })
        .collect()
}

/// State needed to return a differenced forecast to the original level.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceSeed {
    order: usize,
    /// Last `order` values of the original series.
    levels: Vec<f64>,
}

impl DifferenceSeed {
    /// Differencing order this seed inverts (0 or 1).
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Last known level, if any differencing was applied.
    pub fn last_level(&self) -> Option<f64> {
        self.levels.last().copied()
    }
}

/// Output of [`Differencer::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Differenced {
    series: MonthlySeries,
    seed: DifferenceSeed,
    /// First value of the original series, kept for [`Differencer::restore`].
    head: Option<f64>,
}

impl Differenced {
    pub fn series(&self) -> &MonthlySeries {
        &self.series
    }

    pub fn seed(&self) -> &DifferenceSeed {
        &self.seed
    }

    pub fn order(&self) -> usize {
        self.seed.order
    }
}

/// Pipeline-level first-order differencing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Differencer;

impl Differencer {
    /// Difference `series` `d` times, `d` in {0, 1}.
    ///
    /// The result starts `d` months later and is `d` observations shorter.
    pub fn apply(series: &MonthlySeries, d: usize) -> Result<Differenced> {
        if d > 1 {
            return Err(ForecastError::InvalidParameter(format!(
                "pipeline differencing order must be 0 or 1, got {}",
                d
            )));
        }
        if series.len() <= d {
            return Err(ForecastError::InsufficientData {
                needed: d + 1,
                got: series.len(),
            });
        }

        let values = series.values();
        let differenced = series.with_values(d, difference(values, d))?;
        let levels = values[values.len() - d..].to_vec();

        Ok(Differenced {
            series: differenced,
            seed: DifferenceSeed { order: d, levels },
            head: values.first().copied(),
        })
    }

    /// Return a differenced forecast sequence to original units.
    ///
    /// Cumulative sum from the last known level; identity for order 0.
    pub fn invert(values: &[f64], seed: &DifferenceSeed) -> Vec<f64> {
        match seed.last_level() {
            Some(level) if seed.order == 1 => cumulative_from(level, values),
            _ => values.to_vec(),
        }
    }

    /// Rebuild the original series from its differenced form.
    pub fn restore(differenced: &Differenced) -> Result<MonthlySeries> {
        let values = differenced.series.values();
        match (differenced.order(), differenced.head) {
            (0, _) => Ok(differenced.series.clone()),
            (_, Some(head)) => {
                let mut restored = Vec::with_capacity(values.len() + 1);
                restored.push(head);
                restored.extend(cumulative_from(head, values));
                MonthlySeries::new(differenced.series.start().add_months(-1), restored)
            }
            (_, None) => Err(ForecastError::ComputationError(
                "differenced series has no head value".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::YearMonth;
    use approx::assert_relative_eq;

    fn series(values: Vec<f64>) -> MonthlySeries {
        MonthlySeries::new(YearMonth::new(2000, 1).unwrap(), values).unwrap()
    }

    #[test]
    fn difference_orders() {
        let s = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&s, 0), s);
        assert_eq!(difference(&s, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&s, 2), vec![1.0, 1.0, 1.0]);
        assert!(difference(&[], 1).is_empty());
    }

    #[test]
    fn seasonal_difference_basic() {
        let s = vec![100.0, 120.0, 80.0, 90.0, 110.0, 130.0, 90.0, 100.0];
        assert_eq!(seasonal_difference(&s, 1, 4), vec![10.0; 4]);
        assert_eq!(seasonal_difference(&s, 0, 4), s);
        assert!(seasonal_difference(&s[..4], 1, 4).is_empty());
    }

    #[test]
    fn apply_shifts_start_and_keeps_seed() {
        let s = series(vec![100.0, 101.0, 103.0, 106.0]);
        let diff = Differencer::apply(&s, 1).unwrap();

        assert_eq!(diff.series().values(), &[1.0, 2.0, 3.0]);
        assert_eq!(diff.series().start(), YearMonth::new(2000, 2).unwrap());
        assert_eq!(diff.seed().levels(), &[106.0]);
    }

    #[test]
    fn apply_order_zero_is_identity() {
        let s = series(vec![1.0, 2.0, 3.0]);
        let diff = Differencer::apply(&s, 0).unwrap();
        assert_eq!(diff.series(), &s);
        assert!(diff.seed().levels().is_empty());
        assert_eq!(Differencer::invert(&[5.0, 6.0], diff.seed()), vec![5.0, 6.0]);
    }

    #[test]
    fn apply_rejects_higher_orders() {
        let s = series(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            Differencer::apply(&s, 2),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn invert_cumulates_from_last_level() {
        let s = series(vec![100.0, 101.0, 103.0]);
        let diff = Differencer::apply(&s, 1).unwrap();
        let restored = Differencer::invert(&[0.5, 0.5, -1.0], diff.seed());
        assert_eq!(restored, vec![103.5, 104.0, 103.0]);
    }

    #[test]
    fn restore_round_trips() {
        let s = series(vec![100.0, 101.5, 99.25, 104.0, 104.0]);
        for d in 0..=1 {
            let diff = Differencer::apply(&s, d).unwrap();
            let restored = Differencer::restore(&diff).unwrap();
            assert_eq!(restored.start(), s.start());
            for (a, b) in restored.values().iter().zip(s.values()) {
                assert_relative_eq!(a, b, epsilon = 1e-10);
            }
        }
    }
}
