//! Property-based tests for the forecasting pipeline components.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated series.

use chrono::NaiveDate;
use cpi_forecast::core::{
    GapPolicy, MonthlySeries, NormalizerConfig, RawObservation, SeriesNormalizer, YearMonth,
};
use cpi_forecast::forecaster::Forecaster;
use cpi_forecast::models::arima::{
    Differencer, FitOptions, ModelOrder, ModelSelector, ModelSpec, SearchConfig,
};
use proptest::prelude::*;

fn make_series(values: &[f64]) -> MonthlySeries {
    MonthlySeries::new(YearMonth::new(2000, 1).unwrap(), values.to_vec()).unwrap()
}

/// Strategy for generating valid series values.
/// Adds small variation to avoid all-constant series.
fn valid_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        prop::collection::vec(1.0..1000.0_f64, len).prop_map(|mut v| {
            for (i, val) in v.iter_mut().enumerate() {
                *val += (i as f64) * 0.001;
            }
            v
        })
    })
}

/// Strategy for AR(1)-like series driven by bounded shocks.
fn ar_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (
            -0.8..0.8_f64,
            prop::collection::vec(-1.0..1.0_f64, len),
        )
            .prop_map(|(phi, shocks)| {
                let mut x = 0.0;
                shocks
                    .into_iter()
                    .map(|e| {
                        x = phi * x + e;
                        50.0 + x
                    })
                    .collect()
            })
    })
}

/// Raw monthly observations with random gaps and missing values.
fn raw_observation_strategy() -> impl Strategy<Value = Vec<RawObservation>> {
    prop::collection::vec((1usize..3, prop::option::weighted(0.9, 0.0..100.0_f64)), 40..120)
        .prop_map(|steps| {
            let mut month = YearMonth::new(1985, 1).unwrap();
            steps
                .into_iter()
                .map(|(step, value)| {
                    month = month.add_months(step as i64);
                    RawObservation::new(month.first_day(), value)
                })
                .collect()
        })
}

// =============================================================================
// Property: differencing round trips
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn restore_inverts_apply(values in valid_values_strategy(3, 80), d in 0usize..2) {
        let series = make_series(&values);
        let differenced = Differencer::apply(&series, d).unwrap();
        let restored = Differencer::restore(&differenced).unwrap();

        prop_assert_eq!(restored.start(), series.start());
        prop_assert_eq!(restored.len(), series.len());
        for (a, b) in restored.values().iter().zip(series.values()) {
            prop_assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }

    #[test]
    fn invert_continues_from_seed(values in valid_values_strategy(6, 80), split in 2usize..5) {
        // differences of the tail, inverted from the head's seed, give back the tail
        let head = make_series(&values[..split]);
        let seed = Differencer::apply(&head, 1).unwrap().seed().clone();
        let steps: Vec<f64> = values[split - 1..].windows(2).map(|w| w[1] - w[0]).collect();

        let rebuilt = Differencer::invert(&steps, &seed);
        for (a, b) in rebuilt.iter().zip(&values[split..]) {
            prop_assert!((a - b).abs() < 1e-6);
        }
    }
}

// =============================================================================
// Property: normalized series are gap-free and start inside the window
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn normalized_series_respects_window(raw in raw_observation_strategy()) {
        let window = YearMonth::new(1988, 1).unwrap();
        let config = NormalizerConfig::default()
            .with_window_start(window)
            .with_min_observations(1);

        if let Ok(series) = SeriesNormalizer::new(config.clone()).normalize(&raw) {
            prop_assert!(series.start() >= window);
            prop_assert!(series.values().iter().all(|v| v.is_finite()));
            let usable = raw
                .iter()
                .filter(|o| o.value.is_some() && YearMonth::from_date(o.date) >= window)
                .count();
            prop_assert_eq!(series.len(), usable);
        }

        let interpolate = config.with_gap_policy(GapPolicy::Interpolate);
        if let Ok(series) = SeriesNormalizer::new(interpolate).normalize(&raw) {
            let last = raw
                .iter()
                .rev()
                .find(|o| o.value.is_some() && YearMonth::from_date(o.date) >= window)
                .map(|o| YearMonth::from_date(o.date));
            prop_assert_eq!(Some(series.end()), last);
            prop_assert_eq!(series.dates().len(), series.len());
        }
    }

    #[test]
    fn unsorted_input_is_rejected(raw in raw_observation_strategy(), i in 0usize..39) {
        let mut shuffled = raw.clone();
        shuffled.swap(i, i + 1);
        let result = SeriesNormalizer::default().normalize(&shuffled);
        prop_assert!(result.is_err());
    }
}

// =============================================================================
// Property: forecast intervals
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn bands_are_nested_and_width_grows(
        values in ar_values_strategy(40, 90),
        d in 0usize..2,
        horizon in 1i64..25,
    ) {
        let series = make_series(&values);
        let model = ModelSpec::fit(&series, ModelOrder::non_seasonal(1, d, 1), &FitOptions::default());
        prop_assume!(model.is_ok());
        let model = model.unwrap();

        let f = Forecaster::default().forecast(&model, horizon, None).unwrap();
        prop_assert_eq!(f.horizon(), horizon as usize);
        for i in 0..f.horizon() {
            prop_assert!(f.lower_95()[i] <= f.lower_80()[i]);
            prop_assert!(f.lower_80()[i] <= f.point()[i]);
            prop_assert!(f.point()[i] <= f.upper_80()[i]);
            prop_assert!(f.upper_80()[i] <= f.upper_95()[i]);
        }
        let widths = f.width_95();
        for w in widths.windows(2) {
            prop_assert!(w[1] >= w[0] - 1e-9);
        }
    }

    #[test]
    fn widths_agree_across_horizons(values in ar_values_strategy(40, 90), h1 in 1i64..12) {
        let series = make_series(&values);
        let model = ModelSpec::fit(&series, ModelOrder::non_seasonal(1, 0, 0), &FitOptions::default());
        prop_assume!(model.is_ok());
        let model = model.unwrap();

        let forecaster = Forecaster::default();
        let short = forecaster.forecast(&model, h1, None).unwrap();
        let long = forecaster.forecast(&model, h1 + 12, None).unwrap();
        for i in 0..short.horizon() {
            prop_assert!((short.width_80()[i] - long.width_80()[i]).abs() < 1e-12);
            prop_assert!((short.width_95()[i] - long.width_95()[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn step_one_is_conditional_expectation(values in ar_values_strategy(40, 90)) {
        let series = make_series(&values);
        let model = ModelSpec::fit(&series, ModelOrder::non_seasonal(1, 0, 0), &FitOptions::default());
        prop_assume!(model.is_ok());
        let model = model.unwrap();

        let mu = model.constant().unwrap_or(0.0);
        let phi = model.ar_coefficients()[0];
        let expected = mu + phi * (values[values.len() - 1] - mu);
        let f = Forecaster::default().forecast(&model, 1, None).unwrap();
        prop_assert!((f.point()[0] - expected).abs() < 1e-8);
    }
}

// =============================================================================
// Property: the selector returns the minimum-AICc candidate
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn selection_is_minimal(values in ar_values_strategy(48, 80)) {
        let series = make_series(&values);
        let config = SearchConfig::default()
            .with_max_orders(1, 1, 1)
            .with_seasonal_orders(0, 0, 0)
            .with_parallel(false);
        let outcome = ModelSelector::new(config.clone()).select(&series);
        prop_assume!(outcome.is_ok());
        let outcome = outcome.unwrap();

        let best = outcome.model.aicc();
        for (_, aicc) in &outcome.candidates {
            prop_assert!(best <= aicc + config.tie_epsilon);
        }
        // ties go to the smallest model
        for (order, aicc) in &outcome.candidates {
            if (aicc - best).abs() <= config.tie_epsilon {
                prop_assert!(
                    outcome.model.order().num_coefficients() <= order.num_coefficients()
                );
            }
        }
    }
}

#[test]
fn raw_dates_are_month_granular() {
    // mid-month dates map to their calendar month
    let raw: Vec<RawObservation> = (0..40)
        .map(|i| {
            let ym = YearMonth::new(2000, 1).unwrap().add_months(i);
            let date = NaiveDate::from_ymd_opt(ym.year(), ym.month(), 15).unwrap();
            RawObservation::present(date, i as f64)
        })
        .collect();
    let series = SeriesNormalizer::default().normalize(&raw).unwrap();
    assert_eq!(series.start(), YearMonth::new(2000, 1).unwrap());
    assert_eq!(series.len(), 40);
}
