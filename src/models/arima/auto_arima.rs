//! Automatic seasonal ARIMA order selection by AICc.

use crate::core::{MonthlySeries, MONTHLY_PERIOD};
use crate::error::{ForecastError, Result};
use crate::models::arima::model::{fit_sarima, FitOptions, ModelOrder, ModelSpec};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// AR conditioning may use at most `1/CONDITIONING_SHARE` of the observations
/// left after the deepest differencing.
const CONDITIONING_SHARE: usize = 3;

/// How the order space is explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Every combination within bounds.
    #[default]
    Exhaustive,
    /// Greedy neighbour search from a few seed orders.
    Stepwise,
}

/// Configuration for [`ModelSelector`].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum non-seasonal AR order to consider.
    pub max_p: usize,
    /// Maximum non-seasonal differencing order.
    pub max_d: usize,
    /// Maximum non-seasonal MA order to consider.
    pub max_q: usize,
    /// Maximum seasonal AR order.
    pub max_cap_p: usize,
    /// Maximum seasonal differencing order.
    pub max_cap_d: usize,
    /// Maximum seasonal MA order.
    pub max_cap_q: usize,
    /// Minimum non-seasonal differencing order.
    pub min_d: usize,
    /// Cap on p + q + P + Q.
    pub max_order: Option<usize>,
    /// Seasonal period (values below 2 disable seasonal terms).
    pub seasonal_period: usize,
    pub strategy: SearchStrategy,
    /// Estimate a mean/drift where the differencing allows one.
    pub allow_constant: bool,
    /// Fit candidates on the rayon thread pool.
    pub parallel: bool,
    /// Stop after this many candidate fits.
    pub max_candidates: Option<usize>,
    /// Stop starting new fits after this much wall time.
    pub time_budget: Option<Duration>,
    /// AICc differences up to this size count as ties.
    pub tie_epsilon: f64,
    /// Optimiser iteration limit per candidate.
    pub max_iterations: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_d: 2,
            max_q: 5,
            max_cap_p: 2,
            max_cap_d: 1,
            max_cap_q: 2,
            min_d: 0,
            max_order: None,
            seasonal_period: MONTHLY_PERIOD,
            strategy: SearchStrategy::Exhaustive,
            allow_constant: true,
            parallel: true,
            max_candidates: None,
            time_budget: None,
            tie_epsilon: 1e-6,
            max_iterations: FitOptions::default().max_iterations,
        }
    }
}

impl SearchConfig {
    /// Set maximum non-seasonal orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set maximum seasonal orders.
    pub fn with_seasonal_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_cap_p = max_p;
        self.max_cap_d = max_d;
        self.max_cap_q = max_q;
        self
    }

    pub fn with_min_d(mut self, min_d: usize) -> Self {
        self.min_d = min_d;
        self
    }

    pub fn with_max_order(mut self, max_order: usize) -> Self {
        self.max_order = Some(max_order);
        self
    }

    /// Set seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use stepwise search instead of exhaustive.
    pub fn stepwise(self) -> Self {
        self.with_strategy(SearchStrategy::Stepwise)
    }

    pub fn with_allow_constant(mut self, allow: bool) -> Self {
        self.allow_constant = allow;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn with_tie_epsilon(mut self, epsilon: f64) -> Self {
        self.tie_epsilon = epsilon;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn period(&self) -> usize {
        if self.seasonal_period >= 2 {
            self.seasonal_period
        } else {
            0
        }
    }

    fn max_cap_d_eff(&self) -> usize {
        if self.period() > 0 {
            self.max_cap_d
        } else {
            0
        }
    }

    fn within_bounds(&self, order: &ModelOrder) -> bool {
        let seasonal_ok = if self.period() > 0 {
            order.cap_p <= self.max_cap_p
                && order.cap_d <= self.max_cap_d
                && order.cap_q <= self.max_cap_q
        } else {
            order.cap_p == 0 && order.cap_d == 0 && order.cap_q == 0
        };
        seasonal_ok
            && order.p <= self.max_p
            && order.q <= self.max_q
            && (self.min_d..=self.max_d).contains(&order.d)
            && self
                .max_order
                .map_or(true, |max| order.num_coefficients() <= max)
    }

    /// Differencing pairs `(d, D)` searched.
    fn differencing_orders(&self) -> Vec<(usize, usize)> {
        (self.min_d..=self.max_d)
            .flat_map(|d| (0..=self.max_cap_d_eff()).map(move |cap_d| (d, cap_d)))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.min_d > self.max_d {
            return Err(ForecastError::InvalidParameter(format!(
                "min_d ({}) exceeds max_d ({})",
                self.min_d, self.max_d
            )));
        }
        if !(self.tie_epsilon >= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "tie_epsilon must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Result of an order search.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// The minimum-AICc model.
    pub model: ModelSpec,
    /// Every converged candidate with its AICc, best first.
    pub candidates: Vec<(ModelOrder, f64)>,
    /// Number of candidate fits attempted.
    pub evaluated: usize,
    /// Whether a candidate or time budget cut the search short.
    pub budget_exhausted: bool,
}

/// Shared per-search budget.
struct Budget {
    max_candidates: Option<usize>,
    deadline: Option<Instant>,
    started: AtomicUsize,
    exhausted: AtomicBool,
}

impl Budget {
    fn new(config: &SearchConfig) -> Self {
        Self {
            max_candidates: config.max_candidates,
            deadline: config.time_budget.map(|b| Instant::now() + b),
            started: AtomicUsize::new(0),
            exhausted: AtomicBool::new(false),
        }
    }

    /// Claim a slot for one more fit.
    fn acquire(&self) -> bool {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.exhausted.store(true, Ordering::Relaxed);
            return false;
        }
        let slot = self.started.fetch_add(1, Ordering::SeqCst);
        if self.max_candidates.is_some_and(|max| slot >= max) {
            self.started.fetch_sub(1, Ordering::SeqCst);
            self.exhausted.store(true, Ordering::Relaxed);
            return false;
        }
        true
    }

    fn evaluated(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Relaxed)
    }
}

/// Searches seasonal ARIMA orders and returns the minimum-AICc fit.
///
/// All candidates are scored on the same observations: the likelihood of
/// each fit starts after the deepest differencing plus the longest AR span
/// the search conditions on. Orders whose AR span is longer than that are
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    config: SearchConfig,
}

impl ModelSelector {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Select the best model for `series`.
    pub fn select(&self, series: &MonthlySeries) -> Result<SelectionOutcome> {
        self.config.validate()?;
        let values = series.values();
        let budget = Budget::new(&self.config);

        let fitted = match self.config.strategy {
            SearchStrategy::Exhaustive => self.exhaustive(values, &budget),
            SearchStrategy::Stepwise => self.stepwise(values, &budget),
        };
        let evaluated = budget.evaluated();
        let budget_exhausted = budget.is_exhausted();
        if budget_exhausted {
            info!(evaluated, "search budget exhausted");
        }

        let mut ranked: Vec<ModelSpec> = fitted;
        ranked.sort_by(|a, b| {
            a.aicc()
                .total_cmp(&b.aicc())
                .then(a.num_params().cmp(&b.num_params()))
                .then(a.order().cmp(&b.order()))
        });
        let candidates = ranked.iter().map(|m| (m.order(), m.aicc())).collect();

        let best = ranked.first().map(|m| m.aicc()).ok_or_else(|| {
            ForecastError::NoConvergentModel { evaluated }
        })?;
        let model = ranked
            .into_iter()
            .take_while(|m| m.aicc() <= best + self.config.tie_epsilon)
            .min_by(|a, b| {
                a.num_params()
                    .cmp(&b.num_params())
                    .then(a.order().cmp(&b.order()))
            })
            .ok_or(ForecastError::NoConvergentModel { evaluated })?;

        info!(
            order = %model.order(),
            aicc = model.aicc(),
            evaluated,
            "selected model"
        );

        Ok(SelectionOutcome {
            model,
            candidates,
            evaluated,
            budget_exhausted,
        })
    }

    /// Observations lost by the most differenced candidate.
    fn differencing_start(&self) -> usize {
        self.config.max_d + self.config.period() * self.config.max_cap_d_eff()
    }

    /// Longest in-bounds AR span `p + s*P` that fits the conditioning share
    /// of a series of length `len`.
    fn conditioning_span(&self, len: usize) -> usize {
        let c = &self.config;
        let room = len.saturating_sub(self.differencing_start()) / CONDITIONING_SHARE;
        let max_cap_p = if c.period() > 0 { c.max_cap_p } else { 0 };
        (0..=c.max_p)
            .flat_map(|p| (0..=max_cap_p).map(move |cap_p| (p, cap_p)))
            .filter(|&(p, cap_p)| c.max_order.map_or(true, |max| p + cap_p <= max))
            .map(|(p, cap_p)| p + cap_p * c.period().max(1))
            .filter(|&span| span <= room)
            .max()
            .unwrap_or(0)
    }

    /// First original index whose innovation enters every likelihood.
    fn common_start(&self, len: usize) -> usize {
        self.differencing_start() + self.conditioning_span(len)
    }

    /// Whether `order` can be scored on the shared sample of `values`.
    fn admits(&self, values: &[f64], order: &ModelOrder) -> bool {
        values.len() >= order.min_length()
            && order.ar_span() <= self.conditioning_span(values.len())
    }

    fn order(
        &self,
        non_seasonal: (usize, usize, usize),
        seasonal: (usize, usize, usize),
    ) -> ModelOrder {
        ModelOrder::new(non_seasonal, seasonal, self.config.period())
    }

    /// Fit one candidate; `None` when it is skipped, rejected or over budget.
    fn evaluate(&self, values: &[f64], order: ModelOrder, budget: &Budget) -> Option<ModelSpec> {
        if !self.admits(values, &order) {
            debug!(%order, "skipped: series too short");
            return None;
        }
        if !budget.acquire() {
            return None;
        }
        let options = FitOptions {
            allow_constant: self.config.allow_constant,
            skip: self
                .common_start(values.len())
                .saturating_sub(order.differencing_loss()),
            max_iterations: self.config.max_iterations,
        };
        match fit_sarima(values, order, &options) {
            Ok(model) if model.aicc().is_finite() => {
                debug!(%order, aicc = model.aicc(), "candidate fitted");
                Some(model)
            }
            Ok(model) => {
                debug!(%order, aicc = model.aicc(), "rejected: non-finite AICc");
                None
            }
            Err(e) => {
                debug!(%order, error = %e, "rejected");
                None
            }
        }
    }

    fn evaluate_all(&self, values: &[f64], orders: &[ModelOrder], budget: &Budget) -> Vec<ModelSpec> {
        if self.config.parallel {
            orders
                .par_iter()
                .filter_map(|&order| self.evaluate(values, order, budget))
                .collect()
        } else {
            orders
                .iter()
                .filter_map(|&order| self.evaluate(values, order, budget))
                .collect()
        }
    }

    /// Every order within bounds, simplest first.
    fn exhaustive_candidates(&self) -> Vec<ModelOrder> {
        let c = &self.config;
        let (max_cap_p, max_cap_q) = if c.period() > 0 {
            (c.max_cap_p, c.max_cap_q)
        } else {
            (0, 0)
        };

        let mut candidates = Vec::new();
        for (d, cap_d) in c.differencing_orders() {
            for p in 0..=c.max_p {
                for q in 0..=c.max_q {
                    for cap_p in 0..=max_cap_p {
                        for cap_q in 0..=max_cap_q {
                            let order = self.order((p, d, q), (cap_p, cap_d, cap_q));
                            if c.within_bounds(&order) {
                                candidates.push(order);
                            }
                        }
                    }
                }
            }
        }
        candidates.sort_by_key(|o| (o.num_coefficients(), *o));
        candidates
    }

    fn exhaustive(&self, values: &[f64], budget: &Budget) -> Vec<ModelSpec> {
        let mut candidates: Vec<ModelOrder> = self
            .exhaustive_candidates()
            .into_iter()
            .filter(|o| self.admits(values, o))
            .collect();
        // Truncate up front so the evaluated set does not depend on thread scheduling.
        if let Some(max) = self.config.max_candidates {
            if candidates.len() > max {
                candidates.truncate(max);
                budget.exhausted.store(true, Ordering::Relaxed);
            }
        }
        debug!(candidates = candidates.len(), "exhaustive search");
        self.evaluate_all(values, &candidates, budget)
    }

    fn stepwise_seeds(&self) -> Vec<ModelOrder> {
        let mut seeds = Vec::new();
        for (d, cap_d) in self.config.differencing_orders() {
            for (p, q, cap_p, cap_q) in [(2, 2, 1, 1), (0, 0, 0, 0), (1, 0, 1, 0), (0, 1, 0, 1)] {
                let order = self.order((p, d, q), (cap_p, cap_d, cap_q));
                if self.config.within_bounds(&order) {
                    seeds.push(order);
                }
            }
        }
        seeds
    }

    fn neighbours(&self, order: &ModelOrder) -> Vec<ModelOrder> {
        let steps: [(isize, isize, isize, isize); 12] = [
            (1, 0, 0, 0),
            (-1, 0, 0, 0),
            (0, 1, 0, 0),
            (0, -1, 0, 0),
            (1, 1, 0, 0),
            (-1, -1, 0, 0),
            (0, 0, 1, 0),
            (0, 0, -1, 0),
            (0, 0, 0, 1),
            (0, 0, 0, -1),
            (0, 0, 1, 1),
            (0, 0, -1, -1),
        ];
        steps
            .iter()
            .filter_map(|&(dp, dq, dcp, dcq)| {
                let shift = |v: usize, by: isize| v.checked_add_signed(by);
                let candidate = self.order(
                    (shift(order.p, dp)?, order.d, shift(order.q, dq)?),
                    (shift(order.cap_p, dcp)?, order.cap_d, shift(order.cap_q, dcq)?),
                );
                self.config.within_bounds(&candidate).then_some(candidate)
            })
            .collect()
    }

    fn stepwise(&self, values: &[f64], budget: &Budget) -> Vec<ModelSpec> {
        let mut visited: HashSet<ModelOrder> = HashSet::new();
        let seeds: Vec<ModelOrder> = self
            .stepwise_seeds()
            .into_iter()
            .filter(|o| visited.insert(*o))
            .collect();
        let mut fitted = self.evaluate_all(values, &seeds, budget);

        let Some(mut current) = best_of(&fitted).cloned() else {
            return fitted;
        };
        loop {
            if budget.is_exhausted() {
                break;
            }
            let next: Vec<ModelOrder> = self
                .neighbours(&current.order())
                .into_iter()
                .filter(|o| visited.insert(*o))
                .collect();
            if next.is_empty() {
                break;
            }
            let round = self.evaluate_all(values, &next, budget);
            let improved = best_of(&round)
                .filter(|m| m.aicc() < current.aicc() - self.config.tie_epsilon)
                .cloned();
            fitted.extend(round);
            match improved {
                Some(model) => {
                    debug!(order = %model.order(), aicc = model.aicc(), "stepwise move");
                    current = model;
                }
                None => break,
            }
        }
        fitted
    }
}

fn best_of(models: &[ModelSpec]) -> Option<&ModelSpec> {
    models.iter().min_by(|a, b| {
        a.aicc()
            .total_cmp(&b.aicc())
            .then(a.num_params().cmp(&b.num_params()))
            .then(a.order().cmp(&b.order()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::YearMonth;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0)
            .collect()
    }

    fn series(values: Vec<f64>) -> MonthlySeries {
        MonthlySeries::new(YearMonth::new(2000, 1).unwrap(), values).unwrap()
    }

    fn small_config() -> SearchConfig {
        SearchConfig::default()
            .with_max_orders(2, 1, 2)
            .with_seasonal_orders(0, 0, 0)
            .with_parallel(false)
    }

    fn ar1(n: usize, phi: f64, seed: u64) -> Vec<f64> {
        let e = noise(n, seed);
        let mut x = vec![0.0; n];
        for t in 1..n {
            x[t] = phi * x[t - 1] + e[t];
        }
        x
    }

    #[test]
    fn exhaustive_candidates_are_sorted_by_size() {
        let selector = ModelSelector::new(small_config());
        let candidates = selector.exhaustive_candidates();

        assert_eq!(candidates.len(), 2 * 3 * 3);
        for w in candidates.windows(2) {
            assert!(w[0].num_coefficients() <= w[1].num_coefficients());
        }
        assert_eq!(candidates[0].num_coefficients(), 0);
    }

    #[test]
    fn max_order_filters_candidates() {
        let selector = ModelSelector::new(small_config().with_max_order(1));
        assert!(selector
            .exhaustive_candidates()
            .iter()
            .all(|o| o.num_coefficients() <= 1));
    }

    #[test]
    fn selected_model_has_minimum_aicc() {
        let s = series(ar1(150, 0.6, 42));
        let outcome = ModelSelector::new(small_config()).select(&s).unwrap();

        for (_, aicc) in &outcome.candidates {
            assert!(outcome.model.aicc() <= aicc + 1e-6);
        }
        assert!(outcome.candidates.len() <= outcome.evaluated);
        assert!(!outcome.budget_exhausted);
    }

    #[test]
    fn ar_process_prefers_autoregressive_term() {
        let s = series(ar1(200, 0.7, 3));
        let outcome = ModelSelector::new(small_config().with_max_orders(2, 0, 2))
            .select(&s)
            .unwrap();
        assert!(outcome.model.order().p + outcome.model.order().q >= 1);
    }

    #[test]
    fn candidates_share_likelihood_sample() {
        let s = series(ar1(120, 0.5, 9));
        let selector = ModelSelector::new(small_config());
        let outcome = selector.select(&s).unwrap();

        let n = outcome.model.n_used();
        assert_eq!(selector.common_start(120), 1 + 2);
        assert_eq!(n, 120 - selector.common_start(120));
    }

    #[test]
    fn conditioning_span_fits_series_length() {
        let selector = ModelSelector::new(SearchConfig::default());
        // deepest differencing loses 2 + 12
        assert_eq!(selector.conditioning_span(36), 5);
        assert_eq!(selector.conditioning_span(60), 3 + 12);
        assert_eq!(selector.conditioning_span(120), 5 + 24);

        let capped = ModelSelector::new(SearchConfig::default().with_max_order(1));
        assert_eq!(capped.conditioning_span(120), 12);

        let short = series(noise(60, 4));
        let order = ModelOrder::new((0, 0, 0), (2, 0, 0), 12);
        assert!(!selector.admits(short.values(), &order));
        assert!(selector.admits(short.values(), &ModelOrder::new((3, 0, 0), (1, 0, 0), 12)));
    }

    #[test]
    fn seasonal_candidates_share_conditioned_sample() {
        let e = noise(120, 17);
        let mut values = vec![0.0; 120];
        for t in 12..120 {
            values[t] = 0.5 * values[t - 12] + e[t];
        }
        let selector = ModelSelector::new(
            SearchConfig::default()
                .with_max_orders(1, 0, 0)
                .with_seasonal_orders(1, 0, 0)
                .with_parallel(false),
        );
        let outcome = selector.select(&series(values)).unwrap();

        assert_eq!(selector.common_start(120), 13);
        assert_eq!(outcome.evaluated, 4);
        assert_eq!(outcome.model.n_used(), 107);
        assert_eq!(outcome.model.residual_start(), 13);
    }

    #[test]
    fn time_budget_stops_search_part_way() {
        let e = noise(120, 21);
        let values: Vec<f64> = (0..120)
            .map(|i| 100.0 + 0.3 * i as f64 + (i as f64 * 0.52).sin() + 0.5 * e[i])
            .collect();
        let s = series(values);
        let selector = ModelSelector::new(
            SearchConfig::default()
                .with_parallel(false)
                .with_time_budget(Duration::from_millis(50)),
        );
        let eligible = selector
            .exhaustive_candidates()
            .into_iter()
            .filter(|o| selector.admits(s.values(), o))
            .count();
        let outcome = selector.select(&s).unwrap();

        assert!(outcome.budget_exhausted);
        assert!(outcome.evaluated >= 1);
        assert!(outcome.evaluated < eligible);
        assert!(outcome.candidates.len() <= outcome.evaluated);
        assert!(outcome
            .candidates
            .iter()
            .any(|(order, _)| *order == outcome.model.order()));
    }

    #[test]
    fn candidate_budget_limits_fits() {
        let s = series(ar1(120, 0.5, 1));
        let outcome = ModelSelector::new(small_config().with_max_candidates(3))
            .select(&s)
            .unwrap();

        assert_eq!(outcome.evaluated, 3);
        assert!(outcome.budget_exhausted);
        assert!(outcome.candidates.len() <= 3);
    }

    #[test]
    fn exhausted_time_budget_reports_no_model() {
        let s = series(ar1(120, 0.5, 1));
        let result = ModelSelector::new(small_config().with_time_budget(Duration::ZERO)).select(&s);
        assert!(matches!(
            result,
            Err(ForecastError::NoConvergentModel { evaluated: 0 })
        ));
    }

    #[test]
    fn stepwise_finds_a_model() {
        let s = series(ar1(150, 0.6, 5));
        let outcome = ModelSelector::new(small_config().stepwise()).select(&s).unwrap();
        assert!(outcome.evaluated >= 1);
        assert!(outcome.model.aicc().is_finite());
    }

    #[test]
    fn parallel_matches_sequential() {
        let s = series(ar1(100, 0.4, 8));
        let sequential = ModelSelector::new(small_config()).select(&s).unwrap();
        let parallel = ModelSelector::new(small_config().with_parallel(true))
            .select(&s)
            .unwrap();
        assert_eq!(sequential.model.order(), parallel.model.order());
        assert_eq!(sequential.candidates.len(), parallel.candidates.len());
    }

    #[test]
    fn too_short_series_has_no_convergent_model() {
        let s = series(vec![1.0, 2.0, 1.5, 2.5]);
        let result = ModelSelector::new(small_config()).select(&s);
        assert!(matches!(result, Err(ForecastError::NoConvergentModel { .. })));
    }

    #[test]
    fn invalid_differencing_bounds() {
        let s = series(ar1(60, 0.5, 2));
        let result = ModelSelector::new(small_config().with_min_d(2)).select(&s);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }

    #[test]
    fn neighbours_stay_in_bounds() {
        let selector = ModelSelector::new(small_config());
        let origin = ModelOrder::new((0, 0, 0), (0, 0, 0), 12);
        let neighbours = selector.neighbours(&origin);
        assert!(neighbours.iter().all(|o| selector.config().within_bounds(o)));
        assert!(neighbours.contains(&ModelOrder::new((1, 0, 0), (0, 0, 0), 12)));
        assert!(neighbours.contains(&ModelOrder::new((1, 0, 1), (0, 0, 0), 12)));
    }
}
